//! OSIS commentaries. Text is scoped either by a `div annotateRef="Gen.1.1-Gen.1.5"`
//! or by `verse osisID` containers and milestones; a verse scope wins over an
//! enclosing annotated div.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::osis::{attr, is_block};
use crate::error::{PackError, Result};
use crate::normalize;
use crate::records::{CommentaryEntry, Extraction, SkipReason};
use crate::reference::{self, Reference};

struct Scope {
    label: String,
    reference: Option<Reference>,
    milestone: bool,
    text: String,
}

impl Scope {
    fn push_text(&mut self, s: &str) {
        if self.reference.is_some() {
            self.text.push_str(s);
        }
    }
}

pub fn read_file(path: &Path) -> Result<Extraction<CommentaryEntry>> {
    let xml = fs::read_to_string(path)?;
    parse_str(&xml, &path.display().to_string())
}

pub fn parse_str(xml: &str, origin: &str) -> Result<Extraction<CommentaryEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = Extraction::default();
    let mut saw_osis_text = false;
    let mut note_depth = 0usize;
    // one slot per open div; `None` for divs without annotateRef
    let mut divs: Vec<Option<Scope>> = Vec::new();
    let mut verse: Option<Scope> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"osisText" => saw_osis_text = true,
                b"note" => note_depth += 1,
                b"div" => {
                    let scope = match attr(&e, b"annotateRef")? {
                        Some(r) => Some(open_scope(&mut out, r)),
                        None => None,
                    };
                    divs.push(scope);
                }
                b"verse" => {
                    close_scope(&mut out, verse.take());
                    verse = open_verse(&e, &mut out, false)?;
                }
                name if is_block(name) => push_text(&mut verse, &mut divs, " "),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"verse" => {
                    close_scope(&mut out, verse.take());
                    if attr(&e, b"eID")?.is_none() {
                        verse = open_verse(&e, &mut out, true)?;
                    }
                }
                name if is_block(name) => push_text(&mut verse, &mut divs, " "),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"note" => note_depth = note_depth.saturating_sub(1),
                b"div" => {
                    if verse.as_ref().is_some_and(|v| v.milestone) {
                        close_scope(&mut out, verse.take());
                    }
                    if let Some(scope) = divs.pop() {
                        close_scope(&mut out, scope);
                    }
                }
                b"verse" => {
                    if verse.as_ref().is_some_and(|v| !v.milestone) {
                        close_scope(&mut out, verse.take());
                    }
                }
                name if is_block(name) => push_text(&mut verse, &mut divs, " "),
                _ => {}
            },
            Event::Text(t) if note_depth == 0 => {
                let text = t.unescape()?;
                push_text(&mut verse, &mut divs, &text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    close_scope(&mut out, verse.take());
    while let Some(scope) = divs.pop() {
        close_scope(&mut out, scope);
    }

    if !saw_osis_text {
        return Err(PackError::structural(origin, "an <osisText> element"));
    }
    Ok(out)
}

fn push_text(verse: &mut Option<Scope>, divs: &mut [Option<Scope>], s: &str) {
    if let Some(v) = verse.as_mut() {
        v.push_text(s);
    } else if let Some(scope) = divs.iter_mut().rev().find_map(Option::as_mut) {
        scope.push_text(s);
    }
}

fn open_scope(out: &mut Extraction<CommentaryEntry>, id: String) -> Scope {
    let reference = match reference_span(&id) {
        Ok(r) => Some(r),
        Err(_) => {
            out.skip(format!("annotateRef {id}"), SkipReason::MalformedOsisId(id.clone()));
            None
        }
    };
    Scope {
        label: id,
        reference,
        milestone: false,
        text: String::new(),
    }
}

fn open_verse(e: &BytesStart<'_>, out: &mut Extraction<CommentaryEntry>, milestone: bool) -> Result<Option<Scope>> {
    let id = match attr(e, b"osisID")? {
        Some(id) => id,
        None => match attr(e, b"sID")? {
            Some(id) => id,
            None => {
                out.skip("verse without id", SkipReason::MissingAttribute("osisID"));
                return Ok(Some(Scope {
                    label: String::new(),
                    reference: None,
                    milestone,
                    text: String::new(),
                }));
            }
        },
    };
    let mut scope = open_scope(out, id);
    scope.milestone = milestone;
    Ok(Some(scope))
}

/// `osisID` lists like "Gen.1.1 Gen.1.2 Gen.1.3" widen to a range when they
/// stay within one chapter.
fn reference_span(id: &str) -> Result<Reference> {
    let mut span = reference::parse_osis(id)?;
    if let Some(last) = id.split_whitespace().skip(1).last() {
        if let Ok(end) = reference::parse_osis(last) {
            if end.book == span.book && end.chapter == span.chapter && end.verse_end > span.verse_end {
                span.verse_end = end.verse_end;
            }
        }
    }
    Ok(span)
}

fn close_scope(out: &mut Extraction<CommentaryEntry>, scope: Option<Scope>) {
    let Some(scope) = scope else { return };
    let Some(r) = scope.reference else { return };

    let text = normalize::text(&scope.text);
    if text.is_empty() {
        out.skip(format!("commentary on {}", scope.label), SkipReason::EmptyText);
        return;
    }
    out.records.push(CommentaryEntry {
        book: r.book,
        chapter: r.chapter,
        verse_start: r.verse_start,
        verse_end: r.verse_end,
        text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(r#"<osis><osisText osisIDWork="MHC"><div type="book" osisID="Gen">{body}</div></osisText></osis>"#)
    }

    #[test]
    fn annotate_ref_divs() {
        let xml = wrap(
            r#"<div type="section" annotateType="commentary" annotateRef="Gen.1.1-Gen.1.5">
                 <p>The first verse of the Bible gives us a  surprising account.</p><p>Second paragraph.</p>
               </div>
               <div annotateRef="Gen.1.6">Of the firmament.</div>"#,
        );
        let ex = parse_str(&xml, "t").unwrap();
        assert_eq!(ex.records.len(), 2);
        let first = &ex.records[0];
        assert_eq!((first.book.as_str(), first.chapter, first.verse_start, first.verse_end), ("Genesis", 1, 1, 5));
        assert_eq!(first.text, "The first verse of the Bible gives us a surprising account. Second paragraph.");
        assert_eq!(ex.records[1].verse_end, 6);
    }

    #[test]
    fn verse_scoped_entries() {
        let xml = wrap(
            r#"<chapter osisID="Gen.1">
                 <verse osisID="Gen.1.1 Gen.1.2">In the beginning<note>x</note> God created.</verse>
                 <verse sID="Gen.1.3" osisID="Gen.1.3"/>Light.<verse eID="Gen.1.3"/>
               </chapter>"#,
        );
        let ex = parse_str(&xml, "t").unwrap();
        let spans: Vec<_> = ex.records.iter().map(|c| (c.verse_start, c.verse_end, c.text.as_str())).collect();
        assert_eq!(spans, vec![(1, 2, "In the beginning God created."), (3, 3, "Light.")]);
    }

    #[test]
    fn bad_refs_and_empty_entries_skipped() {
        let xml = wrap(
            r#"<div annotateRef="Tob.1.1">apocrypha</div>
               <div annotateRef="Gen.2.1"> </div>
               <div annotateRef="Gen.2.2">rest</div>"#,
        );
        let ex = parse_str(&xml, "t").unwrap();
        assert_eq!(ex.records.len(), 1);
        let reasons: Vec<_> = ex.skipped.iter().map(|s| s.reason.clone()).collect();
        assert_eq!(reasons, vec![SkipReason::MalformedOsisId("Tob.1.1".into()), SkipReason::EmptyText]);
    }
}
