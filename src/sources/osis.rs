//! OSIS XML: `<verse osisID="Gen.1.1">` containers or `sID`/`eID` milestones,
//! with optional `<w lemma morph>` word markup inside.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::books;
use crate::error::{PackError, Result};
use crate::normalize::{self, Language};
use crate::records::{Extraction, Outcome, SkipReason, VerseRecord, WordRecord};

#[derive(Debug, Default)]
pub struct OsisDocument {
    pub verses: Extraction<VerseRecord>,
    pub words: Vec<WordRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseKey {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

struct OpenVerse {
    id: String,
    key: Option<VerseKey>,
    milestone: bool,
    text: String,
    words: Vec<WordRecord>,
    next_index: u32,
}

#[derive(Default)]
struct OpenWord {
    lemma: Option<String>,
    morph: Option<String>,
    xlit: Option<String>,
    gloss: Option<String>,
    text: String,
}

pub fn read_file(path: &Path, language: Language) -> Result<OsisDocument> {
    let xml = fs::read_to_string(path)?;
    parse_str(&xml, &path.display().to_string(), language)
}

pub fn parse_str(xml: &str, origin: &str, language: Language) -> Result<OsisDocument> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut doc = OsisDocument::default();
    let mut saw_osis_text = false;
    let mut note_depth = 0usize;
    let mut verse: Option<OpenVerse> = None;
    let mut word: Option<OpenWord> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"osisText" => saw_osis_text = true,
                b"note" => note_depth += 1,
                b"verse" => {
                    close_verse(&mut doc, verse.take());
                    verse = Some(open_verse(&e, &mut doc, false)?);
                }
                b"w" if note_depth == 0 && verse.is_some() => word = Some(open_word(&e)?),
                name if is_block(name) => push_space(&mut verse),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"verse" => {
                    close_verse(&mut doc, verse.take());
                    if attr(&e, b"eID")?.is_none() {
                        verse = Some(open_verse(&e, &mut doc, true)?);
                    }
                }
                b"w" if note_depth == 0 => {
                    let w = open_word(&e)?;
                    finish_word(&mut verse, w, language);
                }
                name if is_block(name) => push_space(&mut verse),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"note" => note_depth = note_depth.saturating_sub(1),
                b"verse" => {
                    if verse.as_ref().is_some_and(|v| !v.milestone) {
                        close_verse(&mut doc, verse.take());
                    }
                }
                b"w" => {
                    if let Some(w) = word.take() {
                        finish_word(&mut verse, w, language);
                    }
                }
                name if is_block(name) => push_space(&mut verse),
                _ => {}
            },
            Event::Text(t) if note_depth == 0 => {
                let text = t.unescape()?;
                if let Some(w) = word.as_mut() {
                    w.text.push_str(&text);
                }
                if let Some(v) = verse.as_mut() {
                    v.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    close_verse(&mut doc, verse.take());

    if !saw_osis_text {
        return Err(PackError::structural(origin, "an <osisText> element"));
    }
    Ok(doc)
}

/// Resolve `Book.Chapter.Verse` through the canonical book table.
/// Only the first ID of a space-separated list, and the start of a range, are used.
pub fn verse_key(osis_id: &str) -> Outcome<VerseKey> {
    let first = osis_id.split_whitespace().next().unwrap_or_default();
    let start = first.split('-').next().unwrap_or_default();
    let parts: Vec<&str> = start.split('.').collect();
    let [code, chapter, verse] = parts[..] else {
        return Outcome::Skipped(SkipReason::MalformedOsisId(osis_id.to_string()));
    };

    let Some(book) = books::by_osis(code) else {
        return Outcome::Skipped(SkipReason::UnknownBook(code.to_string()));
    };
    let chapter_no = match chapter.parse::<u32>() {
        Ok(n) if n >= 1 && n <= book.chapters => n,
        _ => {
            return Outcome::Skipped(SkipReason::InvalidNumber {
                field: "chapter",
                value: chapter.to_string(),
            })
        }
    };
    let verse_no = match verse.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => {
            return Outcome::Skipped(SkipReason::InvalidNumber {
                field: "verse",
                value: verse.to_string(),
            })
        }
    };

    Outcome::Accepted(VerseKey {
        book: book.name.to_string(),
        chapter: chapter_no,
        verse: verse_no,
    })
}

pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    match e.try_get_attribute(name)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

pub(crate) fn is_block(name: &[u8]) -> bool {
    matches!(
        name,
        b"p" | b"l" | b"lg" | b"lb" | b"div" | b"title" | b"head" | b"list" | b"item" | b"chapter"
    )
}

fn push_space(verse: &mut Option<OpenVerse>) {
    if let Some(v) = verse.as_mut() {
        v.text.push(' ');
    }
}

fn open_verse(e: &BytesStart<'_>, doc: &mut OsisDocument, milestone: bool) -> Result<OpenVerse> {
    let id = match attr(e, b"osisID")? {
        Some(id) => Some(id),
        None => attr(e, b"sID")?,
    };
    let key = match &id {
        Some(id) => match verse_key(id) {
            Outcome::Accepted(key) => Some(key),
            Outcome::Skipped(reason) => {
                doc.verses.skip(format!("verse {id}"), reason);
                None
            }
            Outcome::Fatal(err) => return Err(err),
        },
        None => {
            doc.verses.skip("verse without id", SkipReason::MissingAttribute("osisID"));
            None
        }
    };
    Ok(OpenVerse {
        id: id.unwrap_or_default(),
        key,
        milestone,
        text: String::new(),
        words: Vec::new(),
        next_index: 0,
    })
}

fn open_word(e: &BytesStart<'_>) -> Result<OpenWord> {
    Ok(OpenWord {
        lemma: attr(e, b"lemma")?,
        morph: attr(e, b"morph")?,
        xlit: attr(e, b"xlit")?,
        gloss: attr(e, b"gloss")?,
        text: String::new(),
    })
}

/// Lemma-less `<w>` elements are dropped without taking an index slot.
fn finish_word(verse: &mut Option<OpenVerse>, word: OpenWord, language: Language) {
    let Some(v) = verse.as_mut() else { return };
    let Some(key) = &v.key else { return };
    let Some(lemma) = word.lemma.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()) else {
        return;
    };

    v.words.push(WordRecord {
        book: key.book.clone(),
        chapter: key.chapter,
        verse: key.verse,
        word_index: v.next_index,
        text: normalize::text(&word.text),
        strongs: normalize::strongs(&lemma, language),
        lemma,
        morph: word.morph.unwrap_or_default(),
        transliteration: word.xlit.map(|x| normalize::text(&x)),
        gloss: word.gloss.map(|g| normalize::text(&g)),
    });
    v.next_index += 1;
}

fn close_verse(doc: &mut OsisDocument, verse: Option<OpenVerse>) {
    let Some(v) = verse else { return };
    let Some(key) = v.key else { return };

    let text = normalize::text(&v.text);
    if text.is_empty() {
        doc.verses.skip(format!("verse {}", v.id), SkipReason::EmptyText);
        return;
    }
    doc.verses.records.push(VerseRecord {
        book: key.book,
        chapter: key.chapter,
        verse: key.verse,
        text,
    });
    doc.words.extend(v.words);
}
