//! Scripture citation parsing.
//!
//! Free-text citations ("1 Samuel 3:4", "John 1:1-5") are matched by shape only;
//! the book token is not checked against a book list. OSIS IDs ("Gen.1.1",
//! "Gen.1.1-Gen.1.3") go through the canonical book table instead.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::books;
use crate::error::{PackError, Result};

static CITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\d\s?)?[A-Za-z]+(?:\s+[A-Za-z]+)*)\s+(\d+):(\d+)(?:\s*-\s*(\d+))?$").unwrap()
});
static OSIS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-3]?[A-Za-z]+)\.(\d+)\.(\d+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub book: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
}

impl Reference {
    pub fn is_range(&self) -> bool {
        self.verse_end != self.verse_start
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse_start)?;
        if self.is_range() {
            write!(f, "-{}", self.verse_end)?;
        }
        Ok(())
    }
}

/// Parse `<Book> <chapter>:<verse>[-<verseEnd>]`.
pub fn parse(citation: &str) -> Result<Reference> {
    let invalid = || PackError::InvalidReferenceFormat(citation.to_string());
    let caps = CITATION_RE.captures(citation.trim()).ok_or_else(invalid)?;

    let book = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
    let chapter = positive(&caps[2]).ok_or_else(invalid)?;
    let verse_start = positive(&caps[3]).ok_or_else(invalid)?;
    let verse_end = match caps.get(4) {
        Some(m) => positive(m.as_str()).ok_or_else(invalid)?,
        None => verse_start,
    };
    if verse_end < verse_start {
        return Err(invalid());
    }

    Ok(Reference {
        book,
        chapter,
        verse_start,
        verse_end,
    })
}

/// Parse an OSIS ID, resolving the book code to its canonical English name.
///
/// Ranges must stay within one book. A range crossing into a later chapter
/// (`Gen.1.31-Gen.2.3`) keeps only its start verse, since a reference spans
/// verses of a single chapter. A single ID may also be followed by further
/// space-separated IDs, of which only the first is used.
pub fn parse_osis(osis_id: &str) -> Result<Reference> {
    let invalid = || PackError::InvalidReferenceFormat(osis_id.to_string());
    let first = osis_id.split_whitespace().next().ok_or_else(invalid)?;
    let (start, end) = match first.split_once('-') {
        Some((s, e)) => (s, Some(e)),
        None => (first, None),
    };

    let (code, chapter, verse_start) = split_osis(start).ok_or_else(invalid)?;
    let book = books::by_osis(code).ok_or_else(invalid)?;
    if chapter > book.chapters {
        return Err(invalid());
    }

    let verse_end = match end {
        Some(e) => {
            let (end_code, end_chapter, v) = split_osis(e).ok_or_else(invalid)?;
            if end_code != code || end_chapter < chapter || end_chapter > book.chapters {
                return Err(invalid());
            }
            if end_chapter > chapter {
                verse_start
            } else if v < verse_start {
                return Err(invalid());
            } else {
                v
            }
        }
        None => verse_start,
    };

    Ok(Reference {
        book: book.name.to_string(),
        chapter,
        verse_start,
        verse_end,
    })
}

fn split_osis(id: &str) -> Option<(&str, u32, u32)> {
    let caps = OSIS_ID_RE.captures(id)?;
    let code = caps.get(1)?.as_str();
    Some((code, positive(&caps[2])?, positive(&caps[3])?))
}

fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_citation() {
        let r = parse("Genesis 1:1").unwrap();
        assert_eq!(r.book, "Genesis");
        assert_eq!((r.chapter, r.verse_start, r.verse_end), (1, 1, 1));
        assert!(!r.is_range());
    }

    #[test]
    fn numbered_and_multiword_books() {
        assert_eq!(parse("1 Corinthians 13:4").unwrap().book, "1 Corinthians");
        assert_eq!(parse("2Kings 2:11").unwrap().book, "2Kings");
        assert_eq!(parse("Song of Solomon 2:1").unwrap().book, "Song of Solomon");
    }

    #[test]
    fn range() {
        let r = parse("John 3:16-18").unwrap();
        assert_eq!((r.verse_start, r.verse_end), (16, 18));
        assert_eq!(r.to_string(), "John 3:16-18");
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "Genesis",
            "Genesis 1",
            "Genesis 1:",
            "1:1",
            "Genesis 0:1",
            "Genesis 1:0",
            "John 3:18-16",
            "Gen.1.1",
            "",
        ] {
            assert!(
                matches!(parse(bad), Err(PackError::InvalidReferenceFormat(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn osis_ids() {
        let r = parse_osis("Gen.1.1").unwrap();
        assert_eq!(r.book, "Genesis");
        assert_eq!((r.chapter, r.verse_start), (1, 1));

        let r = parse_osis("Prov.8.22-Prov.8.30").unwrap();
        assert_eq!(r.book, "Proverbs");
        assert_eq!((r.verse_start, r.verse_end), (22, 30));

        assert_eq!(parse_osis("1John.4.8 1John.4.9").unwrap().book, "1 John");
    }

    #[test]
    fn osis_rejects_unknown_or_out_of_range() {
        assert!(parse_osis("Tob.1.1").is_err());
        assert!(parse_osis("Gen.51.1").is_err());
        assert!(parse_osis("Gen.1.x").is_err());
        assert!(parse_osis("Gen.1.5-Exod.1.1").is_err());
        assert!(parse_osis("Gen.2.3-Gen.1.31").is_err());
        assert!(parse_osis("Gen.1.5-Gen.1.2").is_err());
    }

    #[test]
    fn osis_range_across_chapters_keeps_start_verse() {
        let r = parse_osis("Gen.1.31-Gen.2.3").unwrap();
        assert_eq!(r.book, "Genesis");
        assert_eq!((r.chapter, r.verse_start, r.verse_end), (1, 31, 31));
    }
}
