//! JSON Bible documents: books → chapters → verses.
//!
//! Accepted shapes, freely mixed:
//!   `[{"name": "Genesis", "chapters": [["In the beginning…", …], …]}]`
//!   `{"books": [{"book": "Genesis", "chapters": [{"chapter": 1, "verses": [{"verse": 1, "text": "…"}]}]}]}`
//! A bare string verse or a bare array chapter takes its number from its position.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{one_or_many, positive_number};
use crate::books;
use crate::error::{PackError, Result};
use crate::normalize;
use crate::records::{Extraction, Outcome, SkipReason, VerseRecord};

pub fn read_file(path: &Path) -> Result<Extraction<VerseRecord>> {
    let raw = fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&raw)?;
    parse_document(&doc, &path.display().to_string())
}

pub fn parse_document(doc: &Value, origin: &str) -> Result<Extraction<VerseRecord>> {
    let books = match doc {
        Value::Array(_) => doc,
        Value::Object(obj) => obj
            .get("books")
            .ok_or_else(|| PackError::structural(origin, "an array of books or a `books` key"))?,
        _ => return Err(PackError::structural(origin, "an array of books or a `books` key")),
    };

    let mut out = Extraction::default();
    for (bi, book) in one_or_many(books).into_iter().enumerate() {
        let location = format!("{origin} book[{bi}]");
        let Some(name) = book_name(book) else {
            out.skip(location, SkipReason::MissingAttribute("name"));
            continue;
        };
        let Some(chapters) = book.get("chapters") else {
            out.skip(format!("{location} ({name})"), SkipReason::MalformedEntry("book without chapters".into()));
            continue;
        };

        for (ci, chapter) in one_or_many(chapters).into_iter().enumerate() {
            read_chapter(&mut out, &name, ci, chapter, &location)?;
        }
    }
    Ok(out)
}

fn book_name(book: &Value) -> Option<String> {
    let raw = ["name", "book"]
        .iter()
        .find_map(|k| book.get(*k).and_then(Value::as_str))
        .map(normalize::text)
        .filter(|n| !n.is_empty())?;
    Some(books::by_name(&raw).map(|b| b.name.to_string()).unwrap_or(raw))
}

fn read_chapter(
    out: &mut Extraction<VerseRecord>,
    book: &str,
    position: usize,
    chapter: &Value,
    location: &str,
) -> Result<()> {
    let (number, verses) = match chapter {
        Value::Array(_) => (Some(position as u32 + 1), Some(chapter)),
        Value::Object(obj) => {
            let number = match obj.get("chapter") {
                Some(n) => positive_number(n),
                None => Some(position as u32 + 1),
            };
            (number, obj.get("verses"))
        }
        _ => (None, None),
    };

    let location = format!("{location} {book} chapter[{position}]");
    let Some(number) = number else {
        let value = chapter.get("chapter").map(Value::to_string).unwrap_or_default();
        out.skip(location, SkipReason::InvalidNumber { field: "chapter", value });
        return Ok(());
    };
    let Some(verses) = verses else {
        out.skip(location, SkipReason::MalformedEntry("chapter without verses".into()));
        return Ok(());
    };

    for (vi, verse) in one_or_many(verses).into_iter().enumerate() {
        let outcome = read_verse(book, number, vi, verse);
        out.push(format!("{book} {number}:{}", vi + 1), outcome)?;
    }
    Ok(())
}

fn read_verse(book: &str, chapter: u32, position: usize, verse: &Value) -> Outcome<VerseRecord> {
    let (number, raw_text) = match verse {
        Value::String(text) => (Some(position as u32 + 1), Some(text.as_str())),
        Value::Object(obj) => {
            let number = match obj.get("verse") {
                Some(n) => positive_number(n),
                None => Some(position as u32 + 1),
            };
            (number, obj.get("text").and_then(Value::as_str))
        }
        other => {
            return Outcome::Skipped(SkipReason::MalformedEntry(format!(
                "verse is neither string nor object: {other}"
            )))
        }
    };

    let Some(number) = number else {
        let value = verse.get("verse").map(Value::to_string).unwrap_or_default();
        return Outcome::Skipped(SkipReason::InvalidNumber { field: "verse", value });
    };
    let Some(raw_text) = raw_text else {
        return Outcome::Skipped(SkipReason::MissingAttribute("text"));
    };
    let text = normalize::text(raw_text);
    if text.is_empty() {
        return Outcome::Skipped(SkipReason::EmptyText);
    }

    Outcome::Accepted(VerseRecord {
        book: book.to_string(),
        chapter,
        verse: number,
        text,
    })
}
