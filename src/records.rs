//! Flat row records and per-record outcomes.

use std::fmt;

use rusqlite::{params, Statement};
use tracing::warn;

use crate::error::{PackError, Result};
use crate::reference::Reference;

/// A row type with a fixed home table in a pack schema.
pub trait PackRow {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

// ── Verses ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRecord {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl PackRow for VerseRecord {
    const TABLE: &'static str = "verses";
    const COLUMNS: &'static [&'static str] = &["book", "chapter", "verse", "text"];

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![self.book, self.chapter, self.verse, self.text])
    }
}

// ── Words ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub word_index: u32,
    pub text: String,
    pub lemma: String,
    pub morph: String,
    pub strongs: String,
    pub transliteration: Option<String>,
    pub gloss: Option<String>,
}

impl PackRow for WordRecord {
    const TABLE: &'static str = "words";
    const COLUMNS: &'static [&'static str] = &[
        "book",
        "chapter",
        "verse",
        "word_index",
        "text",
        "lemma",
        "morph",
        "strongs",
        "transliteration",
        "gloss",
    ];

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.book,
            self.chapter,
            self.verse,
            self.word_index,
            self.text,
            self.lemma,
            self.morph,
            self.strongs,
            self.transliteration,
            self.gloss,
        ])
    }
}

// ── Cross references ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceRecord {
    pub from_book: String,
    pub from_chapter: u32,
    pub from_verse: u32,
    pub to_book: String,
    pub to_chapter: u32,
    pub to_verse_start: u32,
    pub to_verse_end: u32,
    pub votes: i64,
    pub source: String,
    pub description: String,
}

pub const REVERSE_SUFFIX: &str = " (reverse)";

impl CrossReferenceRecord {
    /// One directed row `from -> to`. A ranged `from` anchors on its first verse.
    pub fn directed(from: &Reference, to: &Reference, votes: i64, source: &str, description: &str) -> Self {
        CrossReferenceRecord {
            from_book: from.book.clone(),
            from_chapter: from.chapter,
            from_verse: from.verse_start,
            to_book: to.book.clone(),
            to_chapter: to.chapter,
            to_verse_start: to.verse_start,
            to_verse_end: to.verse_end,
            votes,
            source: source.to_string(),
            description: description.to_string(),
        }
    }

    /// Forward row plus its reverse, whose description carries the reverse suffix.
    pub fn pair(from: &Reference, to: &Reference, votes: i64, source: &str, description: &str) -> [Self; 2] {
        let reverse_description = format!("{description}{REVERSE_SUFFIX}");
        [
            Self::directed(from, to, votes, source, description),
            Self::directed(to, from, votes, source, &reverse_description),
        ]
    }
}

impl PackRow for CrossReferenceRecord {
    const TABLE: &'static str = "cross_references";
    const COLUMNS: &'static [&'static str] = &[
        "from_book",
        "from_chapter",
        "from_verse",
        "to_book",
        "to_chapter",
        "to_verse_start",
        "to_verse_end",
        "votes",
        "source",
        "description",
    ];

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.from_book,
            self.from_chapter,
            self.from_verse,
            self.to_book,
            self.to_chapter,
            self.to_verse_start,
            self.to_verse_end,
            self.votes,
            self.source,
            self.description,
        ])
    }
}

// ── Lexicon ──

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexiconEntry {
    pub strongs: String,
    pub lemma: String,
    pub transliteration: String,
    pub pronunciation: String,
    pub definition: String,
}

impl PackRow for LexiconEntry {
    const TABLE: &'static str = "lexicon_entries";
    const COLUMNS: &'static [&'static str] =
        &["strongs", "lemma", "transliteration", "pronunciation", "definition"];

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.strongs,
            self.lemma,
            self.transliteration,
            self.pronunciation,
            self.definition,
        ])
    }
}

// ── Commentary ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryEntry {
    pub book: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
    pub text: String,
}

impl PackRow for CommentaryEntry {
    const TABLE: &'static str = "commentary_entries";
    const COLUMNS: &'static [&'static str] = &["book", "chapter", "verse_start", "verse_end", "text"];

    fn execute(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.book,
            self.chapter,
            self.verse_start,
            self.verse_end,
            self.text,
        ])
    }
}

// ── Outcomes ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownBook(String),
    MalformedOsisId(String),
    InvalidNumber { field: &'static str, value: String },
    MissingAttribute(&'static str),
    EmptyText,
    MalformedCitation(String),
    MalformedEntry(String),
    UnreadableFile(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownBook(code) => write!(f, "unknown book {code:?}"),
            SkipReason::MalformedOsisId(id) => write!(f, "malformed osisID {id:?}"),
            SkipReason::InvalidNumber { field, value } => write!(f, "invalid {field} {value:?}"),
            SkipReason::MissingAttribute(attr) => write!(f, "missing attribute `{attr}`"),
            SkipReason::EmptyText => f.write_str("empty text"),
            SkipReason::MalformedCitation(c) => write!(f, "malformed citation {c:?}"),
            SkipReason::MalformedEntry(what) => write!(f, "malformed entry: {what}"),
            SkipReason::UnreadableFile(err) => write!(f, "unreadable file: {err}"),
        }
    }
}

#[derive(Debug)]
pub enum Outcome<T> {
    Accepted(T),
    Skipped(SkipReason),
    Fatal(PackError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub location: String,
    pub reason: SkipReason,
}

/// Accepted records plus the skips met along the way.
#[derive(Debug)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub skipped: Vec<Skip>,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Extraction {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Extraction<T> {
    /// Fold one outcome in. Skips are logged and kept; `Fatal` is returned.
    pub fn push(&mut self, location: impl Into<String>, outcome: Outcome<T>) -> Result<()> {
        match outcome {
            Outcome::Accepted(record) => self.records.push(record),
            Outcome::Skipped(reason) => self.skip(location, reason),
            Outcome::Fatal(err) => return Err(err),
        }
        Ok(())
    }

    pub fn skip(&mut self, location: impl Into<String>, reason: SkipReason) {
        let location = location.into();
        warn!("skipping {}: {}", location, reason);
        self.skipped.push(Skip { location, reason });
    }

    pub fn extend(&mut self, other: Extraction<T>) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
    }
}
