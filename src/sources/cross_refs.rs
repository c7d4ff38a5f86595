//! Cross references from two kinds of input.
//!
//! Curated JSON, `[{"from": "Genesis 1:1", "to": "John 1:1", "description": "…"}]`,
//! is hand-written: a bad citation is an author error and aborts the build.
//! Each entry is stored forward and reverse.
//!
//! Bulk tab-separated dumps (`From\tTo\tVotes`, OSIS citations) are already
//! directed and machine-extracted: malformed rows are skipped.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{has_extension, one_or_many};
use crate::error::{PackError, Result};
use crate::records::{CrossReferenceRecord, Extraction, Outcome, SkipReason};
use crate::reference;

pub const CURATED_SOURCE: &str = "curated";
pub const BULK_SOURCE: &str = "openbible";

pub fn read_file(path: &Path, source: Option<&str>) -> Result<Extraction<CrossReferenceRecord>> {
    let raw = fs::read_to_string(path)?;
    let origin = path.display().to_string();
    if has_extension(path, &["json"]) {
        let doc: Value = serde_json::from_str(&raw)?;
        parse_curated(&doc, source.unwrap_or(CURATED_SOURCE), &origin)
    } else {
        parse_bulk(&raw, source.unwrap_or(BULK_SOURCE), &origin)
    }
}

// ── Curated ──

pub fn parse_curated(doc: &Value, source: &str, origin: &str) -> Result<Extraction<CrossReferenceRecord>> {
    let entries = match doc {
        Value::Object(obj) if obj.contains_key("cross_references") => &obj["cross_references"],
        _ => doc,
    };

    let mut out = Extraction::default();
    for (i, entry) in one_or_many(entries).into_iter().enumerate() {
        let location = format!("{origin} entry[{i}]");
        match curated_pair(entry, source, &location) {
            Outcome::Accepted(rows) => out.records.extend(rows),
            Outcome::Skipped(reason) => out.skip(location, reason),
            Outcome::Fatal(err) => return Err(err),
        }
    }
    Ok(out)
}

fn curated_pair(entry: &Value, source: &str, location: &str) -> Outcome<[CrossReferenceRecord; 2]> {
    let field = |key: &str| entry.get(key).and_then(Value::as_str);
    let (Some(from), Some(to)) = (field("from"), field("to")) else {
        return Outcome::Fatal(PackError::malformed(location, "expected string `from` and `to` citations"));
    };
    let from = match reference::parse(from) {
        Ok(r) => r,
        Err(e) => return Outcome::Fatal(e),
    };
    let to = match reference::parse(to) {
        Ok(r) => r,
        Err(e) => return Outcome::Fatal(e),
    };
    let votes = match entry.get("votes") {
        None | Some(Value::Null) => 0,
        Some(v) => match parse_votes(v) {
            Some(n) => n,
            None => return Outcome::Fatal(PackError::malformed(location, format!("non-numeric votes {v}"))),
        },
    };
    let description = field("description").unwrap_or_default();

    Outcome::Accepted(CrossReferenceRecord::pair(&from, &to, votes, source, description))
}

/// Integer votes from a JSON number or numeric string.
fn parse_votes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ── Bulk ──

pub fn parse_bulk(raw: &str, source: &str, origin: &str) -> Result<Extraction<CrossReferenceRecord>> {
    let mut out = Extraction::default();
    for (n, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || is_header(line) {
            continue;
        }
        out.push(format!("{origin}:{}", n + 1), bulk_row(line, source))?;
    }
    Ok(out)
}

fn is_header(line: &str) -> bool {
    line.split('\t')
        .next()
        .is_some_and(|f| f.trim().eq_ignore_ascii_case("from verse") || f.trim().eq_ignore_ascii_case("from"))
}

fn bulk_row(line: &str, source: &str) -> Outcome<CrossReferenceRecord> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    let [from, to, rest @ ..] = fields.as_slice() else {
        return Outcome::Skipped(SkipReason::MalformedEntry(format!("expected From\\tTo[\\tVotes]: {line:?}")));
    };
    let Ok(from) = reference::parse_osis(from) else {
        return Outcome::Skipped(SkipReason::MalformedCitation(from.to_string()));
    };
    let Ok(to) = reference::parse_osis(to) else {
        return Outcome::Skipped(SkipReason::MalformedCitation(to.to_string()));
    };
    let votes = match rest.first() {
        None | Some(&"") => 0,
        Some(v) => match v.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                return Outcome::Skipped(SkipReason::InvalidNumber {
                    field: "votes",
                    value: v.to_string(),
                })
            }
        },
    };

    Outcome::Accepted(CrossReferenceRecord::directed(&from, &to, votes, source, ""))
}
