//! Lexicon inputs: tab-delimited pronunciation tables (`.tsv`/`.tab`) or plain
//! wordlists with one lemma per line.

use std::fs;
use std::path::Path;

use super::has_extension;
use crate::error::Result;
use crate::normalize;
use crate::records::{Extraction, LexiconEntry, Outcome, SkipReason};

pub fn read_file(path: &Path) -> Result<Extraction<LexiconEntry>> {
    let raw = fs::read_to_string(path)?;
    let origin = path.display().to_string();
    if has_extension(path, &["tsv", "tab"]) {
        parse_table(&raw, &origin)
    } else {
        parse_wordlist(&raw, &origin)
    }
}

/// `strongs \t lemma \t transliteration \t pronunciation [\t definition]`
pub fn parse_table(raw: &str, origin: &str) -> Result<Extraction<LexiconEntry>> {
    let mut out = Extraction::default();
    for (n, line) in content_lines(raw) {
        out.push(format!("{origin}:{n}"), table_row(line))?;
    }
    Ok(out)
}

pub fn parse_wordlist(raw: &str, origin: &str) -> Result<Extraction<LexiconEntry>> {
    let mut out = Extraction::default();
    for (n, line) in content_lines(raw) {
        let lemma = normalize::text(line);
        let outcome = if lemma.is_empty() {
            Outcome::Skipped(SkipReason::EmptyText)
        } else {
            Outcome::Accepted(LexiconEntry {
                lemma,
                ..Default::default()
            })
        };
        out.push(format!("{origin}:{n}"), outcome)?;
    }
    Ok(out)
}

fn content_lines(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    raw.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
}

fn table_row(line: &str) -> Outcome<LexiconEntry> {
    let fields: Vec<String> = line.split('\t').map(normalize::text).collect();
    if fields.len() < 2 {
        return Outcome::Skipped(SkipReason::MalformedEntry(format!("expected at least 2 fields: {line:?}")));
    }
    let field = |i: usize| fields.get(i).cloned().unwrap_or_default();

    let entry = LexiconEntry {
        strongs: field(0).to_uppercase(),
        lemma: field(1),
        transliteration: field(2),
        pronunciation: field(3),
        definition: field(4),
    };
    if entry.strongs.is_empty() && entry.lemma.is_empty() {
        return Outcome::Skipped(SkipReason::EmptyText);
    }
    Outcome::Accepted(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows() {
        let raw = "# strongs\tlemma\txlit\tpron\n\
                   H7225\tרֵאשִׁית\tre'shiyth\tray-sheeth'\tthe first, in place, time, order or rank\n\
                   g3056\tλόγος\tlogos\tlog'-os\n\
                   \n\
                   H0001\n";
        let ex = parse_table(raw, "t").unwrap();
        assert_eq!(ex.records.len(), 2);
        assert_eq!(ex.records[0].definition, "the first, in place, time, order or rank");
        assert_eq!(ex.records[1].strongs, "G3056");
        assert_eq!(ex.records[1].definition, "");
        assert_eq!(ex.skipped.len(), 1);
        assert_eq!(ex.skipped[0].location, "t:5");
        assert!(matches!(ex.skipped[0].reason, SkipReason::MalformedEntry(_)));
    }

    #[test]
    fn wordlist_lines() {
        let ex = parse_wordlist("logos\n# comment\n  agape  \r\n\n", "t").unwrap();
        let lemmas: Vec<_> = ex.records.iter().map(|e| e.lemma.as_str()).collect();
        assert_eq!(lemmas, vec!["logos", "agape"]);
        assert!(ex.records.iter().all(|e| e.strongs.is_empty()));
    }
}
