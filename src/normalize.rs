use std::fmt;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// NFC-compose, collapse whitespace runs to one space, trim.
pub fn text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().join(" ");
    collapsed.as_str().nfc().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Hebrew,
    Greek,
}

impl Language {
    pub fn strongs_prefix(self) -> char {
        match self {
            Language::Hebrew => 'H',
            Language::Greek => 'G',
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Hebrew => "hbo",
            Language::Greek => "grc",
        }
    }

    /// Accepts ISO 639 codes and plain names.
    pub fn from_code(code: &str) -> Option<Language> {
        match code.to_ascii_lowercase().as_str() {
            "hbo" | "he" | "heb" | "hebrew" => Some(Language::Hebrew),
            "grc" | "el" | "gr" | "greek" => Some(Language::Greek),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Strong's number from the first decimal run in a lemma: `"b/7225"` → `"H7225"`.
/// No digits yields an empty string.
pub fn strongs(lemma: &str, language: Language) -> String {
    let Some(run) = DIGITS_RE.find(lemma) else {
        return String::new();
    };
    let digits = match run.as_str().trim_start_matches('0') {
        "" => "0",
        d => d,
    };
    format!("{}{:0>4}", language.strongs_prefix(), digits)
}
