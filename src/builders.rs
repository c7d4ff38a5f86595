//! One builder per source format. A builder knows its pack type, its conflict
//! policy and how to turn its input path into rows; the pipeline does the rest.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::normalize::Language;
use crate::records::{CommentaryEntry, CrossReferenceRecord, LexiconEntry, Skip, VerseRecord, WordRecord};
use crate::schema::PackType;
use crate::sources::{self, commentary, cross_refs, json_text, lexicon, osis};
use crate::writer::ConflictPolicy;

const XML_EXTENSIONS: &[&str] = &["xml", "osis"];

/// Rows loaded from every input file, grouped by target table.
#[derive(Debug, Default)]
pub struct PackContent {
    pub verses: Vec<VerseRecord>,
    pub words: Vec<WordRecord>,
    pub cross_references: Vec<CrossReferenceRecord>,
    pub lexicon: Vec<LexiconEntry>,
    pub commentary: Vec<CommentaryEntry>,
    pub skipped: Vec<Skip>,
}

impl PackContent {
    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
            && self.words.is_empty()
            && self.cross_references.is_empty()
            && self.lexicon.is_empty()
            && self.commentary.is_empty()
    }
}

pub trait Builder {
    fn pack_type(&self) -> PackType;

    fn policy(&self) -> ConflictPolicy;

    /// Language recorded in metadata when none is given explicitly.
    fn language(&self) -> Option<Language> {
        None
    }

    fn load(&self) -> Result<PackContent>;
}

// ── Text ──

pub struct JsonText {
    pub input: PathBuf,
}

impl Builder for JsonText {
    fn pack_type(&self) -> PackType {
        PackType::Text
    }

    fn policy(&self) -> ConflictPolicy {
        ConflictPolicy::Ignore
    }

    fn load(&self) -> Result<PackContent> {
        let files = sources::collect_inputs(&self.input, &["json"])?;
        let ex = sources::read_each(&files, json_text::read_file)?;
        Ok(PackContent {
            verses: ex.records,
            skipped: ex.skipped,
            ..Default::default()
        })
    }
}

pub struct OsisText {
    pub input: PathBuf,
}

impl Builder for OsisText {
    fn pack_type(&self) -> PackType {
        PackType::Text
    }

    fn policy(&self) -> ConflictPolicy {
        ConflictPolicy::Ignore
    }

    fn load(&self) -> Result<PackContent> {
        let files = sources::collect_inputs(&self.input, XML_EXTENSIONS)?;
        // word markup is ignored for plain text packs
        let ex = sources::read_each(&files, |p| Ok(osis::read_file(p, Language::Hebrew)?.verses))?;
        Ok(PackContent {
            verses: ex.records,
            skipped: ex.skipped,
            ..Default::default()
        })
    }
}

// ── Morphology ──

pub struct Morphology {
    pub input: PathBuf,
    pub language: Language,
}

impl Builder for Morphology {
    fn pack_type(&self) -> PackType {
        PackType::Morphology
    }

    fn policy(&self) -> ConflictPolicy {
        ConflictPolicy::Replace
    }

    fn language(&self) -> Option<Language> {
        Some(self.language)
    }

    fn load(&self) -> Result<PackContent> {
        let files = sources::collect_inputs(&self.input, XML_EXTENSIONS)?;
        let mut words = Vec::new();
        let ex = sources::read_each(&files, |p| {
            let doc = osis::read_file(p, self.language)?;
            words.extend(doc.words);
            Ok(doc.verses)
        })?;
        Ok(PackContent {
            verses: ex.records,
            words,
            skipped: ex.skipped,
            ..Default::default()
        })
    }
}

// ── Cross references ──

pub struct CrossReferences {
    pub input: PathBuf,
    /// Overrides the default `source` column ("curated" / "openbible").
    pub source: Option<String>,
}

impl Builder for CrossReferences {
    fn pack_type(&self) -> PackType {
        PackType::CrossReference
    }

    fn policy(&self) -> ConflictPolicy {
        ConflictPolicy::Ignore
    }

    fn load(&self) -> Result<PackContent> {
        let files = sources::collect_inputs(&self.input, &["json", "tsv", "tab", "txt"])?;
        let ex = sources::read_each(&files, |p| cross_refs::read_file(p, self.source.as_deref()))?;
        Ok(PackContent {
            cross_references: ex.records,
            skipped: ex.skipped,
            ..Default::default()
        })
    }
}

// ── Lexicon ──

pub struct Lexicon {
    pub input: PathBuf,
}

impl Builder for Lexicon {
    fn pack_type(&self) -> PackType {
        PackType::Lexicon
    }

    fn policy(&self) -> ConflictPolicy {
        ConflictPolicy::Replace
    }

    fn load(&self) -> Result<PackContent> {
        let files = sources::collect_inputs(&self.input, &["tsv", "tab", "txt"])?;
        let ex = sources::read_each(&files, lexicon::read_file)?;
        Ok(PackContent {
            lexicon: ex.records,
            skipped: ex.skipped,
            ..Default::default()
        })
    }
}

// ── Commentary ──

pub struct Commentary {
    pub input: PathBuf,
}

impl Builder for Commentary {
    fn pack_type(&self) -> PackType {
        PackType::Commentary
    }

    fn policy(&self) -> ConflictPolicy {
        ConflictPolicy::Replace
    }

    fn load(&self) -> Result<PackContent> {
        let files = sources::collect_inputs(&self.input, XML_EXTENSIONS)?;
        let ex = sources::read_each(&files, commentary::read_file)?;
        Ok(PackContent {
            commentary: ex.records,
            skipped: ex.skipped,
            ..Default::default()
        })
    }
}

// ── Selection by name ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuilderKind {
    TextJson,
    TextOsis,
    Morphology,
    CrossRefs,
    Lexicon,
    Commentary,
}

pub fn from_kind(
    kind: BuilderKind,
    input: PathBuf,
    language: Option<Language>,
    source: Option<String>,
) -> Box<dyn Builder> {
    match kind {
        BuilderKind::TextJson => Box::new(JsonText { input }),
        BuilderKind::TextOsis => Box::new(OsisText { input }),
        BuilderKind::Morphology => Box::new(Morphology {
            input,
            language: language.unwrap_or(Language::Hebrew),
        }),
        BuilderKind::CrossRefs => Box::new(CrossReferences { input, source }),
        BuilderKind::Lexicon => Box::new(Lexicon { input }),
        BuilderKind::Commentary => Box::new(Commentary { input }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn policies_per_builder() {
        let p = PathBuf::from("x");
        let expect = [
            (BuilderKind::TextJson, PackType::Text, ConflictPolicy::Ignore),
            (BuilderKind::TextOsis, PackType::Text, ConflictPolicy::Ignore),
            (BuilderKind::Morphology, PackType::Morphology, ConflictPolicy::Replace),
            (BuilderKind::CrossRefs, PackType::CrossReference, ConflictPolicy::Ignore),
            (BuilderKind::Lexicon, PackType::Lexicon, ConflictPolicy::Replace),
            (BuilderKind::Commentary, PackType::Commentary, ConflictPolicy::Replace),
        ];
        for (kind, pack_type, policy) in expect {
            let b = from_kind(kind, p.clone(), None, None);
            assert_eq!((b.pack_type(), b.policy()), (pack_type, policy), "{kind:?}");
        }
    }

    #[test]
    fn bad_file_does_not_sink_siblings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"name": "Ruth", "chapters": [["In the days"]]}]"#).unwrap();
        fs::write(dir.path().join("b.json"), "{ not json").unwrap();
        fs::write(dir.path().join("c.json"), r#"{"testament": "old"}"#).unwrap();

        let content = JsonText { input: dir.path().to_path_buf() }.load().unwrap();
        assert_eq!(content.verses.len(), 1);
        assert_eq!(content.skipped.len(), 2);
    }

    #[test]
    fn morphology_collects_words_across_files() {
        let dir = tempfile::tempdir().unwrap();
        for (name, id) in [("1.xml", "Gen.1.1"), ("2.xml", "Exod.1.1")] {
            let xml = format!(r#"<osis><osisText><verse osisID="{id}"><w lemma="430">x</w></verse></osisText></osis>"#);
            fs::write(dir.path().join(name), xml).unwrap();
        }
        let content = Morphology {
            input: dir.path().to_path_buf(),
            language: Language::Hebrew,
        }
        .load()
        .unwrap();
        assert_eq!(content.verses.len(), 2);
        let books: Vec<_> = content.words.iter().map(|w| w.book.as_str()).collect();
        assert_eq!(books, vec!["Genesis", "Exodus"]);
    }
}
