//! Load → create schema → metadata → batched insert → finalize.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::builders::Builder;
use crate::error::{PackError, Result};
use crate::finalize::{self, FinalizeOptions, PackReport};
use crate::progress::Progress;
use crate::schema::{self, PackMetadata};
use crate::settings::Settings;
use crate::writer::{BatchWriter, WriteStats};

/// Run one builder into `output`.
///
/// Sources are read before the output is opened, so a missing or empty source
/// leaves any existing file untouched. The metadata `type` always follows the
/// builder.
pub fn build(
    builder: &dyn Builder,
    meta: &PackMetadata,
    output: &Path,
    settings: &Settings,
    progress: &mut dyn Progress,
) -> Result<PackReport> {
    let pack_type = builder.pack_type();
    let content = builder.load()?;
    if content.is_empty() {
        return Err(PackError::EmptyResultSet(format!(
            "{} pack {} ({} records skipped)",
            pack_type,
            output.display(),
            content.skipped.len()
        )));
    }
    info!(
        "loaded {} verses, {} words, {} cross references, {} lexicon entries, {} commentary entries ({} skipped)",
        content.verses.len(),
        content.words.len(),
        content.cross_references.len(),
        content.lexicon.len(),
        content.commentary.len(),
        content.skipped.len()
    );

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let conn = open(output)?;
    schema::create(&conn, pack_type)?;

    let mut meta = meta.clone();
    meta.pack_type = pack_type;
    if meta.language.is_none() {
        meta.language = builder.language().map(|l| l.code().to_string());
    }
    schema::write_metadata(&conn, &meta)?;

    let mut writer = BatchWriter::new(&conn, builder.policy(), progress)
        .batch_size(settings.batch_size)
        .progress_every(settings.progress_every);
    let mut stats = WriteStats::default();
    for s in [
        write_nonempty(&mut writer, &content.verses)?,
        write_nonempty(&mut writer, &content.words)?,
        write_nonempty(&mut writer, &content.cross_references)?,
        write_nonempty(&mut writer, &content.lexicon)?,
        write_nonempty(&mut writer, &content.commentary)?,
    ] {
        stats.attempted += s.attempted;
        stats.written += s.written;
        stats.batches += s.batches;
    }
    info!(
        "{}: {} rows written in {} batches, {} duplicates ignored",
        output.display(),
        stats.written,
        stats.batches,
        stats.ignored()
    );

    let opts = FinalizeOptions {
        analyze: settings.analyze,
        vacuum: settings.vacuum,
    };
    finalize::finalize(conn, output, pack_type, opts, content.skipped.len())
}

/// Open a pack for writing, WAL while building.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

/// Upsert metadata keys into an existing pack, returning the full table afterwards.
pub fn patch_metadata(path: &Path, entries: &[(String, String)]) -> Result<BTreeMap<String, String>> {
    if !path.is_file() {
        return Err(PackError::SourceNotFound(path.to_path_buf()));
    }
    let conn = Connection::open(path)?;
    schema::create_common(&conn)?;
    let n = schema::upsert_metadata(&conn, entries)?;
    info!("{}: {} metadata keys updated", path.display(), n);
    let all = schema::read_metadata(&conn)?;
    conn.close().map_err(|(_, e)| e)?;
    Ok(all)
}

fn write_nonempty<R: crate::records::PackRow>(writer: &mut BatchWriter<'_>, rows: &[R]) -> Result<WriteStats> {
    if rows.is_empty() {
        return Ok(WriteStats::default());
    }
    writer.write(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{CrossReferences, JsonText};
    use crate::progress::NoProgress;
    use crate::schema::PackType;

    fn meta(id: &str) -> PackMetadata {
        PackMetadata {
            id: id.into(),
            name: "Test".into(),
            version: "1.0.0".into(),
            pack_type: PackType::Text,
            license: "Public Domain".into(),
            attribution: "".into(),
            language: None,
        }
    }

    #[test]
    fn patch_updates_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("kjv.json");
        fs::write(&input, r#"[{"name": "Genesis", "chapters": [["In the beginning"]]}]"#).unwrap();
        let output = dir.path().join("kjv.sqlite");
        build(&JsonText { input }, &meta("kjv"), &output, &Settings::default(), &mut NoProgress).unwrap();

        let md = patch_metadata(&output, &[("version".to_string(), "1.0.1".to_string())]).unwrap();
        assert_eq!(md["version"], "1.0.1");
        assert_eq!(md["pack_id"], "kjv");

        let missing = patch_metadata(&dir.path().join("nope.sqlite"), &[]).unwrap_err();
        assert!(matches!(missing, PackError::SourceNotFound(_)));
    }

    #[test]
    fn empty_source_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.json");
        fs::write(&input, r#"[{"name": "Genesis", "chapters": [["  "]]}]"#).unwrap();
        let output = dir.path().join("out.sqlite");

        let builder = JsonText { input };
        let err = build(&builder, &meta("t"), &output, &Settings::default(), &mut NoProgress).unwrap_err();
        assert!(matches!(err, PackError::EmptyResultSet(_)));
        assert!(!output.exists());
    }

    #[test]
    fn metadata_type_follows_builder() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("x.json");
        fs::write(&input, r#"[{"from": "Genesis 1:1", "to": "John 1:1", "description": "d"}]"#).unwrap();
        let output = dir.path().join("nested").join("xref.sqlite");

        let builder = CrossReferences { input, source: None };
        let report = build(&builder, &meta("xref"), &output, &Settings::default(), &mut NoProgress).unwrap();
        assert_eq!(report.pack_type, PackType::CrossReference);
        assert_eq!(report.rows("cross_references"), Some(2));

        let conn = Connection::open(&output).unwrap();
        let md = schema::read_metadata(&conn).unwrap();
        assert_eq!(md["type"], "cross-reference");
        assert_eq!(md["pack_id"], "xref");
    }
}
