pub mod commentary;
pub mod cross_refs;
pub mod json_text;
pub mod lexicon;
pub mod osis;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{PackError, Result};
use crate::records::{Extraction, SkipReason};

/// Resolve an input path to the files it names: the file itself, or the
/// directory's files with one of `extensions`, sorted by name.
pub fn collect_inputs(path: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(PackError::SourceNotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, extensions))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(PackError::SourceNotFound(path.to_path_buf()));
    }
    Ok(files)
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Read every file, isolating file-level failures so sibling files still count.
pub fn read_each<T, F>(files: &[PathBuf], mut read: F) -> Result<Extraction<T>>
where
    F: FnMut(&Path) -> Result<Extraction<T>>,
{
    let mut all = Extraction::default();
    for file in files {
        match read(file) {
            Ok(ex) => {
                info!(
                    "{}: {} records, {} skipped",
                    file.display(),
                    ex.records.len(),
                    ex.skipped.len()
                );
                all.extend(ex);
            }
            Err(e) if e.is_file_level() => {
                warn!("skipping file {}: {}", file.display(), e);
                all.skip(file.display().to_string(), SkipReason::UnreadableFile(e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(all)
}

/// Treat a lone value where a list was expected as a one-element list.
pub(crate) fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Positive integer from a JSON number or numeric string.
pub(crate) fn positive_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    n.filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_or_many_normalizes() {
        let arr = json!([1, 2]);
        assert_eq!(one_or_many(&arr).len(), 2);
        let single = json!({"verse": 1});
        assert_eq!(one_or_many(&single), vec![&single]);
        assert!(one_or_many(&Value::Null).is_empty());
    }

    #[test]
    fn numbers() {
        assert_eq!(positive_number(&json!(3)), Some(3));
        assert_eq!(positive_number(&json!("12")), Some(12));
        assert_eq!(positive_number(&json!(0)), None);
        assert_eq!(positive_number(&json!(-1)), None);
        assert_eq!(positive_number(&json!("x")), None);
    }

    #[test]
    fn missing_input_is_source_not_found() {
        let err = collect_inputs(Path::new("/nonexistent/bible.json"), &["json"]).unwrap_err();
        assert!(matches!(err, PackError::SourceNotFound(_)));
    }

    #[test]
    fn directory_inputs_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }
        let files = collect_inputs(dir.path(), &["json"]).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
