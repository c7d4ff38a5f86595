use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;
use crate::schema::{self, PackType};

#[derive(Debug, Clone, Copy)]
pub struct FinalizeOptions {
    pub analyze: bool,
    pub vacuum: bool,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        FinalizeOptions {
            analyze: true,
            vacuum: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub path: PathBuf,
    pub pack_type: PackType,
    pub size_bytes: u64,
    pub row_counts: Vec<(String, i64)>,
    pub skipped: usize,
}

impl PackReport {
    pub fn rows(&self, table: &str) -> Option<i64> {
        self.row_counts.iter().find(|(t, _)| t == table).map(|(_, n)| *n)
    }
}

impl fmt::Display for PackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pack:    {}", self.path.display())?;
        writeln!(f, "Type:    {}", self.pack_type)?;
        writeln!(f, "Size:    {}", format_size(self.size_bytes))?;
        for (table, n) in &self.row_counts {
            writeln!(f, "  {:<20} {:>10} rows", table, n)?;
        }
        write!(f, "Skipped: {} records", self.skipped)
    }
}

/// Refresh statistics, compact the file, and switch back to a rollback journal
/// so the closed pack is a single file. Then close it and report.
pub fn finalize(conn: Connection, path: &Path, pack_type: PackType, opts: FinalizeOptions, skipped: usize) -> Result<PackReport> {
    if opts.analyze {
        info!("ANALYZE {}", path.display());
        conn.execute_batch("ANALYZE")?;
    }
    if opts.vacuum {
        info!("VACUUM {}", path.display());
        conn.execute_batch("VACUUM")?;
    }
    conn.pragma_update(None, "journal_mode", "DELETE")?;

    let row_counts = row_counts(&conn, pack_type)?;
    conn.close().map_err(|(_, e)| e)?;

    Ok(PackReport {
        path: path.to_path_buf(),
        pack_type,
        size_bytes: std::fs::metadata(path)?.len(),
        row_counts,
        skipped,
    })
}

pub fn row_counts(conn: &Connection, pack_type: PackType) -> Result<Vec<(String, i64)>> {
    schema::tables(pack_type)?
        .into_iter()
        .map(|table| -> Result<(String, i64)> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok((table, n))
        })
        .collect()
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.2} MB", b / (KB * KB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn finalize_reports_counts_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "journal_mode", "WAL").unwrap();
        schema::create(&conn, PackType::Lexicon).unwrap();
        conn.execute("INSERT INTO lexicon_entries (strongs, lemma) VALUES ('H0001', 'אָב')", [])
            .unwrap();

        let report = finalize(conn, &path, PackType::Lexicon, FinalizeOptions::default(), 2).unwrap();

        assert_eq!(report.rows("metadata"), Some(0));
        assert_eq!(report.rows("lexicon_entries"), Some(1));
        assert_eq!(report.skipped, 2);
        assert!(report.size_bytes > 0);
        assert!(!dir.path().join("x.sqlite-wal").exists());
        assert!(report.to_string().contains("lexicon_entries"));
    }
}
