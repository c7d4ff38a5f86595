//! Batched, transactional row insertion.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::progress::Progress;
use crate::records::PackRow;

/// What to do when a row collides with an existing unique key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the existing row (first population).
    Ignore,
    /// Overwrite the existing row (re-seeding).
    Replace,
}

impl ConflictPolicy {
    fn keyword(self) -> &'static str {
        match self {
            ConflictPolicy::Ignore => "IGNORE",
            ConflictPolicy::Replace => "REPLACE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub attempted: u64,
    pub written: u64,
    pub batches: u64,
}

impl WriteStats {
    /// Rows that hit an existing key under `Ignore`.
    pub fn ignored(&self) -> u64 {
        self.attempted - self.written
    }
}

pub struct BatchWriter<'a> {
    conn: &'a Connection,
    policy: ConflictPolicy,
    batch_size: usize,
    progress_every: u64,
    progress: &'a mut dyn Progress,
}

impl<'a> BatchWriter<'a> {
    pub fn new(conn: &'a Connection, policy: ConflictPolicy, progress: &'a mut dyn Progress) -> Self {
        BatchWriter {
            conn,
            policy,
            batch_size: 1000,
            progress_every: 5000,
            progress,
        }
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    pub fn progress_every(mut self, n: u64) -> Self {
        self.progress_every = n.max(1);
        self
    }

    fn insert_sql<R: PackRow>(&self) -> String {
        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT OR {} INTO {} ({}) VALUES ({})",
            self.policy.keyword(),
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        )
    }

    /// Write all rows, one transaction per batch.
    ///
    /// A failing batch is rolled back and its error returned; batches committed
    /// before it stay in the pack.
    pub fn write<R: PackRow>(&mut self, rows: &[R]) -> Result<WriteStats> {
        let sql = self.insert_sql::<R>();
        let mut stats = WriteStats::default();

        for chunk in rows.chunks(self.batch_size) {
            let tx = self.conn.unchecked_transaction()?;
            let mut written = 0u64;
            {
                let mut stmt = tx.prepare(&sql)?;
                for (i, row) in chunk.iter().enumerate() {
                    written += row.execute(&mut stmt)? as u64;
                    let seen = stats.attempted + i as u64 + 1;
                    if seen % self.progress_every == 0 {
                        self.progress.advance(R::TABLE, stats.written + written);
                    }
                }
            }
            tx.commit()?;

            stats.attempted += chunk.len() as u64;
            stats.written += written;
            stats.batches += 1;
            debug!("{}: committed batch {} ({} rows)", R::TABLE, stats.batches, written);
        }

        self.progress.finish(R::TABLE, stats.written);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::records::VerseRecord;
    use crate::schema::{self, PackType};

    fn verse(n: u32) -> VerseRecord {
        VerseRecord {
            book: "Genesis".into(),
            chapter: 1,
            verse: n,
            text: format!("verse {n}"),
        }
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM verses", [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn batches_and_progress() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create(&conn, PackType::Text).unwrap();
        let rows: Vec<_> = (1..=25).map(verse).collect();

        let mut ticks = Vec::new();
        let mut observer = |_: &str, n: u64| ticks.push(n);
        let stats = BatchWriter::new(&conn, ConflictPolicy::Ignore, &mut observer)
            .batch_size(10)
            .progress_every(10)
            .write(&rows)
            .unwrap();

        assert_eq!(stats.batches, 3);
        assert_eq!(stats.written, 25);
        assert_eq!(ticks, vec![10, 20]);
        assert_eq!(count(&conn), 25);
    }

    #[test]
    fn ignore_keeps_first_and_counts_collisions() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create(&conn, PackType::Text).unwrap();
        let mut rows: Vec<_> = (1..=1000).map(verse).collect();
        // record 500 collides with record 1
        rows[499] = VerseRecord {
            text: "duplicate".into(),
            ..verse(1)
        };

        let stats = BatchWriter::new(&conn, ConflictPolicy::Ignore, &mut NoProgress)
            .write(&rows)
            .unwrap();

        assert_eq!(stats.batches, 1);
        assert_eq!(stats.written, 999);
        assert_eq!(stats.ignored(), 1);
        assert_eq!(count(&conn), 999);
        let text: String = conn
            .query_row("SELECT text FROM verses WHERE verse = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(text, "verse 1");
    }

    #[test]
    fn replace_overwrites() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create(&conn, PackType::Text).unwrap();
        BatchWriter::new(&conn, ConflictPolicy::Ignore, &mut NoProgress)
            .write(&[verse(1)])
            .unwrap();
        BatchWriter::new(&conn, ConflictPolicy::Replace, &mut NoProgress)
            .write(&[VerseRecord {
                text: "reseeded".into(),
                ..verse(1)
            }])
            .unwrap();

        let text: String = conn
            .query_row("SELECT text FROM verses WHERE verse = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(text, "reseeded");
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn failed_batch_rolls_back_alone() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create(&conn, PackType::Text).unwrap();
        let mut rows: Vec<_> = (1..=20).map(verse).collect();
        // CHECK (verse >= 1) fails inside the second batch; REPLACE aborts on CHECK
        rows[15].verse = 0;

        let result = BatchWriter::new(&conn, ConflictPolicy::Replace, &mut NoProgress)
            .batch_size(10)
            .write(&rows);

        assert!(result.is_err());
        assert_eq!(count(&conn), 10);
    }
}
