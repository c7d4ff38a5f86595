//! Pack schema registry and metadata table.
//!
//! Table definitions live once in `schema.json`, keyed by pack type. Every
//! statement is `IF NOT EXISTS`, so creating a schema against an existing
//! pack is a no-op.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

const SCHEMA_JSON: &str = include_str!("schema.json");

#[derive(Deserialize)]
struct Registry {
    schema_version: u32,
    common: TableSet,
    packs: HashMap<String, TableSet>,
}

#[derive(Deserialize)]
struct TableSet {
    tables: Vec<(String, Vec<String>)>,
    indexes: Vec<(String, String, String)>,
}

fn registry() -> Result<Registry> {
    Ok(serde_json::from_str(SCHEMA_JSON)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackType {
    Text,
    Morphology,
    CrossReference,
    Lexicon,
    Commentary,
}

impl PackType {
    pub fn as_str(self) -> &'static str {
        match self {
            PackType::Text => "text",
            PackType::Morphology => "morphology",
            PackType::CrossReference => "cross-reference",
            PackType::Lexicon => "lexicon",
            PackType::Commentary => "commentary",
        }
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackType {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self> {
        [
            PackType::Text,
            PackType::Morphology,
            PackType::CrossReference,
            PackType::Lexicon,
            PackType::Commentary,
        ]
        .into_iter()
        .find(|t| t.as_str() == s)
        .ok_or_else(|| PackError::InvalidSetting {
            key: "type",
            reason: format!("unknown pack type {s:?}"),
        })
    }
}

pub fn schema_version() -> Result<u32> {
    Ok(registry()?.schema_version)
}

/// Create the metadata table plus the pack type's own tables and indexes.
pub fn create(conn: &Connection, pack_type: PackType) -> Result<()> {
    let reg = registry()?;
    create_set(conn, &reg.common)?;
    create_set(conn, pack_tables(&reg, pack_type)?)
}

/// Only the tables every pack shares; enough for patching metadata.
pub fn create_common(conn: &Connection) -> Result<()> {
    create_set(conn, &registry()?.common)
}

fn create_set(conn: &Connection, set: &TableSet) -> Result<()> {
    for (name, cols) in &set.tables {
        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", name, cols.join(", "));
        conn.execute(&sql, [])?;
    }
    for (idx, table, cols) in &set.indexes {
        let sql = format!("CREATE INDEX IF NOT EXISTS {} ON {} ({})", idx, table, cols);
        conn.execute(&sql, [])?;
    }
    Ok(())
}

/// Table names for a pack type, metadata first.
pub fn tables(pack_type: PackType) -> Result<Vec<String>> {
    let reg = registry()?;
    let pack = pack_tables(&reg, pack_type)?;
    Ok(reg
        .common
        .tables
        .iter()
        .chain(&pack.tables)
        .map(|(name, _)| name.clone())
        .collect())
}

fn pack_tables(reg: &Registry, pack_type: PackType) -> Result<&TableSet> {
    reg.packs
        .get(pack_type.as_str())
        .ok_or_else(|| PackError::structural("schema.json", format!("a `{pack_type}` entry")))
}

// ── Metadata ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
    pub pack_type: PackType,
    pub license: String,
    pub attribution: String,
    pub language: Option<String>,
}

impl PackMetadata {
    pub fn entries(&self) -> Result<Vec<(&'static str, String)>> {
        let mut entries = vec![
            ("pack_id", self.id.clone()),
            ("type", self.pack_type.to_string()),
            ("name", self.name.clone()),
            ("version", self.version.clone()),
            ("license", self.license.clone()),
            ("attribution", self.attribution.clone()),
            ("schema_version", schema_version()?.to_string()),
            ("created_at", chrono::Utc::now().to_rfc3339()),
        ];
        if let Some(lang) = &self.language {
            entries.push(("language", lang.clone()));
        }
        Ok(entries)
    }
}

pub fn write_metadata(conn: &Connection, meta: &PackMetadata) -> Result<usize> {
    upsert_metadata(conn, &meta.entries()?)
}

/// Insert or replace each key. Used by builders and by metadata patching.
pub fn upsert_metadata<K: AsRef<str>, V: AsRef<str>>(conn: &Connection, entries: &[(K, V)]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)")?;
        for (k, v) in entries {
            count += stmt.execute(params![k.as_ref(), v.as_ref()])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn read_metadata(conn: &Connection) -> Result<BTreeMap<String, String>> {
    let mut stmt = conn.prepare("SELECT key, value FROM metadata")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_count(conn: &Connection, kind: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name NOT LIKE 'sqlite_%'",
            [kind],
            |r| r.get(0),
        )
        .unwrap()
    }

    #[test]
    fn every_pack_type_is_registered() {
        for t in [
            PackType::Text,
            PackType::Morphology,
            PackType::CrossReference,
            PackType::Lexicon,
            PackType::Commentary,
        ] {
            let names = tables(t).unwrap();
            assert_eq!(names[0], "metadata");
            assert!(names.len() >= 2, "{t} has no content tables");
            assert_eq!(t.as_str().parse::<PackType>().unwrap(), t);
        }
        assert!("map".parse::<PackType>().is_err());
    }

    #[test]
    fn create_twice_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn, PackType::Morphology).unwrap();
        let tables_before = object_count(&conn, "table");
        let indexes_before = object_count(&conn, "index");

        create(&conn, PackType::Morphology).unwrap();
        assert_eq!(object_count(&conn, "table"), tables_before);
        assert_eq!(object_count(&conn, "index"), indexes_before);
        assert_eq!(tables_before, 3);
    }

    #[test]
    fn metadata_upsert_replaces() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn, PackType::Text).unwrap();
        let meta = PackMetadata {
            id: "web".into(),
            name: "World English Bible".into(),
            version: "1.0.0".into(),
            pack_type: PackType::Text,
            license: "Public Domain".into(),
            attribution: "eBible.org".into(),
            language: Some("en".into()),
        };
        write_metadata(&conn, &meta).unwrap();
        upsert_metadata(&conn, &[("version", "1.0.1")]).unwrap();

        let m = read_metadata(&conn).unwrap();
        assert_eq!(m["pack_id"], "web");
        assert_eq!(m["version"], "1.0.1");
        assert_eq!(m["type"], "text");
        assert_eq!(m["language"], "en");
        let pack_id_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM metadata WHERE key = 'pack_id'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(pack_id_rows, 1);
    }
}
