// SQLite result store for reconciliation runs

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use tally_recon::model::{Discrepancy, DiscrepancyKind, KindCount};
use tally_recon::sink::DiscrepancySink;

use crate::error::{Error, Result};
use crate::STORE_SCHEMA_VERSION;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS discrepancies (
    seq            INTEGER PRIMARY KEY,   -- insertion order
    kind           TEXT NOT NULL,         -- LEFT_ONLY | RIGHT_ONLY | MISMATCH
    record_id      INTEGER NOT NULL,
    description    TEXT NOT NULL,
    left_snapshot  TEXT,                  -- NULL for RIGHT_ONLY
    right_snapshot TEXT,                  -- NULL for LEFT_ONLY
    fields         TEXT NOT NULL,         -- JSON array of differing fields
    detected_on    TEXT NOT NULL,         -- YYYY-MM-DD
    detected_at    TEXT NOT NULL          -- RFC 3339
);

CREATE INDEX IF NOT EXISTS idx_discrepancies_kind
    ON discrepancies(kind);
"#;

/// Replace-on-write store holding the latest run.
///
/// The table is created once and never dropped; `replace_all` clears and
/// refills it inside one transaction.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened result store");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > STORE_SCHEMA_VERSION {
            return Err(Error::SchemaVersion {
                found: version,
                supported: STORE_SCHEMA_VERSION,
            });
        }
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", STORE_SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM discrepancies", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl DiscrepancySink for SqliteStore {
    type Error = Error;

    fn replace_all(&mut self, discrepancies: &[Discrepancy]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM discrepancies", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO discrepancies (kind, record_id, description, left_snapshot, right_snapshot, fields, detected_on, detected_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for d in discrepancies {
                let fields = serde_json::to_string(&d.fields)?;
                stmt.execute(params![
                    d.kind.as_str(),
                    d.id,
                    d.description,
                    d.left_snapshot,
                    d.right_snapshot,
                    fields,
                    d.detected_at.format("%Y-%m-%d").to_string(),
                    d.detected_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(rows = discrepancies.len(), "replaced stored discrepancies");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM discrepancies", [])?;
        tracing::debug!(removed, "cleared stored discrepancies");
        Ok(())
    }

    fn counts_by_kind(&self) -> Result<Vec<KindCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*) AS total FROM discrepancies GROUP BY kind ORDER BY total DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(0)?;
            let total: i64 = row.get(1)?;
            Ok((kind, total))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (kind, total) = row?;
            let kind = DiscrepancyKind::parse(&kind).ok_or(Error::UnknownKind(kind))?;
            counts.push(KindCount {
                kind,
                count: total as usize,
            });
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.kind.cmp(&b.kind)));
        Ok(counts)
    }

    fn first(&self, limit: usize) -> Result<Vec<Discrepancy>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, record_id, description, left_snapshot, right_snapshot, fields, detected_at FROM discrepancies ORDER BY seq LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok(StoredRow {
                kind: row.get(0)?,
                record_id: row.get(1)?,
                description: row.get(2)?,
                left_snapshot: row.get(3)?,
                right_snapshot: row.get(4)?,
                fields: row.get(5)?,
                detected_at: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_discrepancy()?);
        }
        Ok(out)
    }
}

struct StoredRow {
    kind: String,
    record_id: i64,
    description: String,
    left_snapshot: Option<String>,
    right_snapshot: Option<String>,
    fields: String,
    detected_at: String,
}

impl StoredRow {
    fn into_discrepancy(self) -> Result<Discrepancy> {
        let kind = DiscrepancyKind::parse(&self.kind)
            .ok_or_else(|| Error::UnknownKind(self.kind.clone()))?;
        let detected_at = DateTime::parse_from_rfc3339(&self.detected_at)
            .map_err(|_| Error::Timestamp(self.detected_at.clone()))?
            .with_timezone(&Utc);
        let fields: Vec<String> = serde_json::from_str(&self.fields)?;

        Ok(Discrepancy {
            kind,
            id: self.record_id,
            description: self.description,
            left_snapshot: self.left_snapshot,
            right_snapshot: self.right_snapshot,
            fields,
            detected_at,
        })
    }
}
