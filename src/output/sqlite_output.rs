//! SQLite export of collected records
//!
//! Writes every record row to a `records` table for downstream tabular and
//! CSV tooling. The table is dropped and recreated on each export, so the
//! file always reflects exactly one sweep.

use crate::output::traits::{OutputHandler, OutputResult, ReportContext};
use crate::store::RecordStore;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

const RECORDS_SCHEMA: &str = r#"
DROP TABLE IF EXISTS records;

CREATE TABLE records (
    position INTEGER NOT NULL,
    key TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    community TEXT NOT NULL,
    title TEXT NOT NULL,
    username TEXT NOT NULL,
    public_id TEXT NOT NULL,
    last_activity TEXT,
    is_bot INTEGER NOT NULL,
    create_date TEXT
);

CREATE INDEX idx_records_public_id ON records(public_id);
CREATE INDEX idx_records_community ON records(community);
"#;

/// Exports the record store to a SQLite file
pub struct SqliteExport {
    path: PathBuf,
}

impl SqliteExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for SqliteExport {
    fn name(&self) -> &str {
        "sqlite export"
    }

    fn write(&self, store: &RecordStore, _ctx: &ReportContext) -> OutputResult<()> {
        let written = export_records(store, &self.path)?;
        tracing::info!("Exported {} records to {}", written, self.path.display());
        Ok(())
    }
}

/// Writes all records to `path`, replacing any previous export
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(OutputError)` - Failed to open or write the database
pub fn export_records(store: &RecordStore, path: &Path) -> OutputResult<usize> {
    let mut conn = Connection::open(path)?;
    write_records(&mut conn, store)
}

fn write_records(conn: &mut Connection, store: &RecordStore) -> OutputResult<usize> {
    let tx = conn.transaction()?;
    tx.execute_batch(RECORDS_SCHEMA)?;

    let rows = store.rows();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO records
             (position, key, kind, community, title, username, public_id, last_activity, is_bot, create_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for (position, row) in rows.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                row.key,
                row.kind,
                row.community,
                row.title,
                row.username,
                row.public_id,
                row.last_activity,
                row.is_bot,
                row.create_date,
            ])?;
        }
    }

    tx.commit()?;
    Ok(rows.len())
}
