use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::MigrationResult;

/// A migration id the ledger has recorded as applied.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    pub name: String,
    pub applied_at: String,
}

/// Bookkeeping of which migrations have run.
pub trait MigrationLedger {
    fn has_run(&self, id: &str) -> MigrationResult<bool>;

    fn record_run(&self, id: &str) -> MigrationResult<()>;

    /// Removes the record after a migration has been reverted.
    fn forget_run(&self, id: &str) -> MigrationResult<()>;

    /// All recorded migrations in the order they were applied.
    fn applied(&self) -> MigrationResult<Vec<AppliedMigration>>;
}

/// Ledger stored in the `schema_version` table of the migrated database.
pub struct SchemaVersionLedger<'c> {
    conn: &'c Connection,
}

impl<'c> SchemaVersionLedger<'c> {
    /// Opens the ledger, creating its table when missing.
    pub fn open(conn: &'c Connection) -> MigrationResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(Self { conn })
    }

    /// Opens the ledger only if its table is already there, leaving the
    /// database untouched otherwise.
    pub fn existing(conn: &'c Connection) -> MigrationResult<Option<Self>> {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(exists.then_some(Self { conn }))
    }
}

impl MigrationLedger for SchemaVersionLedger<'_> {
    fn has_run(&self, id: &str) -> MigrationResult<bool> {
        let already_applied: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(already_applied)
    }

    fn record_run(&self, id: &str) -> MigrationResult<()> {
        self.conn.execute(
            "INSERT INTO schema_version (name) VALUES (?1)",
            params![id],
        )?;
        Ok(())
    }

    fn forget_run(&self, id: &str) -> MigrationResult<()> {
        self.conn
            .execute("DELETE FROM schema_version WHERE name = ?1", params![id])?;
        Ok(())
    }

    fn applied(&self) -> MigrationResult<Vec<AppliedMigration>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, applied_at FROM schema_version ORDER BY applied_at, rowid")?;
        let applied = stmt
            .query_map([], |row| {
                Ok(AppliedMigration {
                    name: row.get(0)?,
                    applied_at: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(applied)
    }
}
