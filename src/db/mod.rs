pub mod ledger;
pub mod models;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::error::MigrationResult;
use crate::migrations::{Migration, MIGRATIONS};
use ledger::{AppliedMigration, MigrationLedger, SchemaVersionLedger};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Where a registered migration stands in the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub id: &'static str,
    pub applied_at: Option<String>,
}

pub fn create_pool(db_path: &Path, max_connections: u32) -> anyhow::Result<DbPool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path);
    let pool = Pool::builder().max_size(max_connections).build(manager)?;

    let conn = pool.get()?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )?;

    Ok(pool)
}

/// Applies every migration the ledger has not seen, in order.
///
/// Each migration runs in its own transaction together with its ledger entry.
/// On failure that transaction is rolled back, earlier migrations stay
/// committed, and the error is returned as raised.
pub fn apply_pending(
    conn: &mut Connection,
    migrations: &[&dyn Migration],
) -> MigrationResult<Vec<&'static str>> {
    SchemaVersionLedger::open(conn)?;

    let mut applied = Vec::new();
    for migration in migrations {
        let tx = conn.transaction()?;
        let ledger = SchemaVersionLedger::open(&tx)?;
        if ledger.has_run(migration.id())? {
            continue;
        }

        tracing::info!("Applying migration: {}", migration.id());
        migration.apply(&tx)?;
        ledger.record_run(migration.id())?;
        tx.commit()?;
        applied.push(migration.id());
    }

    Ok(applied)
}

/// Reverts applied migrations newest first, at most `steps` of them
/// (all when `None`).
pub fn revert_applied(
    conn: &mut Connection,
    migrations: &[&dyn Migration],
    steps: Option<usize>,
) -> MigrationResult<Vec<&'static str>> {
    SchemaVersionLedger::open(conn)?;

    let mut reverted = Vec::new();
    for migration in migrations.iter().rev() {
        if steps.is_some_and(|steps| reverted.len() >= steps) {
            break;
        }

        let tx = conn.transaction()?;
        let ledger = SchemaVersionLedger::open(&tx)?;
        if !ledger.has_run(migration.id())? {
            continue;
        }

        tracing::info!("Reverting migration: {}", migration.id());
        migration.revert(&tx)?;
        ledger.forget_run(migration.id())?;
        tx.commit()?;
        reverted.push(migration.id());
    }

    Ok(reverted)
}

/// Reports each registered migration as applied or pending.
///
/// Read-only: a database without a ledger reports everything as pending.
/// Ledger entries no registered migration claims are logged and skipped.
pub fn status(
    conn: &Connection,
    migrations: &[&dyn Migration],
) -> MigrationResult<Vec<MigrationStatus>> {
    let applied: Vec<AppliedMigration> = match SchemaVersionLedger::existing(conn)? {
        Some(ledger) => ledger.applied()?,
        None => Vec::new(),
    };

    for entry in &applied {
        if !migrations.iter().any(|m| m.id() == entry.name) {
            tracing::warn!("Ledger records unknown migration: {}", entry.name);
        }
    }

    Ok(migrations
        .iter()
        .map(|m| MigrationStatus {
            id: m.id(),
            applied_at: applied
                .iter()
                .find(|entry| entry.name == m.id())
                .map(|entry| entry.applied_at.clone()),
        })
        .collect())
}

pub fn run_migrations(pool: &DbPool) -> MigrationResult<Vec<&'static str>> {
    let mut conn = pool.get()?;
    let applied = apply_pending(&mut conn, MIGRATIONS)?;
    tracing::info!("Database migrations complete");
    Ok(applied)
}

pub fn revert_migrations(pool: &DbPool, steps: Option<usize>) -> MigrationResult<Vec<&'static str>> {
    let mut conn = pool.get()?;
    revert_applied(&mut conn, MIGRATIONS, steps)
}

pub fn migration_status(pool: &DbPool) -> MigrationResult<Vec<MigrationStatus>> {
    let conn = pool.get()?;
    status(&conn, MIGRATIONS)
}
