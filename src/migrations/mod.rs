mod initial;

pub use initial::InitialMigration;

use rusqlite::Connection;

use crate::error::MigrationResult;

/// One schema step the runner can apply and revert.
///
/// Implementations issue DDL on the connection they are given and surface
/// engine errors unmodified; transactions and bookkeeping belong to the runner.
pub trait Migration: Sync {
    /// Stable identifier recorded in the ledger once applied.
    fn id(&self) -> &'static str;

    fn apply(&self, conn: &Connection) -> MigrationResult<()>;

    fn revert(&self, conn: &Connection) -> MigrationResult<()>;
}

/// Registered migrations, oldest first.
pub static MIGRATIONS: &[&dyn Migration] = &[&InitialMigration];
