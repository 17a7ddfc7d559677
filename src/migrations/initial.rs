use rusqlite::Connection;

use super::Migration;
use crate::error::MigrationResult;
use crate::schema::TABLES;

/// Creates the users, albums, files, links, tag and ban tables.
pub struct InitialMigration;

impl Migration for InitialMigration {
    fn id(&self) -> &'static str {
        "001_initial"
    }

    fn apply(&self, conn: &Connection) -> MigrationResult<()> {
        for table in TABLES {
            tracing::debug!("Creating table {}", table.name);
            table.create(conn)?;
            table.create_unique_indexes(conn)?;
        }
        Ok(())
    }

    fn revert(&self, conn: &Connection) -> MigrationResult<()> {
        // No foreign keys bind the tables, so drop order does not matter
        for table in TABLES {
            tracing::debug!("Dropping table {}", table.name);
            table.drop_if_exists(conn)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::schema::{table, BANS};

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name != 'sqlite_sequence' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn apply_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        InitialMigration.apply(&conn).unwrap();

        let mut expected: Vec<String> = TABLES.iter().map(|t| t.name.to_string()).collect();
        expected.sort();
        assert_eq!(tables(&conn), expected);
    }

    #[test]
    fn apply_twice_is_schema_conflict_on_first_table() {
        let conn = Connection::open_in_memory().unwrap();
        InitialMigration.apply(&conn).unwrap();

        match InitialMigration.apply(&conn).unwrap_err() {
            MigrationError::SchemaConflict { table, .. } => assert_eq!(table, "users"),
            other => panic!("expected SchemaConflict, got {other:?}"),
        }
    }

    #[test]
    fn apply_stops_at_the_conflicting_table() {
        let conn = Connection::open_in_memory().unwrap();
        table("links").unwrap().create(&conn).unwrap();

        let err = InitialMigration.apply(&conn).unwrap_err();
        assert!(matches!(err, MigrationError::SchemaConflict { ref table, .. } if table == "links"));

        // Tables before links were created, nothing after it was
        assert_eq!(tables(&conn), vec!["albums", "files", "links", "users"]);
        assert!(!BANS.exists(&conn).unwrap());
    }

    #[test]
    fn revert_removes_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        InitialMigration.apply(&conn).unwrap();
        InitialMigration.revert(&conn).unwrap();
        assert!(tables(&conn).is_empty());
    }

    #[test]
    fn revert_on_empty_database_succeeds() {
        let conn = Connection::open_in_memory().unwrap();
        InitialMigration.revert(&conn).unwrap();
        InitialMigration.revert(&conn).unwrap();
    }

    #[test]
    fn revert_then_apply_again() {
        let conn = Connection::open_in_memory().unwrap();
        InitialMigration.apply(&conn).unwrap();
        InitialMigration.revert(&conn).unwrap();
        InitialMigration.apply(&conn).unwrap();
        assert_eq!(tables(&conn).len(), TABLES.len());
    }
}
