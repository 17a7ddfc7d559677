use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Table {table} already exists")]
    SchemaConflict {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Unique index {index} on {table} conflicts with existing rows")]
    ConstraintViolation {
        table: String,
        index: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database connection unavailable: {0}")]
    ConnectionFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),
}

impl MigrationError {
    /// Classifies an engine error raised while creating `table`, or one of
    /// its unique indexes when `index` is set.
    pub fn from_ddl(err: rusqlite::Error, table: &str, index: Option<&str>) -> Self {
        if is_connection_error(&err) {
            return MigrationError::ConnectionFailure(Box::new(err));
        }

        match index {
            Some(index) if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                MigrationError::ConstraintViolation {
                    table: table.to_string(),
                    index: index.to_string(),
                    source: err,
                }
            }
            None if is_already_exists(&err) => MigrationError::SchemaConflict {
                table: table.to_string(),
                source: err,
            },
            _ => MigrationError::Database(err),
        }
    }
}

impl From<rusqlite::Error> for MigrationError {
    fn from(err: rusqlite::Error) -> Self {
        if is_connection_error(&err) {
            MigrationError::ConnectionFailure(Box::new(err))
        } else {
            MigrationError::Database(err)
        }
    }
}

impl From<r2d2::Error> for MigrationError {
    fn from(err: r2d2::Error) -> Self {
        MigrationError::ConnectionFailure(Box::new(err))
    }
}

fn is_connection_error(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase)
    )
}

// SQLite reports "table x already exists" as a generic SQLITE_ERROR, raised
// while the statement is prepared
fn is_already_exists(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqlInputError { msg, .. } => msg.ends_with("already exists"),
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.ends_with("already exists"),
        _ => false,
    }
}

pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn failing(sql: &str) -> rusqlite::Error {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE bans (id integer primary key, ip varchar(255));
             INSERT INTO bans (ip) VALUES ('10.0.0.1'), ('10.0.0.1');",
        )
        .unwrap();
        conn.execute_batch(sql).unwrap_err()
    }

    #[test]
    fn existing_table_is_schema_conflict() {
        let err = failing("CREATE TABLE bans (id integer)");
        let err = MigrationError::from_ddl(err, "bans", None);
        assert!(matches!(err, MigrationError::SchemaConflict { ref table, .. } if table == "bans"));
    }

    #[test]
    fn existing_table_is_reported_while_preparing() {
        let err = failing("CREATE TABLE \"bans\" (\"id\" integer)");
        assert!(matches!(err, rusqlite::Error::SqlInputError { .. }));
        assert!(matches!(
            MigrationError::from_ddl(err, "bans", None),
            MigrationError::SchemaConflict { .. }
        ));
    }

    #[test]
    fn duplicate_rows_are_constraint_violation() {
        let err = failing("CREATE UNIQUE INDEX bans_ip_unique ON bans (ip)");
        let err = MigrationError::from_ddl(err, "bans", Some("bans_ip_unique"));
        match err {
            MigrationError::ConstraintViolation { table, index, .. } => {
                assert_eq!(table, "bans");
                assert_eq!(index, "bans_ip_unique");
            }
            other => panic!("expected ConstraintViolation, got {other:?}"),
        }
    }

    #[test]
    fn other_failures_stay_database_errors() {
        let err = failing("SELECT nope FROM bans");
        let err = MigrationError::from_ddl(err, "bans", None);
        assert!(matches!(err, MigrationError::Database(_)));
    }

    #[test]
    fn unopenable_file_is_connection_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Connection::open(tmp.path().join("missing/dir/db.sqlite")).unwrap_err();
        assert!(matches!(
            MigrationError::from(err),
            MigrationError::ConnectionFailure(_)
        ));
    }
}
