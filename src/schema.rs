//! Declarative description of the file-hosting tables.
//!
//! Every table gets an autoincrement `id`; all other columns are nullable.
//! Unique constraints are created as separate unique indexes so a conflict with
//! existing rows surfaces on the index, not on the table.

use rusqlite::Connection;

use crate::error::{MigrationError, MigrationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Increments,
    String,
    Text,
    Integer,
    Boolean,
    Timestamp,
}

impl ColumnType {
    /// Declared type as written into the DDL. `PRAGMA table_info` echoes it
    /// back, with built-in names like `integer` and `text` upper-cased.
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Increments => "integer",
            ColumnType::String => "varchar(255)",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "datetime",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnType,
    pub default: Option<&'static str>,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub unique: &'static [&'static [&'static str]],
}

const fn col(name: &'static str, kind: ColumnType) -> Column {
    Column {
        name,
        kind,
        default: None,
    }
}

const fn col_default(name: &'static str, kind: ColumnType, default: &'static str) -> Column {
    Column {
        name,
        kind,
        default: Some(default),
    }
}

const ID: Column = col("id", ColumnType::Increments);

pub const USERS: Table = Table {
    name: "users",
    columns: &[
        ID,
        col("username", ColumnType::String),
        col("password", ColumnType::Text),
        col("enabled", ColumnType::Boolean),
        col("isAdmin", ColumnType::Boolean),
        col("apiKey", ColumnType::String),
        col("passwordEditedAt", ColumnType::Timestamp),
        col("apiKeyEditedAt", ColumnType::Timestamp),
        col("createdAt", ColumnType::Timestamp),
        col("editedAt", ColumnType::Timestamp),
    ],
    unique: &[&["username"], &["apiKey"]],
};

pub const ALBUMS: Table = Table {
    name: "albums",
    columns: &[
        ID,
        col("userId", ColumnType::Integer),
        col("name", ColumnType::String),
        col_default("nsfw", ColumnType::Boolean, "'0'"),
        col("zippedAt", ColumnType::Timestamp),
        col("createdAt", ColumnType::Timestamp),
        col("editedAt", ColumnType::Timestamp),
    ],
    unique: &[&["userId", "name"]],
};

pub const FILES: Table = Table {
    name: "files",
    columns: &[
        ID,
        col("userId", ColumnType::Integer),
        col("name", ColumnType::String),
        col("original", ColumnType::String),
        col("type", ColumnType::String),
        col("size", ColumnType::Integer),
        col_default("nsfw", ColumnType::Boolean, "'0'"),
        col("hash", ColumnType::String),
        col("ip", ColumnType::String),
        col("createdAt", ColumnType::Timestamp),
        col("editedAt", ColumnType::Timestamp),
    ],
    unique: &[],
};

pub const LINKS: Table = Table {
    name: "links",
    columns: &[
        ID,
        col("userId", ColumnType::Integer),
        col("albumId", ColumnType::Integer),
        col("identifier", ColumnType::String),
        col("views", ColumnType::Integer),
        col("enabled", ColumnType::Boolean),
        col("enableDownload", ColumnType::Boolean),
        col("expiresAt", ColumnType::Timestamp),
        col("createdAt", ColumnType::Timestamp),
        col("editedAt", ColumnType::Timestamp),
    ],
    unique: &[&["userId", "albumId", "identifier"]],
};

pub const ALBUMS_FILES: Table = Table {
    name: "albumsFiles",
    columns: &[
        ID,
        col("albumId", ColumnType::Integer),
        col("fileId", ColumnType::Integer),
    ],
    unique: &[&["albumId", "fileId"]],
};

pub const ALBUMS_LINKS: Table = Table {
    name: "albumsLinks",
    columns: &[
        ID,
        col("albumId", ColumnType::Integer),
        col("linkId", ColumnType::Integer),
    ],
    unique: &[&["linkId"]],
};

pub const TAGS: Table = Table {
    name: "tags",
    columns: &[
        ID,
        col("uuid", ColumnType::String),
        col("userId", ColumnType::Integer),
        col("name", ColumnType::String),
        col("createdAt", ColumnType::Timestamp),
        col("editedAt", ColumnType::Timestamp),
    ],
    unique: &[&["userId", "name"]],
};

pub const FILE_TAGS: Table = Table {
    name: "fileTags",
    columns: &[
        ID,
        col("fileId", ColumnType::Integer),
        col("tagId", ColumnType::Integer),
    ],
    unique: &[&["fileId", "tagId"]],
};

pub const BANS: Table = Table {
    name: "bans",
    columns: &[
        ID,
        col("ip", ColumnType::String),
        col("createdAt", ColumnType::Timestamp),
    ],
    unique: &[],
};

/// All tables, associative tables after the entities they join.
pub const TABLES: &[Table] = &[
    USERS,
    ALBUMS,
    FILES,
    LINKS,
    ALBUMS_FILES,
    ALBUMS_LINKS,
    TAGS,
    FILE_TAGS,
    BANS,
];

pub fn table(name: &str) -> Option<&'static Table> {
    TABLES.iter().find(|t| t.name == name)
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl Column {
    fn definition(&self) -> String {
        let mut def = format!("{} {}", quote(self.name), self.kind.sql());
        if self.kind == ColumnType::Increments {
            def.push_str(" not null primary key autoincrement");
        }
        if let Some(default) = self.default {
            def.push_str(" default ");
            def.push_str(default);
        }
        def
    }
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(Column::definition)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({})", quote(self.name), columns)
    }

    /// `(index name, CREATE UNIQUE INDEX statement)` per unique constraint.
    pub fn unique_indexes(&self) -> Vec<(String, String)> {
        self.unique
            .iter()
            .map(|cols| {
                let name = format!("{}_{}_unique", self.name, cols.join("_")).to_lowercase();
                let cols_sql = cols.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
                let sql = format!(
                    "CREATE UNIQUE INDEX {} ON {} ({})",
                    quote(&name),
                    quote(self.name),
                    cols_sql
                );
                (name, sql)
            })
            .collect()
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote(self.name))
    }

    pub fn create(&self, conn: &Connection) -> MigrationResult<()> {
        conn.execute_batch(&self.create_sql())
            .map_err(|e| MigrationError::from_ddl(e, self.name, None))
    }

    pub fn create_unique_indexes(&self, conn: &Connection) -> MigrationResult<()> {
        for (index, sql) in self.unique_indexes() {
            tracing::debug!("Creating unique index {}", index);
            conn.execute_batch(&sql)
                .map_err(|e| MigrationError::from_ddl(e, self.name, Some(&index)))?;
        }
        Ok(())
    }

    /// Drops the table and its indexes; absent tables are a no-op.
    pub fn drop_if_exists(&self, conn: &Connection) -> MigrationResult<()> {
        conn.execute_batch(&self.drop_sql())?;
        Ok(())
    }

    pub fn exists(&self, conn: &Connection) -> MigrationResult<bool> {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [self.name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_in_dependency_order() {
        let names: Vec<&str> = TABLES.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "users",
                "albums",
                "files",
                "links",
                "albumsFiles",
                "albumsLinks",
                "tags",
                "fileTags",
                "bans"
            ]
        );
    }

    #[test]
    fn every_table_starts_with_identity_column() {
        for table in TABLES {
            assert_eq!(table.columns[0].name, "id", "{}", table.name);
            assert_eq!(table.columns[0].kind, ColumnType::Increments);
        }
    }

    #[test]
    fn unique_columns_exist_on_their_table() {
        for table in TABLES {
            for cols in table.unique {
                for col in cols.iter() {
                    assert!(
                        table.column(col).is_some(),
                        "{}.{} missing",
                        table.name,
                        col
                    );
                }
            }
        }
    }

    #[test]
    fn create_sql_quotes_camel_case_columns() {
        let sql = ALBUMS_LINKS.create_sql();
        assert_eq!(
            sql,
            "CREATE TABLE \"albumsLinks\" (\"id\" integer not null primary key autoincrement, \
             \"albumId\" integer, \"linkId\" integer)"
        );
    }

    #[test]
    fn nsfw_columns_default_to_false() {
        for table in [&ALBUMS, &FILES] {
            let nsfw = table.column("nsfw").unwrap();
            assert_eq!(nsfw.kind, ColumnType::Boolean);
            assert_eq!(nsfw.default, Some("'0'"));
        }
    }

    #[test]
    fn unique_index_names_are_lowercased() {
        let indexes = LINKS.unique_indexes();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].0, "links_userid_albumid_identifier_unique");
        assert!(indexes[0]
            .1
            .ends_with("ON \"links\" (\"userId\", \"albumId\", \"identifier\")"));
    }

    #[test]
    fn bans_and_files_have_no_unique_constraints() {
        assert!(BANS.unique_indexes().is_empty());
        assert!(FILES.unique_indexes().is_empty());
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(table("fileTags").map(|t| t.name), Some("fileTags"));
        assert!(table("posts").is_none());
    }

    #[test]
    fn drop_missing_table_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        TAGS.drop_if_exists(&conn).unwrap();
        assert!(!TAGS.exists(&conn).unwrap());
    }
}
