//! Row types for the tables created by the initial migration.
//!
//! Field names follow Rust conventions; `from_row` reads the camelCase column
//! names the schema declares, so these only work on full-row `SELECT *` style
//! queries.

use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<bool>,
    pub is_admin: Option<bool>,
    pub api_key: Option<String>,
    pub password_edited_at: Option<NaiveDateTime>,
    pub api_key_edited_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub edited_at: Option<NaiveDateTime>,
}

impl User {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            password: row.get("password")?,
            enabled: row.get("enabled")?,
            is_admin: row.get("isAdmin")?,
            api_key: row.get("apiKey")?,
            password_edited_at: row.get("passwordEditedAt")?,
            api_key_edited_at: row.get("apiKeyEditedAt")?,
            created_at: row.get("createdAt")?,
            edited_at: row.get("editedAt")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub nsfw: bool,
    /// Last time an archive of the album was generated
    pub zipped_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub edited_at: Option<NaiveDateTime>,
}

impl Album {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("userId")?,
            name: row.get("name")?,
            nsfw: row.get::<_, Option<bool>>("nsfw")?.unwrap_or(false),
            zipped_at: row.get("zippedAt")?,
            created_at: row.get("createdAt")?,
            edited_at: row.get("editedAt")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    /// `None` for anonymous uploads
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub original: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub size: Option<i64>,
    pub nsfw: bool,
    pub hash: Option<String>,
    pub ip: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub edited_at: Option<NaiveDateTime>,
}

impl File {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("userId")?,
            name: row.get("name")?,
            original: row.get("original")?,
            mime_type: row.get("type")?,
            size: row.get("size")?,
            nsfw: row.get::<_, Option<bool>>("nsfw")?.unwrap_or(false),
            hash: row.get("hash")?,
            ip: row.get("ip")?,
            created_at: row.get("createdAt")?,
            edited_at: row.get("editedAt")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub user_id: Option<i64>,
    pub album_id: Option<i64>,
    pub identifier: Option<String>,
    pub views: Option<i64>,
    pub enabled: Option<bool>,
    pub enable_download: Option<bool>,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub edited_at: Option<NaiveDateTime>,
}

impl Link {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("userId")?,
            album_id: row.get("albumId")?,
            identifier: row.get("identifier")?,
            views: row.get("views")?,
            enabled: row.get("enabled")?,
            enable_download: row.get("enableDownload")?,
            expires_at: row.get("expiresAt")?,
            created_at: row.get("createdAt")?,
            edited_at: row.get("editedAt")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumFile {
    pub id: i64,
    pub album_id: Option<i64>,
    pub file_id: Option<i64>,
}

impl AlbumFile {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            album_id: row.get("albumId")?,
            file_id: row.get("fileId")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumLink {
    pub id: i64,
    pub album_id: Option<i64>,
    pub link_id: Option<i64>,
}

impl AlbumLink {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            album_id: row.get("albumId")?,
            link_id: row.get("linkId")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub uuid: Option<String>,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub edited_at: Option<NaiveDateTime>,
}

impl Tag {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            uuid: row.get("uuid")?,
            user_id: row.get("userId")?,
            name: row.get("name")?,
            created_at: row.get("createdAt")?,
            edited_at: row.get("editedAt")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTag {
    pub id: i64,
    pub file_id: Option<i64>,
    pub tag_id: Option<i64>,
}

impl FileTag {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            file_id: row.get("fileId")?,
            tag_id: row.get("tagId")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ban {
    pub id: i64,
    pub ip: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl Ban {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            ip: row.get("ip")?,
            created_at: row.get("createdAt")?,
        })
    }
}
