// Library exports for safehold
// This allows integration tests and the migration binary to share the schema

pub mod config;
pub mod db;
pub mod error;
pub mod migrations;
pub mod schema;
