//! Persistence layer for hosts and probe observations, backed by libsql.

pub mod migrations;
pub mod repository;

pub use repository::LibsqlStore;

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
