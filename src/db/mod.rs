mod error;
pub mod models;
pub mod repositories;

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config;

pub use error::DatabaseError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open a pool against `url` and bring the schema up to date.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    // WAL keeps readers from blocking the short write transactions the
    // capacity ledger relies on.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous = NORMAL").execute(&pool).await?;
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// Initialize the database connection pool from the process config.
pub async fn init_pool() -> Result<SqlitePool> {
    let config = config::get();
    connect(
        &config.database.url,
        config.database.max_connections.unwrap_or(5),
    )
    .await
}
