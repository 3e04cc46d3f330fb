//! Database operations for the newsroom `SQLite` store.
//!
//! ## Tables
//!
//! - `system_account` - Persisted accounts (argon2 password hashes, integer role codes)
//! - `category` - Article categories
//! - `tag` - Free-form article tags
//! - `news_article` - Articles with category, author and last modifier references
//! - `news_tag` - Article/tag association (cascades with the article)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p newsdesk-cli -- migrate
//! ```

pub mod accounts;
pub mod articles;
pub mod categories;
pub mod tags;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use accounts::AccountRepository;
pub use articles::{ArticleRepository, ArticleScope};
pub use categories::CategoryRepository;
pub use tags::TagRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique value or a row still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map unique and foreign-key violations to `Conflict`, everything else to `Database`.
pub(crate) fn map_constraint_error(e: sqlx::Error, conflict_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(conflict_message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Connect options shared by the server pool and the test pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5)))
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
/// * `max_connections` - upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = connect_options(database_url.expose_secret())?;
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create a single-connection in-memory pool with migrations applied.
///
/// The connection is never recycled, so the database lives as long as the pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection fails, or a migration error wrapped
/// in `sqlx::Error::Migrate`.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}
