pub mod account;
pub mod migrate;

use secrecy::SecretString;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: Viewer, Staff, Lecturer, Admin (or 0-3)")]
    InvalidRole(String),

    /// Reading the password from the terminal failed.
    #[error("Could not read password: {0}")]
    Input(#[from] std::io::Error),

    /// The service layer rejected the request.
    #[error("{0}")]
    Rejected(String),
}

const DATABASE_URL_VAR: &str = "NEWSDESK_DATABASE_URL";

/// Connect to the database named by `NEWSDESK_DATABASE_URL` (or `DATABASE_URL`).
async fn connect() -> Result<SqlitePool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(DATABASE_URL_VAR)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar(DATABASE_URL_VAR))?;

    tracing::info!("Connecting to database...");
    Ok(newsdesk_api::db::create_pool(&database_url, 1).await?)
}
