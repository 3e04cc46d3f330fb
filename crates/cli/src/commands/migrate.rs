//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! newsdesk migrate
//! ```
//!
//! # Environment Variables
//!
//! - `NEWSDESK_DATABASE_URL` - `SQLite` connection string, e.g. `sqlite://newsdesk.db`
//!
//! The database file is created if it does not exist. Migrations live in
//! `crates/api/migrations/` and are embedded in the binary.

use newsdesk_api::db::MIGRATOR;

use super::{CommandError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
