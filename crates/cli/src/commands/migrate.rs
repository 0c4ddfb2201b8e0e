//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! al-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `LEDGER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded at compile
//! time.

use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the ledger database migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running ledger migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Ledger migrations complete!");
    Ok(())
}
