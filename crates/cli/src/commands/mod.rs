//! CLI command implementations.

pub mod merchant;
pub mod migrate;
pub mod order;

use affiliate_ledger_server::config::{ConfigError, get_database_url};
use affiliate_ledger_server::db::create_pool;
use sqlx::PgPool;

/// Connections used by one-shot CLI commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

/// Connect to the ledger database named by `LEDGER_DATABASE_URL`.
///
/// Loads `.env` first so the CLI picks up the same settings as the server.
async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("LEDGER_DATABASE_URL")?;

    tracing::info!("Connecting to ledger database...");
    Ok(create_pool(&database_url, CLI_MAX_CONNECTIONS).await?)
}

/// Errors that can occur while connecting to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
