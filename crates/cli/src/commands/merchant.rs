//! Merchant management commands.
//!
//! # Usage
//!
//! ```bash
//! al-cli merchant create -d shop.example.com -n "Example Shop"
//! ```

use affiliate_ledger_core::MerchantId;
use affiliate_ledger_server::db::{MerchantRepository, StoreError};
use affiliate_ledger_server::models::normalize_domain;
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during merchant operations.
#[derive(Debug, Error)]
pub enum MerchantError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Domain is blank after normalization.
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    /// Merchant already exists.
    #[error("Merchant already exists with domain: {0}")]
    MerchantExists(String),

    #[error("Database error: {0}")]
    Store(StoreError),
}

/// Register a new merchant.
///
/// # Returns
///
/// The ID of the created merchant.
pub async fn create(domain: &str, name: &str) -> Result<MerchantId, MerchantError> {
    let normalized = normalize_domain(domain);
    if normalized.is_empty() {
        return Err(MerchantError::InvalidDomain(domain.to_owned()));
    }

    let pool = connect().await?;

    tracing::info!("Creating merchant: {} ({})", name, normalized);

    let merchant = MerchantRepository::new(&pool)
        .create(&normalized, name)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => MerchantError::MerchantExists(normalized.clone()),
            other => MerchantError::Store(other),
        })?;

    tracing::info!(
        "Merchant created successfully! ID: {}, Domain: {}",
        merchant.id,
        merchant.domain
    );

    Ok(merchant.id)
}
