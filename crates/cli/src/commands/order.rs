//! Order replay and inspection commands.
//!
//! # Usage
//!
//! ```bash
//! # Run a saved webhook payload through the ingestion pipeline
//! al-cli order ingest order.json
//!
//! # Print recorded orders as JSON
//! al-cli order list -d shop.example.com
//! ```
//!
//! Ingestion here is identical to the webhook: a payload that was already
//! recorded is reported as a duplicate and nothing is written.

use std::path::Path;
use std::sync::Arc;

use affiliate_ledger_server::db::{MerchantRepository, OrderRepository, PgStore, StoreError};
use affiliate_ledger_server::models::normalize_domain;
use affiliate_ledger_server::services::{IngestError, IngestOutcome, OrderIngestor, OrderPayload};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during order commands.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid order payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown merchant domain: {0}")]
    UnknownMerchant(String),
}

/// Ingest the order payload stored in `file`.
pub async fn ingest(file: &Path) -> Result<(), OrderError> {
    let raw = std::fs::read_to_string(file).map_err(|source| OrderError::Read {
        path: file.display().to_string(),
        source,
    })?;
    let payload: OrderPayload = serde_json::from_str(&raw)?;

    let pool = connect().await?;
    let ingestor = OrderIngestor::with_store(Arc::new(PgStore::new(pool)));

    match ingestor.process_order(&payload).await? {
        IngestOutcome::Created(order) => tracing::info!(
            "Order recorded! ID: {}, Affiliate: {}, Commission: {}",
            order.id,
            order.affiliate_id,
            order.commission_owed
        ),
        IngestOutcome::SkippedDuplicate {
            merchant_id,
            external_order_id,
        } => tracing::warn!(
            "Order {} was already recorded for merchant {}",
            external_order_id,
            merchant_id
        ),
        IngestOutcome::SkippedUnknownMerchant { merchant_domain } => {
            return Err(OrderError::UnknownMerchant(merchant_domain));
        }
    }

    Ok(())
}

/// Print every recorded order for the merchant at `domain` as JSON lines.
#[allow(clippy::print_stdout)]
pub async fn list(domain: &str) -> Result<(), OrderError> {
    let normalized = normalize_domain(domain);
    let pool = connect().await?;

    let merchant = MerchantRepository::new(&pool)
        .get_by_domain(&normalized)
        .await?
        .ok_or(OrderError::UnknownMerchant(normalized))?;

    let orders = OrderRepository::new(&pool)
        .list_by_merchant(merchant.id)
        .await?;

    tracing::info!("{} order(s) for {}", orders.len(), merchant.domain);

    for order in &orders {
        println!("{}", serde_json::to_string(order)?);
    }

    Ok(())
}
