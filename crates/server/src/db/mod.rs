//! Persistence for the ledger.
//!
//! # Database: `PostgreSQL`, schema `ledger`
//!
//! ## Tables
//!
//! - `merchants` - Merchants, unique by storefront domain
//! - `users` - Known people, unique by normalized email
//! - `affiliates` - Per-merchant affiliates, unique by discount code and by user
//! - `orders` - Recorded orders, unique by `(merchant_id, external_order_id)`
//!
//! The ingestion logic talks to the [`Store`] trait rather than to `sqlx`
//! directly. [`PgStore`] is the production implementation; [`MemoryStore`]
//! enforces the same uniqueness rules in process for tests and tooling.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p affiliate-ledger-cli -- migrate
//! ```

pub mod affiliates;
pub mod memory;
pub mod merchants;
pub mod orders;
pub mod postgres;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use affiliate_ledger_core::{Email, MerchantId, UserId};

use crate::models::{Affiliate, Merchant, NewAffiliate, NewOrder, Order, User};

pub use affiliates::AffiliateRepository;
pub use memory::MemoryStore;
pub use merchants::MerchantRepository;
pub use orders::OrderRepository;
pub use postgres::PgStore;
pub use users::UserRepository;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate external order id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to [`StoreError::Conflict`].
pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(err)
}

/// Read/write access to merchants, users, affiliates and orders.
///
/// Every query on a merchant-owned entity takes the `MerchantId` explicitly so
/// one merchant's codes and orders can never satisfy another merchant's lookup.
///
/// Merchant domains are passed through [`crate::models::normalize_domain`]
/// on both write and lookup, so callers may hand over raw storefront domains.
///
/// Implementations must enforce the uniqueness rules listed in the module docs
/// and report violations as [`StoreError::Conflict`]; ingestion relies on that
/// to stay correct when two deliveries of the same order race.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_merchant_by_domain(&self, domain: &str) -> Result<Option<Merchant>, StoreError>;

    async fn find_order_by_external_id(
        &self,
        merchant_id: MerchantId,
        external_order_id: &str,
    ) -> Result<Option<Order>, StoreError>;

    async fn find_affiliate_by_discount_code(
        &self,
        merchant_id: MerchantId,
        discount_code: &str,
    ) -> Result<Option<Affiliate>, StoreError>;

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_affiliate_by_user(
        &self,
        merchant_id: MerchantId,
        user_id: UserId,
    ) -> Result<Option<Affiliate>, StoreError>;

    async fn create_merchant(&self, domain: &str, display_name: &str)
    -> Result<Merchant, StoreError>;

    async fn create_user(&self, email: &Email, name: &str) -> Result<User, StoreError>;

    async fn create_affiliate(&self, affiliate: &NewAffiliate) -> Result<Affiliate, StoreError>;

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
