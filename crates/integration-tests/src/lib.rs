//! Integration tests for Affiliate Ledger.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process HTTP tests (no database needed)
//! cargo test -p affiliate-ledger-integration-tests
//!
//! # PostgreSQL tests
//! LEDGER_TEST_DATABASE_URL=postgres://localhost/ledger_test \
//!     cargo test -p affiliate-ledger-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `webhook_api` - Webhook routes against an in-memory store
//! - `postgres_ingest` - Ingestion pipeline against a real database
//!
//! Tests share one database, so every fixture is namespaced with a random
//! suffix instead of truncating tables between runs.

use std::sync::Arc;

use affiliate_ledger_server::db::{MemoryStore, PgStore, create_pool};
use affiliate_ledger_server::routes::router;
use affiliate_ledger_server::services::OrderPayload;
use affiliate_ledger_server::state::AppState;
use axum::Router;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use uuid::Uuid;

/// Environment variable naming the test database.
pub const TEST_DATABASE_URL: &str = "LEDGER_TEST_DATABASE_URL";

/// Connect to the test database and bring its schema up to date.
///
/// # Panics
///
/// Panics if `LEDGER_TEST_DATABASE_URL` is unset, the database is unreachable,
/// or migrations fail.
pub async fn pg_store() -> PgStore {
    let url = std::env::var(TEST_DATABASE_URL)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL} must be set for database tests"));
    let pool = create_pool(&SecretString::from(url), 5)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    PgStore::new(pool)
}

/// Router over a fresh in-memory store, plus a handle for inspecting it.
#[must_use]
pub fn memory_app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let app = router(AppState::new(Arc::new(store.clone())));
    (app, store)
}

/// Short random suffix for namespacing fixtures.
#[must_use]
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string().chars().take(12).collect()
}

/// A unique merchant domain.
#[must_use]
pub fn unique_domain() -> String {
    format!("shop-{}.example", unique_suffix())
}

/// A unique customer email.
#[must_use]
pub fn unique_email() -> String {
    format!("customer-{}@example.com", unique_suffix())
}

/// JSON webhook body for an order.
#[must_use]
pub fn order_json(
    order_id: &str,
    domain: &str,
    subtotal: &str,
    discount_code: &str,
    customer_email: &str,
) -> Value {
    json!({
        "order_id": order_id,
        "subtotal_price": subtotal,
        "merchant_domain": domain,
        "discount_code": discount_code,
        "customer_email": customer_email,
        "customer_name": "Integration Customer"
    })
}

/// Typed payload for driving the ingestor directly.
///
/// # Panics
///
/// Panics if `subtotal` is not a decimal number.
#[must_use]
pub fn order_payload(
    order_id: &str,
    domain: &str,
    subtotal: &str,
    discount_code: &str,
    customer_email: &str,
) -> OrderPayload {
    OrderPayload {
        order_id: order_id.to_owned(),
        subtotal_price: subtotal.parse::<Decimal>().expect("Invalid subtotal"),
        merchant_domain: domain.to_owned(),
        discount_code: discount_code.to_owned(),
        customer_email: customer_email.to_owned(),
        customer_name: "Integration Customer".to_owned(),
    }
}
