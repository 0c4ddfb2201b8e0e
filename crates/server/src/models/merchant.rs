//! Merchant domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use affiliate_ledger_core::MerchantId;

/// A merchant whose storefront reports orders to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Merchant {
    /// Unique merchant ID.
    pub id: MerchantId,
    /// Storefront domain (unique lookup key for incoming orders).
    pub domain: String,
    /// Human-readable merchant name.
    pub display_name: String,
    /// When the merchant was provisioned.
    pub created_at: DateTime<Utc>,
}

/// Normalize a storefront domain for storage and lookup.
///
/// Domains are case-insensitive, so `Shop.Example.com ` and `shop.example.com`
/// resolve to the same merchant.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_lowercase()
}
