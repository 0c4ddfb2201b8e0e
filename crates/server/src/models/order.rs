//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use affiliate_ledger_core::{AffiliateId, Email, MerchantId, OrderId};

/// A recorded order with the commission owed to its attributed affiliate.
///
/// Orders are written once and never mutated by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Merchant the order was placed with.
    pub merchant_id: MerchantId,
    /// Affiliate credited with the order.
    pub affiliate_id: AffiliateId,
    /// Order subtotal.
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    /// `subtotal * commission_rate` of the attributed affiliate.
    #[serde(with = "rust_decimal::serde::str")]
    pub commission_owed: Decimal,
    /// Discount code as submitted with the order (may be empty).
    pub discount_code: String,
    /// Purchasing customer's email.
    pub customer_email: Email,
    /// Merchant-side order identifier (unique per merchant).
    pub external_order_id: String,
    /// When the order was recorded.
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub merchant_id: MerchantId,
    pub affiliate_id: AffiliateId,
    pub subtotal: Decimal,
    pub commission_owed: Decimal,
    pub discount_code: String,
    pub customer_email: Email,
    pub external_order_id: String,
}
