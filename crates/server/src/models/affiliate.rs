//! Affiliate domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use affiliate_ledger_core::{AffiliateId, CommissionRate, MerchantId, UserId};

/// An affiliate of a single merchant.
///
/// The commission rate is fixed at creation; the discount code is unique within
/// the merchant and is how orders are attributed back to the affiliate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Affiliate {
    /// Unique affiliate ID.
    pub id: AffiliateId,
    /// Merchant this affiliate promotes.
    pub merchant_id: MerchantId,
    /// Linked user, if the affiliate is tied to a known email.
    pub user_id: Option<UserId>,
    /// Discount code owned by this affiliate.
    pub discount_code: String,
    /// Fraction of each attributed subtotal owed to the affiliate.
    pub commission_rate: CommissionRate,
    /// When the affiliate was created.
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating an affiliate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAffiliate {
    pub merchant_id: MerchantId,
    pub user_id: Option<UserId>,
    pub discount_code: String,
    pub commission_rate: CommissionRate,
}
