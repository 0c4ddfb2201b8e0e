//! Affiliate repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use affiliate_ledger_core::{AffiliateId, CommissionRate, MerchantId, UserId};

use super::{StoreError, conflict_or_database};
use crate::models::{Affiliate, NewAffiliate};

/// Internal row type for `PostgreSQL` affiliate queries.
#[derive(Debug, sqlx::FromRow)]
struct AffiliateRow {
    id: i32,
    merchant_id: i32,
    user_id: Option<i32>,
    discount_code: String,
    commission_rate: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<AffiliateRow> for Affiliate {
    type Error = StoreError;

    fn try_from(row: AffiliateRow) -> Result<Self, Self::Error> {
        let commission_rate = CommissionRate::new(row.commission_rate).map_err(|e| {
            StoreError::DataCorruption(format!("invalid commission rate in database: {e}"))
        })?;

        Ok(Self {
            id: AffiliateId::new(row.id),
            merchant_id: MerchantId::new(row.merchant_id),
            user_id: row.user_id.map(UserId::new),
            discount_code: row.discount_code,
            commission_rate,
            created_at: row.created_at,
        })
    }
}

/// Repository for affiliate database operations.
pub struct AffiliateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AffiliateRepository<'a> {
    /// Create a new affiliate repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the affiliate owning a discount code within a merchant.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    /// Returns `StoreError::DataCorruption` if the stored rate is out of range.
    pub async fn get_by_discount_code(
        &self,
        merchant_id: MerchantId,
        discount_code: &str,
    ) -> Result<Option<Affiliate>, StoreError> {
        let row = sqlx::query_as::<_, AffiliateRow>(
            r"
            SELECT id, merchant_id, user_id, discount_code, commission_rate, created_at
            FROM ledger.affiliates
            WHERE merchant_id = $1 AND discount_code = $2
            ",
        )
        .bind(merchant_id)
        .bind(discount_code)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user's affiliate record within a merchant.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    /// Returns `StoreError::DataCorruption` if the stored rate is out of range.
    pub async fn get_by_user(
        &self,
        merchant_id: MerchantId,
        user_id: UserId,
    ) -> Result<Option<Affiliate>, StoreError> {
        let row = sqlx::query_as::<_, AffiliateRow>(
            r"
            SELECT id, merchant_id, user_id, discount_code, commission_rate, created_at
            FROM ledger.affiliates
            WHERE merchant_id = $1 AND user_id = $2
            ",
        )
        .bind(merchant_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new affiliate.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the discount code is taken within the
    /// merchant or the user is already an affiliate of the merchant.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(&self, affiliate: &NewAffiliate) -> Result<Affiliate, StoreError> {
        let row = sqlx::query_as::<_, AffiliateRow>(
            r"
            INSERT INTO ledger.affiliates (merchant_id, user_id, discount_code, commission_rate)
            VALUES ($1, $2, $3, $4)
            RETURNING id, merchant_id, user_id, discount_code, commission_rate, created_at
            ",
        )
        .bind(affiliate.merchant_id)
        .bind(affiliate.user_id)
        .bind(&affiliate.discount_code)
        .bind(affiliate.commission_rate)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "affiliate"))?;

        row.try_into()
    }
}
