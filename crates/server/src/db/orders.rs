//! Order repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use affiliate_ledger_core::{AffiliateId, Email, MerchantId, OrderId};

use super::{StoreError, conflict_or_database};
use crate::models::{NewOrder, Order};

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    merchant_id: i32,
    affiliate_id: i32,
    subtotal: Decimal,
    commission_owed: Decimal,
    discount_code: String,
    customer_email: String,
    external_order_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let customer_email = Email::parse(&row.customer_email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid customer email in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            merchant_id: MerchantId::new(row.merchant_id),
            affiliate_id: AffiliateId::new(row.affiliate_id),
            subtotal: row.subtotal,
            commission_owed: row.commission_owed,
            discount_code: row.discount_code,
            customer_email,
            external_order_id: row.external_order_id,
            created_at: row.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by the merchant's external order ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    /// Returns `StoreError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_external_id(
        &self,
        merchant_id: MerchantId,
        external_order_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, merchant_id, affiliate_id, subtotal, commission_owed,
                   discount_code, customer_email, external_order_id, created_at
            FROM ledger.orders
            WHERE merchant_id = $1 AND external_order_id = $2
            ",
        )
        .bind(merchant_id)
        .bind(external_order_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List a merchant's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    /// Returns `StoreError::DataCorruption` if a stored email is invalid.
    pub async fn list_by_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, merchant_id, affiliate_id, subtotal, commission_owed,
                   discount_code, customer_email, external_order_id, created_at
            FROM ledger.orders
            WHERE merchant_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(merchant_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Create a new order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the merchant already has an order with
    /// this external ID.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO ledger.orders (
                merchant_id, affiliate_id, subtotal, commission_owed,
                discount_code, customer_email, external_order_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, merchant_id, affiliate_id, subtotal, commission_owed,
                      discount_code, customer_email, external_order_id, created_at
            ",
        )
        .bind(order.merchant_id)
        .bind(order.affiliate_id)
        .bind(order.subtotal)
        .bind(order.commission_owed)
        .bind(&order.discount_code)
        .bind(order.customer_email.as_str())
        .bind(&order.external_order_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "external order id"))?;

        row.try_into()
    }
}
