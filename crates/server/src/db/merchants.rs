//! Merchant repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use affiliate_ledger_core::MerchantId;

use super::{StoreError, conflict_or_database};
use crate::models::{Merchant, normalize_domain};

/// Internal row type for `PostgreSQL` merchant queries.
#[derive(Debug, sqlx::FromRow)]
struct MerchantRow {
    id: i32,
    domain: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl From<MerchantRow> for Merchant {
    fn from(row: MerchantRow) -> Self {
        Self {
            id: MerchantId::new(row.id),
            domain: row.domain,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

/// Repository for merchant database operations.
pub struct MerchantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a merchant by its storefront domain. The domain is normalized first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get_by_domain(&self, domain: &str) -> Result<Option<Merchant>, StoreError> {
        let row = sqlx::query_as::<_, MerchantRow>(
            r"
            SELECT id, domain, display_name, created_at
            FROM ledger.merchants
            WHERE domain = $1
            ",
        )
        .bind(normalize_domain(domain))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new merchant, storing the normalized domain.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the domain is already registered.
    /// Returns `StoreError::Database` for other database errors.
    pub async fn create(&self, domain: &str, display_name: &str) -> Result<Merchant, StoreError> {
        let row = sqlx::query_as::<_, MerchantRow>(
            r"
            INSERT INTO ledger.merchants (domain, display_name)
            VALUES ($1, $2)
            RETURNING id, domain, display_name, created_at
            ",
        )
        .bind(normalize_domain(domain))
        .bind(display_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "merchant domain"))?;

        Ok(row.into())
    }
}
