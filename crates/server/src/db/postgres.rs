//! `PostgreSQL`-backed [`Store`].

use async_trait::async_trait;
use sqlx::PgPool;

use affiliate_ledger_core::{Email, MerchantId, UserId};

use super::{
    AffiliateRepository, MerchantRepository, OrderRepository, Store, StoreError, UserRepository,
};
use crate::models::{Affiliate, Merchant, NewAffiliate, NewOrder, Order, User};

/// [`Store`] implementation over a `sqlx` connection pool.
///
/// Cloning is cheap; the pool is reference counted.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_merchant_by_domain(&self, domain: &str) -> Result<Option<Merchant>, StoreError> {
        MerchantRepository::new(&self.pool).get_by_domain(domain).await
    }

    async fn find_order_by_external_id(
        &self,
        merchant_id: MerchantId,
        external_order_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        OrderRepository::new(&self.pool)
            .get_by_external_id(merchant_id, external_order_id)
            .await
    }

    async fn find_affiliate_by_discount_code(
        &self,
        merchant_id: MerchantId,
        discount_code: &str,
    ) -> Result<Option<Affiliate>, StoreError> {
        AffiliateRepository::new(&self.pool)
            .get_by_discount_code(merchant_id, discount_code)
            .await
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        UserRepository::new(&self.pool).get_by_email(email).await
    }

    async fn find_affiliate_by_user(
        &self,
        merchant_id: MerchantId,
        user_id: UserId,
    ) -> Result<Option<Affiliate>, StoreError> {
        AffiliateRepository::new(&self.pool)
            .get_by_user(merchant_id, user_id)
            .await
    }

    async fn create_merchant(
        &self,
        domain: &str,
        display_name: &str,
    ) -> Result<Merchant, StoreError> {
        MerchantRepository::new(&self.pool)
            .create(domain, display_name)
            .await
    }

    async fn create_user(&self, email: &Email, name: &str) -> Result<User, StoreError> {
        UserRepository::new(&self.pool).create(email, name).await
    }

    async fn create_affiliate(&self, affiliate: &NewAffiliate) -> Result<Affiliate, StoreError> {
        AffiliateRepository::new(&self.pool).create(affiliate).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        OrderRepository::new(&self.pool).create(order).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
