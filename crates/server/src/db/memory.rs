//! In-process [`Store`] for tests and local tooling.
//!
//! Enforces the same uniqueness rules as the `PostgreSQL` schema so ingestion
//! behaves identically against either backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use affiliate_ledger_core::{AffiliateId, Email, MerchantId, OrderId, UserId};

use super::{Store, StoreError};
use crate::models::{Affiliate, Merchant, NewAffiliate, NewOrder, Order, User, normalize_domain};

#[derive(Debug, Default)]
struct Tables {
    merchants: Vec<Merchant>,
    users: Vec<User>,
    affiliates: Vec<Affiliate>,
    orders: Vec<Order>,
    last_id: i32,
}

impl Tables {
    const fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Thread-safe in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all merchants.
    #[must_use]
    pub fn merchants(&self) -> Vec<Merchant> {
        self.lock().merchants.clone()
    }

    /// Snapshot of all users.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// Snapshot of all affiliates.
    #[must_use]
    pub fn affiliates(&self) -> Vec<Affiliate> {
        self.lock().affiliates.clone()
    }

    /// Snapshot of all orders.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_merchant_by_domain(&self, domain: &str) -> Result<Option<Merchant>, StoreError> {
        let domain = normalize_domain(domain);
        Ok(self
            .lock()
            .merchants
            .iter()
            .find(|m| m.domain == domain)
            .cloned())
    }

    async fn find_order_by_external_id(
        &self,
        merchant_id: MerchantId,
        external_order_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self
            .lock()
            .orders
            .iter()
            .find(|o| o.merchant_id == merchant_id && o.external_order_id == external_order_id)
            .cloned())
    }

    async fn find_affiliate_by_discount_code(
        &self,
        merchant_id: MerchantId,
        discount_code: &str,
    ) -> Result<Option<Affiliate>, StoreError> {
        Ok(self
            .lock()
            .affiliates
            .iter()
            .find(|a| a.merchant_id == merchant_id && a.discount_code == discount_code)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| &u.email == email).cloned())
    }

    async fn find_affiliate_by_user(
        &self,
        merchant_id: MerchantId,
        user_id: UserId,
    ) -> Result<Option<Affiliate>, StoreError> {
        Ok(self
            .lock()
            .affiliates
            .iter()
            .find(|a| a.merchant_id == merchant_id && a.user_id == Some(user_id))
            .cloned())
    }

    async fn create_merchant(
        &self,
        domain: &str,
        display_name: &str,
    ) -> Result<Merchant, StoreError> {
        let domain = normalize_domain(domain);
        let mut tables = self.lock();
        if tables.merchants.iter().any(|m| m.domain == domain) {
            return Err(StoreError::Conflict(
                "merchant domain already exists".to_owned(),
            ));
        }

        let merchant = Merchant {
            id: MerchantId::new(tables.next_id()),
            domain,
            display_name: display_name.to_owned(),
            created_at: Utc::now(),
        };
        tables.merchants.push(merchant.clone());
        Ok(merchant)
    }

    async fn create_user(&self, email: &Email, name: &str) -> Result<User, StoreError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| &u.email == email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(tables.next_id()),
            email: email.clone(),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn create_affiliate(&self, affiliate: &NewAffiliate) -> Result<Affiliate, StoreError> {
        let mut tables = self.lock();
        let clash = tables.affiliates.iter().any(|a| {
            a.merchant_id == affiliate.merchant_id
                && (a.discount_code == affiliate.discount_code
                    || (affiliate.user_id.is_some() && a.user_id == affiliate.user_id))
        });
        if clash {
            return Err(StoreError::Conflict("affiliate already exists".to_owned()));
        }

        let created = Affiliate {
            id: AffiliateId::new(tables.next_id()),
            merchant_id: affiliate.merchant_id,
            user_id: affiliate.user_id,
            discount_code: affiliate.discount_code.clone(),
            commission_rate: affiliate.commission_rate,
            created_at: Utc::now(),
        };
        tables.affiliates.push(created.clone());
        Ok(created)
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let mut tables = self.lock();
        if tables.orders.iter().any(|o| {
            o.merchant_id == order.merchant_id && o.external_order_id == order.external_order_id
        }) {
            return Err(StoreError::Conflict(
                "external order id already exists".to_owned(),
            ));
        }

        let created = Order {
            id: OrderId::new(tables.next_id()),
            merchant_id: order.merchant_id,
            affiliate_id: order.affiliate_id,
            subtotal: order.subtotal,
            commission_owed: order.commission_owed,
            discount_code: order.discount_code.clone(),
            customer_email: order.customer_email.clone(),
            external_order_id: order.external_order_id.clone(),
            created_at: Utc::now(),
        };
        tables.orders.push(created.clone());
        Ok(created)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use affiliate_ledger_core::CommissionRate;
    use rust_decimal::Decimal;

    use super::*;

    #[tokio::test]
    async fn test_merchant_domain_is_unique() {
        let store = MemoryStore::new();
        store.create_merchant("shop.example", "Shop").await.unwrap();

        let err = store.create_merchant("shop.example", "Other").await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_merchant_domain_is_normalized() {
        let store = MemoryStore::new();
        let merchant = store.create_merchant(" Shop.Example ", "Shop").await.unwrap();
        assert_eq!(merchant.domain, "shop.example");

        let found = store.find_merchant_by_domain("SHOP.example.").await.unwrap();
        assert_eq!(found.map(|m| m.id), Some(merchant.id));

        let err = store.create_merchant("shop.EXAMPLE", "Other").await;
        assert!(matches!(err, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_discount_code_lookup_is_merchant_scoped() {
        let store = MemoryStore::new();
        let a = store.create_merchant("a.example", "A").await.unwrap();
        let b = store.create_merchant("b.example", "B").await.unwrap();
        store
            .create_affiliate(&NewAffiliate {
                merchant_id: a.id,
                user_id: None,
                discount_code: "SAVE10".to_owned(),
                commission_rate: CommissionRate::SELF_REGISTRATION,
            })
            .await
            .unwrap();

        assert!(
            store
                .find_affiliate_by_discount_code(a.id, "SAVE10")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .find_affiliate_by_discount_code(b.id, "SAVE10")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_standalone_affiliates_do_not_clash_on_user() {
        let store = MemoryStore::new();
        let merchant = store.create_merchant("shop.example", "Shop").await.unwrap();
        for code in ["ONE", "TWO"] {
            store
                .create_affiliate(&NewAffiliate {
                    merchant_id: merchant.id,
                    user_id: None,
                    discount_code: code.to_owned(),
                    commission_rate: CommissionRate::SELF_REGISTRATION,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.affiliates().len(), 2);
    }

    #[tokio::test]
    async fn test_order_external_id_unique_per_merchant() {
        let store = MemoryStore::new();
        let merchant = store.create_merchant("shop.example", "Shop").await.unwrap();
        let order = NewOrder {
            merchant_id: merchant.id,
            affiliate_id: AffiliateId::new(99),
            subtotal: Decimal::new(5000, 2),
            commission_owed: Decimal::new(500, 2),
            discount_code: String::new(),
            customer_email: Email::parse("buyer@example.com").unwrap(),
            external_order_id: "1001".to_owned(),
        };

        store.create_order(&order).await.unwrap();
        assert!(matches!(
            store.create_order(&order).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.orders().len(), 1);
    }
}
