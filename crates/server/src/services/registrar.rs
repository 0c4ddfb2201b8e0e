//! Affiliate self-registration.
//!
//! Turns a customer email into an affiliate of a merchant: the user is found or
//! created, and an affiliate with a freshly generated discount code is created
//! unless the user already has one for that merchant.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use affiliate_ledger_core::{CommissionRate, Email};

use crate::db::{Store, StoreError};
use crate::models::{Affiliate, Merchant, NewAffiliate, User};

/// Attempts at finding an unused discount code before giving up.
const MAX_CODE_ATTEMPTS: usize = 3;

/// Length of generated discount codes.
const DISCOUNT_CODE_LENGTH: usize = 8;

/// Errors that can occur while registering an affiliate.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Every generated discount code was already taken.
    #[error("could not allocate a unique discount code after {0} attempts")]
    DiscountCodesExhausted(usize),
}

/// Creates affiliates for merchant/email pairs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AffiliateRegistrar: Send + Sync {
    /// Register `email` as an affiliate of `merchant` at `commission_rate`.
    ///
    /// Returns the existing affiliate if the user is already registered with
    /// this merchant.
    async fn register(
        &self,
        merchant: &Merchant,
        email: &Email,
        name: &str,
        commission_rate: CommissionRate,
    ) -> Result<Affiliate, RegistrationError>;
}

/// Source of candidate discount codes.
pub type CodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Generate an uppercase alphanumeric discount code from a random UUID.
#[must_use]
pub fn random_discount_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(DISCOUNT_CODE_LENGTH)
        .collect::<String>()
        .to_uppercase()
}

/// [`AffiliateRegistrar`] that writes through a [`Store`].
#[derive(Clone)]
pub struct StoreRegistrar {
    store: Arc<dyn Store>,
    generate_code: CodeGenerator,
}

impl std::fmt::Debug for StoreRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistrar").finish_non_exhaustive()
    }
}

impl StoreRegistrar {
    /// Create a registrar issuing random discount codes.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            generate_code: Arc::new(random_discount_code),
        }
    }

    /// Create a registrar with a custom discount code source.
    #[must_use]
    pub fn with_code_generator(store: Arc<dyn Store>, generate_code: CodeGenerator) -> Self {
        Self {
            store,
            generate_code,
        }
    }

    async fn find_or_create_user(&self, email: &Email, name: &str) -> Result<User, StoreError> {
        if let Some(user) = self.store.find_user_by_email(email).await? {
            return Ok(user);
        }

        match self.store.create_user(email, name).await {
            Ok(user) => {
                debug!(user_id = %user.id, "Created user for affiliate registration");
                Ok(user)
            }
            // Another registration created the user between our read and write
            Err(StoreError::Conflict(_)) => self
                .store
                .find_user_by_email(email)
                .await?
                .ok_or(StoreError::NotFound),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl AffiliateRegistrar for StoreRegistrar {
    async fn register(
        &self,
        merchant: &Merchant,
        email: &Email,
        name: &str,
        commission_rate: CommissionRate,
    ) -> Result<Affiliate, RegistrationError> {
        let user = self.find_or_create_user(email, name).await?;

        if let Some(existing) = self.store.find_affiliate_by_user(merchant.id, user.id).await? {
            return Ok(existing);
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let new_affiliate = NewAffiliate {
                merchant_id: merchant.id,
                user_id: Some(user.id),
                discount_code: (self.generate_code)(),
                commission_rate,
            };

            match self.store.create_affiliate(&new_affiliate).await {
                Ok(affiliate) => {
                    info!(
                        merchant_id = %merchant.id,
                        affiliate_id = %affiliate.id,
                        user_id = %user.id,
                        commission_rate = %commission_rate,
                        "Registered affiliate"
                    );
                    return Ok(affiliate);
                }
                Err(StoreError::Conflict(reason)) => {
                    // Either a concurrent registration won, or the code is taken
                    if let Some(existing) =
                        self.store.find_affiliate_by_user(merchant.id, user.id).await?
                    {
                        debug!(affiliate_id = %existing.id, "Affiliate registered concurrently");
                        return Ok(existing);
                    }
                    warn!(attempt, %reason, "Discount code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RegistrationError::DiscountCodesExhausted(MAX_CODE_ATTEMPTS))
    }
}
