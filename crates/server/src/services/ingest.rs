//! Order ingestion and commission attribution.
//!
//! [`OrderIngestor::process_order`] records an incoming order exactly once per
//! merchant and credits it to an affiliate:
//!
//! 1. Resolve the merchant by domain (unknown merchants are skipped).
//! 2. Skip orders whose external ID the merchant has already recorded.
//! 3. Look up the *commission affiliate* owning the order's discount code.
//! 4. Self-register the customer as an affiliate of the merchant if they are
//!    not one yet. This happens whether or not step 3 found anyone.
//! 5. Without a commission affiliate, fall back to the customer's own
//!    affiliate record (possibly the one created in step 4).
//! 6. Persist the order with `subtotal * commission_rate` owed.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use affiliate_ledger_core::{CommissionRate, Email, MerchantId};

use crate::db::{Store, StoreError};
use crate::models::{Affiliate, Merchant, NewOrder, Order, normalize_domain};
use crate::services::registrar::{AffiliateRegistrar, RegistrationError, StoreRegistrar};

/// Incoming order as reported by a merchant's storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Merchant-side order identifier.
    pub order_id: String,
    /// Order subtotal; accepts a JSON number or decimal string.
    pub subtotal_price: Decimal,
    /// Storefront domain identifying the merchant.
    pub merchant_domain: String,
    /// Discount code applied at checkout, empty if none.
    #[serde(default)]
    pub discount_code: String,
    /// Purchasing customer's email.
    pub customer_email: String,
    /// Purchasing customer's name.
    #[serde(default)]
    pub customer_name: String,
}

/// Result of a successful ingestion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The order was recorded.
    Created(Order),
    /// The merchant already has an order with this external ID.
    SkippedDuplicate {
        merchant_id: MerchantId,
        external_order_id: String,
    },
    /// No merchant is registered for the payload's domain.
    SkippedUnknownMerchant { merchant_domain: String },
}

/// Errors that can occur while ingesting an order.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The payload failed validation before touching the store.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Neither the discount code nor the customer resolved to an affiliate.
    #[error(
        "no affiliate resolvable for order {external_order_id} (merchant {merchant_id}, customer {customer_email})"
    )]
    UnresolvableAffiliate {
        merchant_id: MerchantId,
        external_order_id: String,
        customer_email: Email,
    },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Self-registration of the customer failed.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),
}

/// Validated view of an [`OrderPayload`].
struct ValidOrder<'a> {
    external_order_id: &'a str,
    subtotal: Decimal,
    merchant_domain: String,
    discount_code: &'a str,
    customer_email: Email,
    customer_name: &'a str,
}

impl<'a> ValidOrder<'a> {
    fn parse(payload: &'a OrderPayload) -> Result<Self, IngestError> {
        let external_order_id = payload.order_id.trim();
        if external_order_id.is_empty() {
            return Err(IngestError::InvalidPayload(
                "order_id cannot be empty".to_owned(),
            ));
        }

        if payload.subtotal_price.is_sign_negative() && !payload.subtotal_price.is_zero() {
            return Err(IngestError::InvalidPayload(format!(
                "subtotal_price cannot be negative (got {})",
                payload.subtotal_price
            )));
        }

        let customer_email = Email::parse(&payload.customer_email)
            .map_err(|e| IngestError::InvalidPayload(format!("customer_email: {e}")))?;

        Ok(Self {
            external_order_id,
            subtotal: payload.subtotal_price,
            merchant_domain: normalize_domain(&payload.merchant_domain),
            discount_code: payload.discount_code.trim(),
            customer_email,
            customer_name: payload.customer_name.trim(),
        })
    }
}

/// Attributes and records incoming orders.
#[derive(Clone)]
pub struct OrderIngestor {
    store: Arc<dyn Store>,
    registrar: Arc<dyn AffiliateRegistrar>,
}

impl std::fmt::Debug for OrderIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderIngestor").finish_non_exhaustive()
    }
}

impl OrderIngestor {
    /// Create an ingestor from its collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, registrar: Arc<dyn AffiliateRegistrar>) -> Self {
        Self { store, registrar }
    }

    /// Create an ingestor that self-registers customers through the same store.
    #[must_use]
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let registrar = Arc::new(StoreRegistrar::new(Arc::clone(&store)));
        Self::new(store, registrar)
    }

    /// Ingest one order.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidPayload` if the payload fails validation.
    /// Returns `IngestError::UnresolvableAffiliate` if no affiliate can be
    /// credited; nothing is written in that case except a self-registration.
    /// Returns `IngestError::Store` or `IngestError::Registration` if a
    /// collaborator fails.
    #[instrument(
        skip(self, payload),
        fields(order_id = %payload.order_id, merchant_domain = %payload.merchant_domain)
    )]
    pub async fn process_order(
        &self,
        payload: &OrderPayload,
    ) -> Result<IngestOutcome, IngestError> {
        let order = ValidOrder::parse(payload)?;

        let Some(merchant) = self
            .store
            .find_merchant_by_domain(&order.merchant_domain)
            .await?
        else {
            info!("Skipping order for unknown merchant");
            return Ok(IngestOutcome::SkippedUnknownMerchant {
                merchant_domain: order.merchant_domain,
            });
        };

        if self
            .store
            .find_order_by_external_id(merchant.id, order.external_order_id)
            .await?
            .is_some()
        {
            info!(merchant_id = %merchant.id, "Skipping duplicate order");
            return Ok(duplicate(&merchant, order.external_order_id));
        }

        let commission_affiliate = if order.discount_code.is_empty() {
            None
        } else {
            self.store
                .find_affiliate_by_discount_code(merchant.id, order.discount_code)
                .await?
        };

        self.ensure_customer_registered(&merchant, &order).await?;

        let affiliate = match commission_affiliate {
            Some(affiliate) => affiliate,
            None => self
                .customer_affiliate(&merchant, &order.customer_email)
                .await?
                .ok_or_else(|| {
                    warn!(merchant_id = %merchant.id, "No affiliate resolvable for order");
                    IngestError::UnresolvableAffiliate {
                        merchant_id: merchant.id,
                        external_order_id: order.external_order_id.to_owned(),
                        customer_email: order.customer_email.clone(),
                    }
                })?,
        };

        let new_order = NewOrder {
            merchant_id: merchant.id,
            affiliate_id: affiliate.id,
            subtotal: order.subtotal,
            commission_owed: affiliate.commission_rate.commission_on(order.subtotal),
            discount_code: order.discount_code.to_owned(),
            customer_email: order.customer_email.clone(),
            external_order_id: order.external_order_id.to_owned(),
        };

        match self.store.create_order(&new_order).await {
            Ok(created) => {
                info!(
                    merchant_id = %merchant.id,
                    order_id = %created.id,
                    affiliate_id = %created.affiliate_id,
                    commission_owed = %created.commission_owed,
                    "Recorded order"
                );
                Ok(IngestOutcome::Created(created))
            }
            // A concurrent delivery of the same order won the insert
            Err(StoreError::Conflict(_)) => {
                info!(merchant_id = %merchant.id, "Skipping duplicate order (lost insert race)");
                Ok(duplicate(&merchant, order.external_order_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Register the customer as an affiliate of the merchant unless they
    /// already are one.
    async fn ensure_customer_registered(
        &self,
        merchant: &Merchant,
        order: &ValidOrder<'_>,
    ) -> Result<(), IngestError> {
        if self
            .customer_affiliate(merchant, &order.customer_email)
            .await?
            .is_some()
        {
            return Ok(());
        }

        self.registrar
            .register(
                merchant,
                &order.customer_email,
                order.customer_name,
                CommissionRate::SELF_REGISTRATION,
            )
            .await?;
        Ok(())
    }

    /// The customer's own affiliate record for this merchant, if any.
    async fn customer_affiliate(
        &self,
        merchant: &Merchant,
        email: &Email,
    ) -> Result<Option<Affiliate>, StoreError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Ok(None);
        };
        self.store.find_affiliate_by_user(merchant.id, user.id).await
    }
}

fn duplicate(merchant: &Merchant, external_order_id: &str) -> IngestOutcome {
    IngestOutcome::SkippedDuplicate {
        merchant_id: merchant.id,
        external_order_id: external_order_id.to_owned(),
    }
}
