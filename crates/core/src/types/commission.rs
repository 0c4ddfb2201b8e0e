//! Commission rate representation using decimal arithmetic.
//!
//! Rates are fractions of the order subtotal (`0.1` means 10%). They are fixed
//! when an affiliate is created and multiplied against each attributed order's
//! subtotal to produce the commission owed.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`CommissionRate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommissionRateError {
    /// The rate is below zero.
    #[error("commission rate cannot be negative (got {0})")]
    Negative(Decimal),
    /// The rate is above one (more than the whole subtotal).
    #[error("commission rate cannot exceed 1 (got {0})")]
    AboveOne(Decimal),
    /// The rate has more fractional digits than can be stored.
    #[error("commission rate allows at most {max} decimal places (got {value})")]
    TooPrecise { value: Decimal, max: u32 },
}

/// A commission rate as a fraction in `[0, 1]`.
///
/// ```
/// use affiliate_ledger_core::CommissionRate;
/// use rust_decimal::Decimal;
///
/// let rate = CommissionRate::SELF_REGISTRATION;
/// assert_eq!(rate.commission_on(Decimal::new(10000, 2)), Decimal::new(10, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    /// Rate assigned to customers who are auto-registered as affiliates (10%).
    pub const SELF_REGISTRATION: Self = Self(Decimal::from_parts(1, 0, 0, false, 1));

    /// Fractional digits kept by the `commission_rate` column.
    pub const MAX_SCALE: u32 = 4;

    /// Create a rate from a decimal fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative, greater than one, or has
    /// more than [`Self::MAX_SCALE`] significant decimal places.
    pub fn new(value: Decimal) -> Result<Self, CommissionRateError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CommissionRateError::Negative(value));
        }
        if value > Decimal::ONE {
            return Err(CommissionRateError::AboveOne(value));
        }
        if value.normalize().scale() > Self::MAX_SCALE {
            return Err(CommissionRateError::TooPrecise {
                value,
                max: Self::MAX_SCALE,
            });
        }
        Ok(Self(value))
    }

    /// Get the underlying decimal fraction.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Commission owed on a subtotal at this rate.
    #[must_use]
    pub fn commission_on(&self, subtotal: Decimal) -> Decimal {
        subtotal * self.0
    }
}

impl fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for CommissionRate {
    type Error = CommissionRateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommissionRate> for Decimal {
    fn from(rate: CommissionRate) -> Self {
        rate.0
    }
}

impl<'de> Deserialize<'de> for CommissionRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CommissionRate {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CommissionRate {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let rate = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(rate)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CommissionRate {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
