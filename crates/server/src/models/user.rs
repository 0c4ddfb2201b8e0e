//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use affiliate_ledger_core::{Email, UserId};

/// A person known to the ledger by email, typically a customer who became an
/// affiliate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized email address (globally unique).
    pub email: Email,
    /// Display name as supplied with the first order.
    pub name: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
