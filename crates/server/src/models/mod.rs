//! Domain models for the ledger.
//!
//! These types represent validated domain objects separate from database row
//! types. Every merchant-owned entity carries its `merchant_id` so lookups can
//! be scoped explicitly.

pub mod affiliate;
pub mod merchant;
pub mod order;
pub mod user;

pub use affiliate::{Affiliate, NewAffiliate};
pub use merchant::{Merchant, normalize_domain};
pub use order::{NewOrder, Order};
pub use user::User;
