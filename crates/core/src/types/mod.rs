//! Core types for Affiliate Ledger.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod commission;
pub mod email;
pub mod id;

pub use commission::{CommissionRate, CommissionRateError};
pub use email::{Email, EmailError};
pub use id::*;
