//! Affiliate Ledger Core - Shared types library.
//!
//! This crate provides common types used across all Affiliate Ledger components:
//! - `server` - Order ingestion service and webhook endpoint
//! - `cli` - Command-line tools for migrations, provisioning and one-shot ingestion
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and commission rates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
