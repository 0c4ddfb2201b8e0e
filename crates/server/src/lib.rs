//! Affiliate Ledger server library.
//!
//! Receives completed orders from merchant storefronts, attributes each one to
//! an affiliate, and records the commission owed. Exposed as a library so the
//! ingestion pipeline can be driven from the CLI and from integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
