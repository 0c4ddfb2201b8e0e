//! Business logic services.
//!
//! # Services
//!
//! - `ingest` - Order ingestion, deduplication and commission attribution
//! - `registrar` - Self-registration of customers as affiliates

pub mod ingest;
pub mod registrar;

pub use ingest::{IngestError, IngestOutcome, OrderIngestor, OrderPayload};
pub use registrar::{AffiliateRegistrar, RegistrationError, StoreRegistrar};
