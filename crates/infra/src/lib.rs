//! Infrastructure layer: record store adapters and catalog seeding.

pub mod record_store;
pub mod seed;

pub use record_store::{CatalogWriter, InMemoryRecordStore, PostgresRecordStore};
pub use seed::{SeedCatalog, SeedError, SeedReasonCode};
