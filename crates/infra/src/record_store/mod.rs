//! Record store adapters implementing the adjustment ports.

use async_trait::async_trait;

use invadj_adjustments::{ReasonCode, StoreError};
use invadj_core::{AccountId, EntityCategory, InternalId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

/// Catalog maintenance: registering the records adjustments refer to.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn add_entity(&self, category: EntityCategory, name: &str)
    -> Result<InternalId, StoreError>;

    async fn add_reason_code(
        &self,
        name: &str,
        account_id: AccountId,
    ) -> Result<ReasonCode, StoreError>;
}
