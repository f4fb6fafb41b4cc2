//! Store ports: what the handler needs from a record store.
//!
//! Adapters live in `invadj-infra` (in-memory, Postgres). The traits are async
//! and object-safe so the API can hold them as `Arc<dyn ...>`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use invadj_core::{
    AccountId, AdjustmentId, DomainError, EntityCategory, InternalId, ReasonCodeId,
};

use crate::draft::{InventoryAdjustment, InventoryAdjustmentDraft, SaveOptions};

/// Adjustment reason-code catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCode {
    pub id: ReasonCodeId,
    pub name: String,
    /// Expense/asset account the adjustment posts against.
    pub account_id: AccountId,
}

/// Record store operation error.
///
/// These are store-side failures as opposed to request validation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A field references a record that does not exist in its category.
    #[error("invalid reference for field {field}: {id}")]
    InvalidReference { field: &'static str, id: InternalId },

    /// The store refused the write for another reason.
    #[error("store rejected the record: {0}")]
    Rejected(String),

    /// The draft itself was not saveable.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Exact-name lookups.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Id of the entity in `category` whose name equals `name`.
    ///
    /// When several entities share the name, implementations must return the
    /// same one every time.
    async fn find_id_by_name(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> Result<Option<InternalId>, StoreError>;

    /// Reason-code catalog entry named `name`, with its account.
    async fn find_reason_code(&self, name: &str) -> Result<Option<ReasonCode>, StoreError>;
}

/// Persists adjustment drafts.
#[async_trait]
pub trait TransactionWriter: Send + Sync {
    /// Save `draft` as a new adjustment. Either the whole record is stored or
    /// nothing is.
    async fn create(
        &self,
        draft: InventoryAdjustmentDraft,
        options: SaveOptions,
    ) -> Result<AdjustmentId, StoreError>;
}

/// Reads saved adjustments back.
#[async_trait]
pub trait AdjustmentReader: Send + Sync {
    async fn get(&self, id: AdjustmentId) -> Result<Option<InventoryAdjustment>, StoreError>;
}

#[async_trait]
impl<S> EntityLookup for Arc<S>
where
    S: EntityLookup + ?Sized,
{
    async fn find_id_by_name(
        &self,
        category: EntityCategory,
        name: &str,
    ) -> Result<Option<InternalId>, StoreError> {
        (**self).find_id_by_name(category, name).await
    }

    async fn find_reason_code(&self, name: &str) -> Result<Option<ReasonCode>, StoreError> {
        (**self).find_reason_code(name).await
    }
}

#[async_trait]
impl<S> TransactionWriter for Arc<S>
where
    S: TransactionWriter + ?Sized,
{
    async fn create(
        &self,
        draft: InventoryAdjustmentDraft,
        options: SaveOptions,
    ) -> Result<AdjustmentId, StoreError> {
        (**self).create(draft, options).await
    }
}

#[async_trait]
impl<S> AdjustmentReader for Arc<S>
where
    S: AdjustmentReader + ?Sized,
{
    async fn get(&self, id: AdjustmentId) -> Result<Option<InventoryAdjustment>, StoreError> {
        (**self).get(id).await
    }
}
