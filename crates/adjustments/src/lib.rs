//! Inventory adjustment module.
//!
//! Turns a name-based adjustment request into one saved inventory adjustment
//! transaction. Name resolution and persistence go through the ports in
//! [`ports`]; everything else here is deterministic domain logic.

pub mod draft;
pub mod error;
pub mod handler;
pub mod ports;
pub mod request;
pub mod result;

pub use draft::{InventoryAdjustment, InventoryAdjustmentDraft, InventoryAdjustmentLine, SaveOptions};
pub use error::AdjustmentError;
pub use handler::{
    create_adjustment, handle_adjustment, report_outcome, resolve_id_from_name, resolve_identifiers,
    resolve_reason_code, ResolvedIdentifiers,
};
pub use ports::{AdjustmentReader, EntityLookup, ReasonCode, StoreError, TransactionWriter};
pub use request::{AdjustmentRequest, QuantityDelta};
pub use result::AdjustmentResult;
