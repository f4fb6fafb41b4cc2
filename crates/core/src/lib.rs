//! `invadj-core` — identifiers and error model shared by every layer.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod category;
pub mod error;
pub mod id;

pub use category::EntityCategory;
pub use error::{DomainError, DomainResult};
pub use id::{
    AccountId, AdjustmentId, DepartmentId, InternalId, ItemId, LocationId, ReasonCodeId,
    SubsidiaryId,
};
