//! Errors of the adjustment request flow.

use thiserror::Error;

use invadj_core::{DomainError, EntityCategory};

use crate::ports::StoreError;

/// Why an adjustment request failed.
#[derive(Debug, Error)]
pub enum AdjustmentError {
    /// The body could not be decoded into a request at all.
    #[error("invalid request body: {0}")]
    MalformedBody(String),

    /// The request itself was malformed.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// An entity name did not match any record in its category.
    #[error("{category} not found: {name}")]
    NotFound { category: &'static str, name: String },

    /// The store failed or refused the record.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdjustmentError {
    pub fn malformed_body(err: impl std::fmt::Display) -> Self {
        Self::MalformedBody(err.to_string())
    }

    pub fn not_found(category: EntityCategory, name: impl Into<String>) -> Self {
        Self::NotFound {
            category: category.as_str(),
            name: name.into(),
        }
    }

    pub fn reason_code_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            category: "reason code",
            name: name.into(),
        }
    }

    /// Short classification used as the log title.
    pub fn title(&self) -> &'static str {
        match self {
            AdjustmentError::MalformedBody(_) => "INVALID_REQUEST_BODY",
            AdjustmentError::Validation(_) => "INVALID_REQUEST",
            AdjustmentError::NotFound { .. } => "RECORD_NOT_FOUND",
            AdjustmentError::Store(StoreError::Domain(_)) => "INVALID_RECORD",
            AdjustmentError::Store(StoreError::InvalidReference { .. }) => "INVALID_REFERENCE",
            AdjustmentError::Store(StoreError::Rejected(_)) => "RECORD_REJECTED",
            AdjustmentError::Store(StoreError::Unavailable(_)) => "STORE_UNAVAILABLE",
        }
    }
}
