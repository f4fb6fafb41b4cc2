//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures that can be decided without
/// talking to a store (malformed input, incomplete records). Store failures
/// live with the store ports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A record was saved without a field the record type requires.
    #[error("missing mandatory field: {0}")]
    MissingMandatoryField(&'static str),

    /// A sublist line operation was not valid in the record's current state.
    #[error("invalid line operation: {0}")]
    InvalidLine(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_line(msg: impl Into<String>) -> Self {
        Self::InvalidLine(msg.into())
    }
}
