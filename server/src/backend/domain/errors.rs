//! Error taxonomy for domain operations.
//!
//! Storage code works in `anyhow::Result`; anything it returns is lifted into
//! [`DomainError::Storage`] so persistence failures always reach the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::InvalidState(_) => "invalid_state",
            DomainError::Validation(_) => "validation",
            DomainError::Unauthorized(_) => "unauthorized",
            DomainError::Conflict(_) => "conflict",
            DomainError::Storage(_) => "storage",
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        DomainError::InvalidState(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        DomainError::Validation(reason.into())
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
