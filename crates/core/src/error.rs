//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, broken redistribution). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation cannot complete while preserving invariants
    /// (redistribution exhausted its candidates, unlink of consumed stock).
    /// Fatal to the current operation; callers must roll back.
    #[error("logic error: {0}")]
    Logic(String),

    /// A quantity invariant was violated at the stock unit or assignment
    /// level (ordered below received, shipped above sold). Same severity as
    /// [`DomainError::Logic`], kept distinct for caller-side filtering.
    #[error("stock logic violation: {0}")]
    StockLogic(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested entity was not found (domain-level).
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self::Logic(msg.into())
    }

    pub fn stock_logic(msg: impl Into<String>) -> Self {
        Self::StockLogic(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
