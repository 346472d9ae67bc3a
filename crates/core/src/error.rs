//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. Every variant
/// blocks the requested mutation and leaves ledger state unchanged. Storage
/// failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required text field was empty after trimming.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// Issue attempted against a product with no stock left.
    #[error("not enough stock available for {product}")]
    InsufficientStock { product: String },

    /// Return attempted with no outstanding issue for the (roll, product) pair.
    #[error("no pending {product} found for roll number {roll}")]
    NoPendingEntry { roll: String, product: String },

    /// The product has no inventory row.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// A value failed validation (e.g. zero quantity, malformed date).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn insufficient_stock(product: impl Into<String>) -> Self {
        Self::InsufficientStock {
            product: product.into(),
        }
    }

    pub fn no_pending_entry(roll: impl Into<String>, product: impl Into<String>) -> Self {
        Self::NoPendingEntry {
            roll: roll.into(),
            product: product.into(),
        }
    }

    pub fn unknown_product(product: impl Into<String>) -> Self {
        Self::UnknownProduct(product.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
