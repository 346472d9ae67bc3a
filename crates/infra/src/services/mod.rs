//! Application services: read-modify-write orchestration over the relation stores.
//!
//! ```text
//! Form input
//!   ↓
//! 1. Load the relations the operation touches (full read)
//!   ↓
//! 2. Rebuild the domain model and run the operation in memory
//!   ↓
//! 3. Rewrite the mutated relations (nothing is written on a domain error)
//! ```
//!
//! There is no locking or isolation between processes.

pub mod lending;
pub mod register;

use thiserror::Error;

use labledger_core::DomainError;

use crate::store::StoreError;

pub use lending::{Bootstrap, LendingRelations, LendingService, Receipt};
pub use register::{RegisterRelations, RegisterService};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected; state is unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Reading or writing a relation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) => None,
        }
    }
}
