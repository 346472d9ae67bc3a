//! Relation storage abstractions.
//!
//! Each persisted relation (inventory, outgoing log, ...) is loaded and saved
//! as a whole. Services read, mutate in memory, then rewrite.

pub mod csv_file;
pub mod in_memory;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use csv_file::{CsvRelation, Tabular, to_csv_string};
pub use in_memory::InMemoryRelation;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed row in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render {relation} as csv: {message}")]
    Export { relation: String, message: String },

    #[error("relation lock poisoned: {0}")]
    Poisoned(String),
}

/// Whole-relation load/save.
pub trait RelationStore<R>: Send + Sync {
    /// Short relation name, for logs and error messages.
    fn name(&self) -> &str;

    /// Whether the relation has ever been saved.
    fn exists(&self) -> bool;

    /// All rows in stored order. A relation that does not exist yet loads as empty.
    fn load(&self) -> Result<Vec<R>, StoreError>;

    /// Replace the relation with `rows`.
    fn save(&self, rows: &[R]) -> Result<(), StoreError>;

    /// Append rows, returning the new row count.
    fn append(&self, rows: &[R]) -> Result<usize, StoreError>
    where
        R: Clone,
    {
        let mut all = self.load()?;
        all.extend_from_slice(rows);
        self.save(&all)?;
        Ok(all.len())
    }
}

impl<R, S> RelationStore<R> for Arc<S>
where
    S: RelationStore<R> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn load(&self) -> Result<Vec<R>, StoreError> {
        (**self).load()
    }

    fn save(&self, rows: &[R]) -> Result<(), StoreError> {
        (**self).save(rows)
    }
}
