use std::sync::RwLock;

use super::{RelationStore, StoreError};

/// In-memory relation for tests/dev.
#[derive(Debug)]
pub struct InMemoryRelation<R> {
    name: String,
    rows: RwLock<Option<Vec<R>>>,
}

impl<R> InMemoryRelation<R> {
    /// A relation that has never been saved.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(None),
        }
    }

    /// A relation that already holds `rows`.
    pub fn with_rows(name: impl Into<String>, rows: Vec<R>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(Some(rows)),
        }
    }
}

impl<R> RelationStore<R> for InMemoryRelation<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.rows.read().map(|r| r.is_some()).unwrap_or(false)
    }

    fn load(&self) -> Result<Vec<R>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Poisoned(self.name.clone()))?;
        Ok(rows.clone().unwrap_or_default())
    }

    fn save(&self, rows: &[R]) -> Result<(), StoreError> {
        let mut guard = self
            .rows
            .write()
            .map_err(|_| StoreError::Poisoned(self.name.clone()))?;
        *guard = Some(rows.to_vec());
        Ok(())
    }
}
