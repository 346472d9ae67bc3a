//! Both ledger variants wired to one data directory.

use tracing::info;

use crate::config::{LedgerConfig, Relation};
use crate::services::{
    Bootstrap, LendingRelations, LendingService, RegisterRelations, RegisterService, ServiceError,
};
use crate::store::to_csv_string;

#[derive(Debug, Clone)]
pub struct LabWorkspace {
    lending: LendingService,
    register: RegisterService,
}

impl LabWorkspace {
    pub fn new(lending: LendingService, register: RegisterService) -> Self {
        Self { lending, register }
    }

    /// CSV-backed workspace rooted at `config.data_dir`.
    pub fn open(config: &LedgerConfig) -> Self {
        info!(data_dir = %config.data_dir().display(), "opening lab workspace");
        Self::new(
            LendingService::new(LendingRelations::csv(config)),
            RegisterService::new(RegisterRelations::csv(config)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            LendingService::new(LendingRelations::in_memory()),
            RegisterService::new(RegisterRelations::in_memory()),
        )
    }

    pub fn lending(&self) -> &LendingService {
        &self.lending
    }

    pub fn register(&self) -> &RegisterService {
        &self.register
    }

    /// Create every missing relation. Register samples are only written into fresh logs.
    pub fn bootstrap(&self, register_samples: bool) -> Result<(Bootstrap, bool), ServiceError> {
        let lending = self.lending.bootstrap()?;
        let register = self.register.bootstrap(register_samples)?;
        Ok((lending, register))
    }

    /// Render a relation (or the derived not-yet-returned report) as CSV text.
    pub fn export(&self, relation: Relation) -> Result<String, ServiceError> {
        let name = relation.name();
        let text = match relation {
            Relation::Inventory => to_csv_string(name, &self.lending.inventory()?)?,
            Relation::Ledger => to_csv_string(name, &self.lending.entries()?)?,
            Relation::Transactions => to_csv_string(name, &self.lending.transactions()?)?,
            Relation::RegisterOutgoing => to_csv_string(name, &self.register.issued()?)?,
            Relation::RegisterReturned => to_csv_string(name, &self.register.returned()?)?,
            Relation::NotYetReturned => to_csv_string(name, &self.register.not_yet_returned()?)?,
        };
        Ok(text)
    }
}
