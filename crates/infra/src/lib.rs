//! Infrastructure layer: relation stores, configuration, application services.

pub mod config;
pub mod services;
pub mod store;
pub mod workspace;


pub use config::{ConfigError, LedgerConfig, Relation};
pub use services::{
    Bootstrap, LendingRelations, LendingService, Receipt, RegisterRelations, RegisterService,
    ServiceError,
};
pub use store::{CsvRelation, InMemoryRelation, RelationStore, StoreError, Tabular};
pub use workspace::LabWorkspace;
