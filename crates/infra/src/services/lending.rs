use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use labledger_core::{DomainError, ProductName, RollNumber};
use labledger_events::{Event, EventEnvelope};
use labledger_lending::{
    Inventory, InventoryItem, Ledger, LedgerEntry, LendingEvent, TransactionRecord,
};

use super::ServiceError;
use crate::config::{LedgerConfig, Relation};
use crate::store::{CsvRelation, InMemoryRelation, RelationStore};

/// Stream name stamped on envelopes committed to the transactions log.
const TRANSACTIONS_STREAM: &str = "lending.transactions";

/// The three relations behind the status ledger.
#[derive(Clone)]
pub struct LendingRelations {
    pub inventory: Arc<dyn RelationStore<InventoryItem>>,
    pub ledger: Arc<dyn RelationStore<LedgerEntry>>,
    pub transactions: Arc<dyn RelationStore<TransactionRecord>>,
}

impl core::fmt::Debug for LendingRelations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LendingRelations")
            .field("inventory", &self.inventory.name())
            .field("ledger", &self.ledger.name())
            .field("transactions", &self.transactions.name())
            .finish()
    }
}

impl LendingRelations {
    /// Fresh, never-saved in-memory relations.
    pub fn in_memory() -> Self {
        Self {
            inventory: Arc::new(InMemoryRelation::new(Relation::Inventory.name())),
            ledger: Arc::new(InMemoryRelation::new(Relation::Ledger.name())),
            transactions: Arc::new(InMemoryRelation::new(Relation::Transactions.name())),
        }
    }

    /// CSV files under the configured data directory.
    pub fn csv(config: &LedgerConfig) -> Self {
        let file = |relation: Relation| config.stored_path(relation);
        Self {
            inventory: Arc::new(CsvRelation::new(
                Relation::Inventory.name(),
                file(Relation::Inventory),
            )),
            ledger: Arc::new(CsvRelation::new(Relation::Ledger.name(), file(Relation::Ledger))),
            transactions: Arc::new(CsvRelation::new(
                Relation::Transactions.name(),
                file(Relation::Transactions),
            )),
        }
    }
}

/// Outcome of a successful issue or return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// The outgoing-log row as it stands after the operation.
    pub entry: LedgerEntry,
    /// The transactions-log event, with its 1-based position in the log.
    pub transaction: EventEnvelope<LendingEvent>,
}

/// What `bootstrap` had to create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bootstrap {
    pub seeded_inventory: bool,
    pub created_ledger: bool,
    pub created_transactions: bool,
}

/// Issue/return orchestration for the status ledger.
///
/// Each operation loads inventory and outgoing log in full, runs the ledger
/// aggregate, then rewrites the outgoing log, the inventory and the
/// transactions log, in that order. A domain rejection writes nothing.
#[derive(Debug, Clone)]
pub struct LendingService {
    relations: LendingRelations,
}

impl LendingService {
    pub fn new(relations: LendingRelations) -> Self {
        Self { relations }
    }

    pub fn relations(&self) -> &LendingRelations {
        &self.relations
    }

    /// Seed default stock and create empty logs for relations that do not exist yet.
    pub fn bootstrap(&self) -> Result<Bootstrap, ServiceError> {
        let mut report = Bootstrap::default();

        if !self.relations.inventory.exists() {
            self.relations
                .inventory
                .save(Inventory::default_lab_stock().items())?;
            report.seeded_inventory = true;
            info!("seeded default lab inventory");
        }
        if !self.relations.ledger.exists() {
            self.relations.ledger.save(&[])?;
            report.created_ledger = true;
        }
        if !self.relations.transactions.exists() {
            self.relations.transactions.save(&[])?;
            report.created_transactions = true;
        }

        Ok(report)
    }

    /// Current ledger state. A data directory without an inventory relation starts
    /// from the default lab stock, which the first committed operation writes out.
    pub fn load_ledger(&self) -> Result<Ledger, ServiceError> {
        let inventory = if self.relations.inventory.exists() {
            Inventory::new(self.relations.inventory.load()?)?
        } else {
            debug!("no inventory relation yet, using default lab stock");
            Inventory::default_lab_stock()
        };
        let entries = self.relations.ledger.load()?;
        Ok(Ledger::new(inventory, entries))
    }

    pub fn issue(
        &self,
        roll: &str,
        name: &str,
        product: &str,
        date: DateTime<Utc>,
    ) -> Result<Receipt, ServiceError> {
        let mut ledger = self.load_ledger()?;
        let (entry, issued) = ledger
            .issue(roll, name, product, date)
            .inspect_err(|e| debug!(error = %e, "issue rejected"))?;

        let transaction = self.commit(ledger, LendingEvent::ItemIssued(issued))?;
        info!(
            roll = %entry.roll,
            product = %entry.product,
            transaction = transaction.sequence_number(),
            "item issued"
        );
        Ok(Receipt { entry, transaction })
    }

    pub fn return_item(
        &self,
        roll: &str,
        product: &str,
        date: DateTime<Utc>,
    ) -> Result<Receipt, ServiceError> {
        let mut ledger = self.load_ledger()?;
        let (entry, returned) = ledger
            .return_item(roll, product, date)
            .inspect_err(|e| debug!(error = %e, "return rejected"))?;

        let transaction = self.commit(ledger, LendingEvent::ItemReturned(returned))?;
        info!(
            roll = %entry.roll,
            product = %entry.product,
            transaction = transaction.sequence_number(),
            "item returned"
        );
        Ok(Receipt { entry, transaction })
    }

    pub fn pending_for_student(&self, roll: &str) -> Result<Vec<LedgerEntry>, ServiceError> {
        let roll = RollNumber::new(roll)?;
        Ok(cloned(self.load_ledger()?.pending_for_student(&roll)))
    }

    pub fn pending_all(&self) -> Result<Vec<LedgerEntry>, ServiceError> {
        Ok(cloned(self.load_ledger()?.pending_all()))
    }

    pub fn history_for_student(&self, roll: &str) -> Result<Vec<LedgerEntry>, ServiceError> {
        let roll = RollNumber::new(roll)?;
        Ok(cloned(self.load_ledger()?.history_for_student(&roll)))
    }

    pub fn returnable_products(&self, roll: &str) -> Result<Vec<ProductName>, ServiceError> {
        let roll = RollNumber::new(roll)?;
        let ledger = self.load_ledger()?;
        Ok(ledger.returnable_products(&roll).into_iter().cloned().collect())
    }

    pub fn inventory(&self) -> Result<Vec<InventoryItem>, ServiceError> {
        Ok(self.load_ledger()?.into_parts().0.into_items())
    }

    pub fn entries(&self) -> Result<Vec<LedgerEntry>, ServiceError> {
        Ok(self.relations.ledger.load()?)
    }

    pub fn transactions(&self) -> Result<Vec<TransactionRecord>, ServiceError> {
        Ok(self.relations.transactions.load()?)
    }

    fn commit(
        &self,
        ledger: Ledger,
        event: LendingEvent,
    ) -> Result<EventEnvelope<LendingEvent>, ServiceError> {
        let (inventory, entries) = ledger.into_parts();
        self.relations.ledger.save(&entries)?;
        self.relations.inventory.save(inventory.items())?;

        let record = TransactionRecord::from(&event);
        let total = self.relations.transactions.append(&[record])?;
        let sequence_number = u64::try_from(total)
            .map_err(|_| DomainError::invariant("transactions log too long"))?;

        let envelope = EventEnvelope::new(TRANSACTIONS_STREAM, sequence_number, event);
        debug!(
            stream = envelope.stream(),
            event_type = envelope.event_type(),
            schema_version = envelope.payload().version(),
            sequence_number,
            occurred_at = %envelope.payload().occurred_at(),
            "transaction recorded"
        );
        Ok(envelope)
    }
}

fn cloned(entries: Vec<&LedgerEntry>) -> Vec<LedgerEntry> {
    entries.into_iter().cloned().collect()
}
