use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labledger_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, ProductName, RollNumber, StudentName,
};
use labledger_events::Event;

use crate::entry::{EntryStatus, LedgerEntry};
use crate::stock::Inventory;

/// Aggregate root: the lending ledger (inventory + outgoing log).
///
/// Loaded from its two relations, mutated in memory, then written back in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    inventory: Inventory,
    entries: Vec<LedgerEntry>,
    version: u64,
}

impl Ledger {
    pub fn new(inventory: Inventory, entries: Vec<LedgerEntry>) -> Self {
        Self {
            inventory,
            entries,
            version: 0,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// All entries in creation order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn into_parts(self) -> (Inventory, Vec<LedgerEntry>) {
        (self.inventory, self.entries)
    }

    /// Lend one unit of `product` to a student.
    pub fn issue(
        &mut self,
        roll: &str,
        name: &str,
        product: &str,
        date: DateTime<Utc>,
    ) -> DomainResult<(LedgerEntry, ItemIssued)> {
        let command = LendingCommand::Issue(IssueItem::new(roll, name, product, date)?);
        match self.execute(&command)?.pop() {
            Some(LendingEvent::ItemIssued(issued)) => {
                let entry = self
                    .entries
                    .last()
                    .cloned()
                    .ok_or_else(|| DomainError::invariant("issued entry missing after apply"))?;
                Ok((entry, issued))
            }
            _ => Err(DomainError::invariant("issue produced no ItemIssued event")),
        }
    }

    /// Take back one unit of `product` from a student, closing their oldest open entry.
    pub fn return_item(
        &mut self,
        roll: &str,
        product: &str,
        date: DateTime<Utc>,
    ) -> DomainResult<(LedgerEntry, ItemReturned)> {
        let command = LendingCommand::Return(ReturnItem::new(roll, product, date)?);
        match self.execute(&command)?.pop() {
            Some(LendingEvent::ItemReturned(returned)) => {
                let entry = self
                    .entries
                    .get(returned.entry_index)
                    .cloned()
                    .ok_or_else(|| DomainError::invariant("returned entry missing after apply"))?;
                Ok((entry, returned))
            }
            _ => Err(DomainError::invariant("return produced no ItemReturned event")),
        }
    }

    pub fn pending_for_student(&self, roll: &RollNumber) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_pending() && e.belongs_to(roll))
            .collect()
    }

    pub fn pending_all(&self) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.is_pending()).collect()
    }

    pub fn history_for_student(&self, roll: &RollNumber) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| e.belongs_to(roll)).collect()
    }

    /// Distinct products the student currently holds, in first-issued order.
    pub fn returnable_products(&self, roll: &RollNumber) -> Vec<&ProductName> {
        let mut products: Vec<&ProductName> = Vec::new();
        for entry in self.pending_for_student(roll) {
            if !products.contains(&&entry.product) {
                products.push(&entry.product);
            }
        }
        products
    }

    /// Number of open entries for a product.
    ///
    /// Advisory only: nothing ties this to the stock that was originally on hand.
    pub fn outstanding_for_product(&self, product: &ProductName) -> usize {
        self.entries
            .iter()
            .filter(|e| e.is_pending() && &e.product == product)
            .count()
    }

    fn first_pending_index(&self, roll: &RollNumber, product: &ProductName) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.matches_pending(roll, product))
    }
}

impl AggregateRoot for Ledger {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueItem {
    pub roll: RollNumber,
    pub student_name: StudentName,
    pub product: ProductName,
    pub occurred_at: DateTime<Utc>,
}

impl IssueItem {
    /// Validate raw form input.
    pub fn new(roll: &str, name: &str, product: &str, occurred_at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            roll: RollNumber::new(roll)?,
            student_name: StudentName::new(name)?,
            product: ProductName::new(product)?,
            occurred_at,
        })
    }
}

/// Command: ReturnItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub roll: RollNumber,
    pub product: ProductName,
    pub occurred_at: DateTime<Utc>,
}

impl ReturnItem {
    pub fn new(roll: &str, product: &str, occurred_at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            roll: RollNumber::new(roll)?,
            product: ProductName::new(product)?,
            occurred_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingCommand {
    Issue(IssueItem),
    Return(ReturnItem),
}

/// Event: ItemIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIssued {
    pub roll: RollNumber,
    pub student_name: StudentName,
    pub product: ProductName,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemReturned.
///
/// `entry_index` points at the outgoing-log row that was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReturned {
    pub entry_index: usize,
    pub roll: RollNumber,
    pub student_name: StudentName,
    pub product: ProductName,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LendingEvent {
    ItemIssued(ItemIssued),
    ItemReturned(ItemReturned),
}

impl Event for LendingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LendingEvent::ItemIssued(_) => "lending.item.issued",
            LendingEvent::ItemReturned(_) => "lending.item.returned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LendingEvent::ItemIssued(e) => e.occurred_at,
            LendingEvent::ItemReturned(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Ledger {
    type Command = LendingCommand;
    type Event = LendingEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LendingEvent::ItemIssued(e) => {
                if let Some(item) = self.inventory.get_mut(&e.product) {
                    item.withdraw_one();
                }
                self.entries.push(LedgerEntry::issued(
                    e.roll.clone(),
                    e.student_name.clone(),
                    e.product.clone(),
                    e.occurred_at,
                ));
            }
            LendingEvent::ItemReturned(e) => {
                if let Some(entry) = self.entries.get_mut(e.entry_index) {
                    entry.status = EntryStatus::Returned;
                }
                // A product dropped from the catalogue can still be handed back.
                if let Some(item) = self.inventory.get_mut(&e.product) {
                    item.restock_one();
                }
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LendingCommand::Issue(cmd) => self.handle_issue(cmd),
            LendingCommand::Return(cmd) => self.handle_return(cmd),
        }
    }
}

impl Ledger {
    fn handle_issue(&self, cmd: &IssueItem) -> Result<Vec<LendingEvent>, DomainError> {
        let item = self
            .inventory
            .get(&cmd.product)
            .ok_or_else(|| DomainError::unknown_product(cmd.product.as_str()))?;

        if !item.in_stock() {
            return Err(DomainError::insufficient_stock(cmd.product.as_str()));
        }

        Ok(vec![LendingEvent::ItemIssued(ItemIssued {
            roll: cmd.roll.clone(),
            student_name: cmd.student_name.clone(),
            product: cmd.product.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_return(&self, cmd: &ReturnItem) -> Result<Vec<LendingEvent>, DomainError> {
        let entry_index = self
            .first_pending_index(&cmd.roll, &cmd.product)
            .ok_or_else(|| DomainError::no_pending_entry(cmd.roll.as_str(), cmd.product.as_str()))?;

        if self
            .inventory
            .quantity_of(&cmd.product)
            .is_some_and(|q| q == u32::MAX)
        {
            return Err(DomainError::invariant("stock counter overflow"));
        }

        let student_name = self.entries[entry_index].student_name.clone();

        Ok(vec![LendingEvent::ItemReturned(ItemReturned {
            entry_index,
            roll: cmd.roll.clone(),
            student_name,
            product: cmd.product.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
