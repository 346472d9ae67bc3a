//! Lending domain module.
//!
//! Business rules for lending lab items to students, implemented purely as
//! deterministic domain logic (no IO, no storage).
//!
//! Two bookkeeping styles live side by side:
//! - [`Ledger`]: an inventory plus an outgoing log whose entries carry a status flag.
//! - [`Register`]: append-only outgoing and incoming logs reconciled by a left join.

pub mod entry;
pub mod ledger;
pub mod reconcile;
pub mod register;
pub mod stock;
pub mod transaction;

pub use entry::{EntryStatus, LedgerEntry};
pub use ledger::{IssueItem, ItemIssued, ItemReturned, Ledger, LendingCommand, LendingEvent, ReturnItem};
pub use reconcile::{PendingBalance, reconcile};
pub use register::{IncomingRecord, OutgoingRecord, Register};
pub use stock::{Inventory, InventoryItem};
pub use transaction::{Direction, TransactionRecord, net_outstanding};
