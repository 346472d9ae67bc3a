use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labledger_core::date::ledger_date;
use labledger_core::id::stored;
use labledger_core::{ProductName, RollNumber, StudentName};

/// Custody status of an issued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    #[serde(rename = "Not Returned")]
    NotReturned,
    #[serde(rename = "Returned")]
    Returned,
}

impl core::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntryStatus::NotReturned => f.write_str("Not Returned"),
            EntryStatus::Returned => f.write_str("Returned"),
        }
    }
}

/// One row of the outgoing log.
///
/// Created as `NotReturned` on issue and flipped to `Returned` exactly once.
/// Entries are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "Roll No", deserialize_with = "stored::deserialize")]
    pub roll: RollNumber,
    #[serde(rename = "Name", deserialize_with = "stored::deserialize")]
    pub student_name: StudentName,
    #[serde(rename = "Product", deserialize_with = "stored::deserialize")]
    pub product: ProductName,
    #[serde(rename = "Date", with = "ledger_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "Status")]
    pub status: EntryStatus,
}

impl LedgerEntry {
    pub fn issued(
        roll: RollNumber,
        student_name: StudentName,
        product: ProductName,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            roll,
            student_name,
            product,
            date,
            status: EntryStatus::NotReturned,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == EntryStatus::NotReturned
    }

    pub fn belongs_to(&self, roll: &RollNumber) -> bool {
        &self.roll == roll
    }

    pub(crate) fn matches_pending(&self, roll: &RollNumber, product: &ProductName) -> bool {
        self.is_pending() && &self.roll == roll && &self.product == product
    }
}
