use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labledger_core::date::ledger_date;
use labledger_core::id::stored;
use labledger_core::{ProductName, RollNumber, StudentName};

use crate::ledger::LendingEvent;

/// Direction of a movement, from the lab's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One row of the unified transactions log: every issue and return, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Roll No", deserialize_with = "stored::deserialize")]
    pub roll: RollNumber,
    #[serde(rename = "Name", deserialize_with = "stored::deserialize")]
    pub student_name: StudentName,
    #[serde(rename = "Product", deserialize_with = "stored::deserialize")]
    pub product: ProductName,
    #[serde(rename = "Status")]
    pub direction: Direction,
    #[serde(rename = "Date", with = "ledger_date")]
    pub date: DateTime<Utc>,
}

impl From<&LendingEvent> for TransactionRecord {
    fn from(event: &LendingEvent) -> Self {
        match event {
            LendingEvent::ItemIssued(e) => Self {
                roll: e.roll.clone(),
                student_name: e.student_name.clone(),
                product: e.product.clone(),
                direction: Direction::Outgoing,
                date: e.occurred_at,
            },
            LendingEvent::ItemReturned(e) => Self {
                roll: e.roll.clone(),
                student_name: e.student_name.clone(),
                product: e.product.clone(),
                direction: Direction::Incoming,
                date: e.occurred_at,
            },
        }
    }
}

/// Net count of items a student still holds according to a transactions log.
pub fn net_outstanding<'a>(
    log: impl IntoIterator<Item = &'a TransactionRecord>,
    roll: &RollNumber,
    product: &ProductName,
) -> i64 {
    log.into_iter()
        .filter(|t| &t.roll == roll && &t.product == product)
        .map(|t| match t.direction {
            Direction::Outgoing => 1,
            Direction::Incoming => -1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::stock::Inventory;
    use chrono::TimeZone;

    #[test]
    fn events_map_to_directional_rows() {
        let at = Utc.with_ymd_and_hms(2025, 8, 21, 12, 0, 0).unwrap();
        let mut ledger = Ledger::new(Inventory::default_lab_stock(), vec![]);

        let (_, issued) = ledger.issue("22BCS002", "Priya", "Beaker", at).unwrap();
        let (_, returned) = ledger.return_item("22BCS002", "Beaker", at).unwrap();
        let (_, again) = ledger.issue("22BCS002", "Priya", "Beaker", at).unwrap();

        let log: Vec<TransactionRecord> = [
            LendingEvent::ItemIssued(issued),
            LendingEvent::ItemReturned(returned),
            LendingEvent::ItemIssued(again),
        ]
        .iter()
        .map(TransactionRecord::from)
        .collect();

        assert_eq!(log[0].direction, Direction::Outgoing);
        assert_eq!(log[1].direction, Direction::Incoming);
        assert_eq!(log[1].student_name.as_str(), "Priya");

        let roll = RollNumber::new("22BCS002").unwrap();
        let beaker = ProductName::new("Beaker").unwrap();
        assert_eq!(net_outstanding(&log, &roll, &beaker), 1);
        assert_eq!(
            net_outstanding(&log, &roll, &beaker) as usize,
            ledger.pending_for_student(&roll).len()
        );
    }
}
