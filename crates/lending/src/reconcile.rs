//! Issued vs. returned reconciliation for the two-log register.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use labledger_core::{ProductName, RollNumber, StudentName};

use crate::register::{IncomingRecord, OutgoingRecord};

/// Quantity still held by one student for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBalance {
    #[serde(rename = "Roll No")]
    pub roll: RollNumber,
    #[serde(rename = "Name")]
    pub student_name: StudentName,
    #[serde(rename = "Product")]
    pub product: ProductName,
    #[serde(rename = "Quantity_issued")]
    pub issued: u64,
    #[serde(rename = "Quantity_returned")]
    pub returned: u64,
    #[serde(rename = "Pending")]
    pub pending: i64,
}

/// Left-join issued totals onto returned totals and keep the groups still open.
///
/// Issues are grouped by (roll, name, product), returns by (roll, product). A
/// group with no returns counts as zero returned. Groups whose pending quantity
/// is zero or negative are dropped. Output is ordered by (roll, name, product).
pub fn reconcile(outgoing: &[OutgoingRecord], incoming: &[IncomingRecord]) -> Vec<PendingBalance> {
    let mut issued: BTreeMap<(&RollNumber, &StudentName, &ProductName), u64> = BTreeMap::new();
    for rec in outgoing {
        *issued
            .entry((&rec.roll, &rec.student_name, &rec.product))
            .or_default() += u64::from(rec.quantity);
    }

    let mut returned: BTreeMap<(&RollNumber, &ProductName), u64> = BTreeMap::new();
    for rec in incoming {
        *returned.entry((&rec.roll, &rec.product)).or_default() += u64::from(rec.quantity);
    }

    issued
        .into_iter()
        .filter_map(|((roll, name, product), issued_qty)| {
            let returned_qty = returned.get(&(roll, product)).copied().unwrap_or(0);
            let pending = issued_qty as i64 - returned_qty as i64;
            (pending > 0).then(|| PendingBalance {
                roll: roll.clone(),
                student_name: name.clone(),
                product: product.clone(),
                issued: issued_qty,
                returned: returned_qty,
                pending,
            })
        })
        .collect()
}
