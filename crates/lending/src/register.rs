use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use labledger_core::date::ledger_date;
use labledger_core::id::stored;
use labledger_core::{DomainError, DomainResult, ProductName, RollNumber, StudentName};

use crate::reconcile::{PendingBalance, reconcile};

/// Row of the register's outgoing log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingRecord {
    #[serde(rename = "Date", with = "ledger_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "Roll No", deserialize_with = "stored::deserialize")]
    pub roll: RollNumber,
    #[serde(rename = "Name", deserialize_with = "stored::deserialize")]
    pub student_name: StudentName,
    #[serde(rename = "Product", deserialize_with = "stored::deserialize")]
    pub product: ProductName,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

impl OutgoingRecord {
    pub fn new(
        roll: &str,
        name: &str,
        product: &str,
        quantity: u32,
        date: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            date,
            roll: RollNumber::new(roll)?,
            student_name: StudentName::new(name)?,
            product: ProductName::new(product)?,
            quantity: positive(quantity)?,
        })
    }
}

/// Row of the register's incoming (returned) log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRecord {
    #[serde(rename = "Date", with = "ledger_date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "Roll No", deserialize_with = "stored::deserialize")]
    pub roll: RollNumber,
    #[serde(rename = "Product", deserialize_with = "stored::deserialize")]
    pub product: ProductName,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

impl IncomingRecord {
    pub fn new(roll: &str, product: &str, quantity: u32, date: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            date,
            roll: RollNumber::new(roll)?,
            product: ProductName::new(product)?,
            quantity: positive(quantity)?,
        })
    }
}

fn positive(quantity: u32) -> DomainResult<u32> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be at least 1"));
    }
    Ok(quantity)
}

/// Two append-only logs; pending state is derived, never stored.
///
/// Returns are not checked against issues. Over-returns simply drop the group
/// out of the reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    outgoing: Vec<OutgoingRecord>,
    incoming: Vec<IncomingRecord>,
}

impl Register {
    pub fn new(outgoing: Vec<OutgoingRecord>, incoming: Vec<IncomingRecord>) -> Self {
        Self { outgoing, incoming }
    }

    /// Two issues and one return, used to seed a fresh register for demos.
    pub fn sample() -> DomainResult<Self> {
        let day = |d: u32| {
            Utc.with_ymd_and_hms(2025, 8, d, 0, 0, 0)
                .single()
                .ok_or_else(|| DomainError::validation("invalid sample date"))
        };
        Ok(Self {
            outgoing: vec![
                OutgoingRecord::new("22BCS001", "Rahul", "Microscope", 1, day(20)?)?,
                OutgoingRecord::new("22BCS002", "Priya", "Beaker", 2, day(21)?)?,
            ],
            incoming: vec![IncomingRecord::new("22BCS001", "Microscope", 1, day(22)?)?],
        })
    }

    pub fn record_outgoing(
        &mut self,
        roll: &str,
        name: &str,
        product: &str,
        quantity: u32,
        date: DateTime<Utc>,
    ) -> DomainResult<&OutgoingRecord> {
        let record = OutgoingRecord::new(roll, name, product, quantity, date)?;
        self.outgoing.push(record);
        self.outgoing
            .last()
            .ok_or_else(|| DomainError::invariant("outgoing record missing after append"))
    }

    pub fn record_incoming(
        &mut self,
        roll: &str,
        product: &str,
        quantity: u32,
        date: DateTime<Utc>,
    ) -> DomainResult<&IncomingRecord> {
        let record = IncomingRecord::new(roll, product, quantity, date)?;
        self.incoming.push(record);
        self.incoming
            .last()
            .ok_or_else(|| DomainError::invariant("incoming record missing after append"))
    }

    pub fn outgoing(&self) -> &[OutgoingRecord] {
        &self.outgoing
    }

    pub fn incoming(&self) -> &[IncomingRecord] {
        &self.incoming
    }

    pub fn not_yet_returned(&self) -> Vec<PendingBalance> {
        reconcile(&self.outgoing, &self.incoming)
    }

    pub fn into_parts(self) -> (Vec<OutgoingRecord>, Vec<IncomingRecord>) {
        (self.outgoing, self.incoming)
    }
}
