use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use labledger_lending::{IncomingRecord, OutgoingRecord, PendingBalance, Register};

use super::ServiceError;
use crate::config::{LedgerConfig, Relation};
use crate::store::{CsvRelation, InMemoryRelation, RelationStore};

/// The two append-only logs behind the register.
#[derive(Clone)]
pub struct RegisterRelations {
    pub outgoing: Arc<dyn RelationStore<OutgoingRecord>>,
    pub incoming: Arc<dyn RelationStore<IncomingRecord>>,
}

impl core::fmt::Debug for RegisterRelations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRelations")
            .field("outgoing", &self.outgoing.name())
            .field("incoming", &self.incoming.name())
            .finish()
    }
}

impl RegisterRelations {
    pub fn in_memory() -> Self {
        Self {
            outgoing: Arc::new(InMemoryRelation::new(Relation::RegisterOutgoing.name())),
            incoming: Arc::new(InMemoryRelation::new(Relation::RegisterReturned.name())),
        }
    }

    pub fn csv(config: &LedgerConfig) -> Self {
        let file = |relation: Relation| config.stored_path(relation);
        Self {
            outgoing: Arc::new(CsvRelation::new(
                Relation::RegisterOutgoing.name(),
                file(Relation::RegisterOutgoing),
            )),
            incoming: Arc::new(CsvRelation::new(
                Relation::RegisterReturned.name(),
                file(Relation::RegisterReturned),
            )),
        }
    }
}

/// Issued/returned bookkeeping with quantities; pending state is computed on read.
#[derive(Debug, Clone)]
pub struct RegisterService {
    relations: RegisterRelations,
}

impl RegisterService {
    pub fn new(relations: RegisterRelations) -> Self {
        Self { relations }
    }

    /// Create missing logs, optionally filled with the demo rows.
    ///
    /// Returns `true` when anything was created.
    pub fn bootstrap(&self, with_samples: bool) -> Result<bool, ServiceError> {
        let (sample_out, sample_in) = if with_samples {
            Register::sample()?.into_parts()
        } else {
            (Vec::new(), Vec::new())
        };

        let mut created = false;
        if !self.relations.outgoing.exists() {
            self.relations.outgoing.save(&sample_out)?;
            created = true;
        }
        if !self.relations.incoming.exists() {
            self.relations.incoming.save(&sample_in)?;
            created = true;
        }
        if created {
            info!(with_samples, "register logs created");
        }
        Ok(created)
    }

    pub fn load(&self) -> Result<Register, ServiceError> {
        Ok(Register::new(
            self.relations.outgoing.load()?,
            self.relations.incoming.load()?,
        ))
    }

    pub fn record_outgoing(
        &self,
        roll: &str,
        name: &str,
        product: &str,
        quantity: u32,
        date: DateTime<Utc>,
    ) -> Result<OutgoingRecord, ServiceError> {
        let mut register = self.load()?;
        let record = register
            .record_outgoing(roll, name, product, quantity, date)?
            .clone();
        self.relations.outgoing.save(register.outgoing())?;
        info!(roll = %record.roll, product = %record.product, quantity, "outgoing recorded");
        Ok(record)
    }

    pub fn record_incoming(
        &self,
        roll: &str,
        product: &str,
        quantity: u32,
        date: DateTime<Utc>,
    ) -> Result<IncomingRecord, ServiceError> {
        let mut register = self.load()?;
        let record = register.record_incoming(roll, product, quantity, date)?.clone();
        self.relations.incoming.save(register.incoming())?;
        info!(roll = %record.roll, product = %record.product, quantity, "return recorded");
        Ok(record)
    }

    pub fn issued(&self) -> Result<Vec<OutgoingRecord>, ServiceError> {
        Ok(self.relations.outgoing.load()?)
    }

    pub fn returned(&self) -> Result<Vec<IncomingRecord>, ServiceError> {
        Ok(self.relations.incoming.load()?)
    }

    pub fn not_yet_returned(&self) -> Result<Vec<PendingBalance>, ServiceError> {
        Ok(self.load()?.not_yet_returned())
    }
}
