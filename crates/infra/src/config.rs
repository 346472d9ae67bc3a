//! Configuration loading and representation.
//!
//! Defaults match the file names the lab has always used; the data directory and
//! log format can be overridden from the environment.

use core::str::FromStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use labledger_observability::LogFormat;

pub const ENV_DATA_DIR: &str = "LABLEDGER_DATA_DIR";
pub const ENV_LOG_FORMAT: &str = "LABLEDGER_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    InvalidVar { var: &'static str, message: String },
}

/// Persisted relations known to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    Inventory,
    Ledger,
    Transactions,
    RegisterOutgoing,
    RegisterReturned,
    /// Derived: reconciliation of the two register logs.
    NotYetReturned,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::Inventory,
        Relation::Ledger,
        Relation::Transactions,
        Relation::RegisterOutgoing,
        Relation::RegisterReturned,
        Relation::NotYetReturned,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Relation::Inventory => "inventory",
            Relation::Ledger => "ledger",
            Relation::Transactions => "transactions",
            Relation::RegisterOutgoing => "register-outgoing",
            Relation::RegisterReturned => "register-returned",
            Relation::NotYetReturned => "not-yet-returned",
        }
    }

    /// File name used when exporting this relation.
    pub fn export_file_name(self) -> &'static str {
        match self {
            Relation::Inventory => "inventory_balance.csv",
            Relation::Ledger => "outgoing_log.csv",
            Relation::Transactions => "transactions_log.csv",
            Relation::RegisterOutgoing => "issued_products.csv",
            Relation::RegisterReturned => "returned_products.csv",
            Relation::NotYetReturned => "not_yet_returned.csv",
        }
    }
}

impl core::fmt::Display for Relation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relation::ALL
            .into_iter()
            .find(|r| r.name() == s.trim())
            .ok_or_else(|| format!("unknown relation '{s}'"))
    }
}

/// Where the relations live and how the process logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub data_dir: PathBuf,
    pub inventory_file: String,
    pub ledger_file: String,
    pub transactions_file: String,
    pub register_outgoing_file: String,
    pub register_returned_file: String,
    pub log_format: LogFormat,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            inventory_file: "inventory.csv".to_string(),
            ledger_file: "lab_outgoing.csv".to_string(),
            transactions_file: "transactions.csv".to_string(),
            register_outgoing_file: "register_outgoing.csv".to_string(),
            register_returned_file: "lab_returned.csv".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl LedgerConfig {
    /// Defaults overridden by `LABLEDGER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            config.log_format = raw.parse().map_err(|message| ConfigError::InvalidVar {
                var: ENV_LOG_FORMAT,
                message,
            })?;
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Backing file of a stored relation; `None` for derived ones.
    pub fn path_for(&self, relation: Relation) -> Option<PathBuf> {
        let file = match relation {
            Relation::Inventory => &self.inventory_file,
            Relation::Ledger => &self.ledger_file,
            Relation::Transactions => &self.transactions_file,
            Relation::RegisterOutgoing => &self.register_outgoing_file,
            Relation::RegisterReturned => &self.register_returned_file,
            Relation::NotYetReturned => return None,
        };
        Some(self.data_dir.join(file))
    }

    /// Like [`path_for`](Self::path_for), placing derived relations under their export name.
    pub(crate) fn stored_path(&self, relation: Relation) -> PathBuf {
        self.path_for(relation)
            .unwrap_or_else(|| self.data_dir.join(relation.export_file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_lab_file_names() {
        let config = LedgerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(
            config.path_for(Relation::Ledger),
            Some(PathBuf::from("./lab_outgoing.csv"))
        );
        assert_eq!(config.path_for(Relation::NotYetReturned), None);
    }

    #[test]
    fn environment_overrides_data_dir_and_log_format() {
        let config = LedgerConfig::from_lookup(lookup_from(&[
            (ENV_DATA_DIR, "/srv/lab"),
            (ENV_LOG_FORMAT, "json"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir(), Path::new("/srv/lab"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.path_for(Relation::Inventory),
            Some(PathBuf::from("/srv/lab/inventory.csv"))
        );
    }

    #[test]
    fn invalid_log_format_is_reported() {
        let err = LedgerConfig::from_lookup(lookup_from(&[(ENV_LOG_FORMAT, "yaml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var: ENV_LOG_FORMAT, .. }));
    }

    #[test]
    fn relation_names_round_trip_through_from_str() {
        for relation in Relation::ALL {
            assert_eq!(relation.name().parse::<Relation>(), Ok(relation));
        }
        assert!("students".parse::<Relation>().is_err());
    }
}
