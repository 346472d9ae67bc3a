//! Tracing/logging setup shared by the ledger binaries.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, single line per event.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format, None);
}

/// Same as [`init`], with an explicit filter directive overriding `RUST_LOG`.
pub fn init_with_filter(format: LogFormat, directive: &str) {
    tracing::init(format, Some(directive));
}
