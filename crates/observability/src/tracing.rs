//! Tracing/logging initialization.
//!
//! Log lines go to stderr so report output on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::LogFormat;

/// Initialize tracing/logging for the process.
///
/// The filter comes from `directive` when given, otherwise from `RUST_LOG`,
/// falling back to `info`. Safe to call multiple times (subsequent calls are no-ops).
pub fn init(format: LogFormat, directive: Option<&str>) {
    let filter = match directive {
        Some(d) => EnvFilter::new(d),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
    if installed.is_ok() {
        ::tracing::debug!(?format, "logging initialized");
    }
}
