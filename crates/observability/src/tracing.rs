//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Output format for process logs.
///
/// Production wants machine-readable lines; local development wants something
/// a human can scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Filtering is always RUST_LOG-driven, defaulting to info.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    match format {
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
        LogFormat::Pretty => {
            let _ = builder.try_init();
        }
    }
}
