//! Tracing setup for the `ferrum` binary.
//!
//! Logs go to stderr; stdout is reserved for command output so it can be
//! piped into `jq` or a file.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Colored, human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`
/// (e.g. `RUST_LOG=ferrum_ledger=debug`).
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(?format, "logging initialized");
}
