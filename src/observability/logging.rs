//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber for the CLI
//! - Resolve the filter from `RUST_LOG`, else the configured level
//!
//! Log lines go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset: the library and the
/// `okx-dex` binary at `level`.
pub fn default_directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    format!("okx_dex_sdk={level},okx_dex={level}")
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(level: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
}
