//! Tracing subscriber setup for the binary and embedding services.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// Records emitted through the `log` facade are forwarded into tracing.
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter_layer);
    let installed = if config.json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr).with_target(false)),
        )
    };
    if installed.is_err() {
        return false;
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %e, "log records are already routed elsewhere");
    }
    true
}
