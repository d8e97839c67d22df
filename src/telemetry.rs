//! Logging setup and interrupt handling for the binary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. `RUST_LOG` wins over the default level.
///
/// Logs go to stderr so stdout carries only the run summary.
pub fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Sets `stop` on Ctrl-C. The hub finishes the current step and returns.
///
/// # Errors
///
/// Returns the `ctrlc` error if a handler is already installed.
pub fn install_stop_handler(stop: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        info!("interrupt received, stopping after the current step");
        stop.store(true, Ordering::SeqCst);
    })
}
