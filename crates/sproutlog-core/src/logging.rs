//! Tracing setup for binaries and tests embedding this crate.

use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Uses `RUST_LOG` to control the level (e.g. `RUST_LOG=debug`), defaulting
/// to `warn`, writing to stderr. Safe to call more than once; only the
/// first call installs a subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}
