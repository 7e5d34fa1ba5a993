//! Logging init: structured `tracing` output on stderr.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,oistats=info";

/// Initialize logging to stderr, filtered by `RUST_LOG` (default `warn,oistats=info`).
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
