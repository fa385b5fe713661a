//! Logging setup for the CLI using `tracing-subscriber`.
//!
//! Logs go to stderr so they never mix with verdicts and tables on stdout.
//! `RUST_LOG` takes precedence over the `-v`/`-q` flags.

use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
pub fn init(level: LevelFilter) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(level))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init()
}

/// Builds an `EnvFilter` from the given level, respecting the `RUST_LOG` env var.
fn build_env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // External crates stay at warn level to reduce noise
        EnvFilter::new(format!("warn,dfa={level},dfa_cli={level}"))
    })
}
