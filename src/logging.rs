//! Logging initialization.
//!
//! # Configuration
//!
//! - `RUST_LOG`: log level filter (default: `info`)
//!   - Per target: `RUST_LOG=engine=debug,ledger=warn,events=info`
//!
//! The engine logs under the `engine` target, the in-memory ledger under
//! `ledger` and [`TracingSink`](crate::events::TracingSink) under `events`.

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Level used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init()?;

    info!(target: "engine", "logging initialised");
    Ok(())
}
