//! Tracing subscriber bootstrap for the binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! caller's job.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default directives used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "memoport=info";

/// Install a stderr formatter filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
