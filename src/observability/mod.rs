//! Observability.
//!
//! Structured logging through `tracing`. Initialization happens once at
//! process startup; log output goes to stderr so action results on
//! stdout stay machine-readable.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the crate logs at `info`, or
/// `debug` when verbose output was requested. Safe to call more than
/// once; only the first call installs a subscriber.
pub fn init(verbose: bool) {
    OBSERVABILITY_INIT.get_or_init(|| {
        let default_directive = if verbose { "hearth=debug" } else { "hearth=info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    });
}
