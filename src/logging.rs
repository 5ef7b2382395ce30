//! Tracing subscriber setup for binaries and tests

use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"posecast=info"`).
///
/// Returns `false` if a global subscriber was already set; calling this more
/// than once is harmless.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    subscriber(filter).try_init().is_ok()
}

fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .with(filter)
}
