//! Subscriber setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "catalog_classifier=info";

/// Install the global fmt subscriber. Safe to call twice; the second call
/// is ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with_target(false)
        .try_init();
}
