//! Tracing subscriber setup for hosts embedding the ledger

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "food_ledger=info";

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Falls back to `food_ledger=info`. Calling this again after a subscriber
/// is already installed is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
