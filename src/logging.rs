//! Tracing subscriber setup for binaries and integration tests

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,shepherd=debug";

/// Install the global subscriber with the default filter
pub fn init() -> anyhow::Result<()> {
    init_with_default(DEFAULT_FILTER)
}

/// Install the global subscriber, honouring `RUST_LOG` over `default_filter`
///
/// Fails if a global subscriber is already installed.
pub fn init_with_default(default_filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
