//! Data provider implementations and startup selection

pub mod fixture;
pub mod live;

pub use fixture::{FixtureData, FixtureProvider};
pub use live::LiveProvider;

use crate::config::AppConfig;
use crate::core::error::Result;
use crate::core::provider::DataProvider;
use std::sync::Arc;

/// Pick the provider for this process
///
/// Usable backend credentials select the live provider; anything else falls
/// back to the fixture.
pub fn select_provider(config: &AppConfig) -> Result<Arc<dyn DataProvider>> {
    let provider: Arc<dyn DataProvider> = match config.backend.credentials() {
        Some(credentials) => Arc::new(LiveProvider::new(credentials, &config.http)?),
        None => {
            tracing::warn!("backend credentials missing or placeholder, serving fixture data");
            Arc::new(FixtureProvider::new()?)
        }
    };

    tracing::info!(backend = provider.backend_name(), "data provider selected");
    Ok(provider)
}
