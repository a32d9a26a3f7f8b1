//! AdminServiceBuilder for assembling an admin service

use super::AdminService;
use crate::cache::QueryCache;
use crate::config::CacheConfig;
use crate::core::error::{ConfigError, Result};
use crate::core::provider::DataProvider;
use std::sync::Arc;

/// Builder for [`AdminService`]
///
/// # Example
///
/// ```ignore
/// let service = AdminServiceBuilder::new()
///     .with_provider(FixtureProvider::new()?)
///     .with_cache_config(CacheConfig::default())
///     .build()?;
/// ```
#[derive(Default)]
pub struct AdminServiceBuilder {
    provider: Option<Arc<dyn DataProvider>>,
    cache_config: CacheConfig,
    cache: Option<QueryCache>,
}

impl AdminServiceBuilder {
    /// Create a new AdminServiceBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data provider (required)
    pub fn with_provider(mut self, provider: impl DataProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set an already shared data provider
    pub fn with_shared_provider(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Configure the cache the builder creates
    ///
    /// Ignored when an existing cache is supplied with [`Self::with_cache`].
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Share an existing cache
    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the service
    pub fn build(self) -> Result<AdminService> {
        let provider = self.provider.ok_or_else(|| ConfigError::MissingField {
            field: "provider".to_string(),
            context: "AdminServiceBuilder".to_string(),
        })?;

        let cache = self
            .cache
            .unwrap_or_else(|| QueryCache::new(&self.cache_config));

        tracing::debug!(backend = provider.backend_name(), "admin service built");
        Ok(AdminService::new(provider, cache))
    }
}
