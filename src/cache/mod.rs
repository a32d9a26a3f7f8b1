//! Query result cache with per-record-kind invalidation.
//!
//! Results are stored as JSON values keyed by the record kind they were read
//! from, the view that produced them and the serialized query parameters.
//! A write to one kind drops every entry tagged with that kind and leaves
//! the others alone.
//!
//! Each kind also carries a write generation. A read that was fetching while
//! its kind was written returns what it fetched but does not cache it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::core::error::{Result, ShepherdError};
use crate::core::record::RecordKind;

/// View name of the dashboard counters
pub const DASHBOARD_STATS_VIEW: &str = "dashboard_stats";

/// View name of the birthday histogram
pub const BIRTHDAY_CHART_VIEW: &str = "birthday_chart";

/// Views that stay fresh longer than the kind they are derived from
const VIEW_STALE_TIMES: [(&str, Duration); 2] = [
    (DASHBOARD_STATS_VIEW, Duration::from_secs(5 * 60)),
    (BIRTHDAY_CHART_VIEW, Duration::from_secs(10 * 60)),
];

/// Identity of one cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Record kind the result is derived from; the invalidation tag
    pub kind: RecordKind,
    /// The operation that produced the result ("list", "dashboard_stats", ...)
    pub view: &'static str,
    /// Serialized parameters; empty for parameterless views
    pub params: String,
}

impl QueryKey {
    /// Key for a parameterless view
    pub fn view(kind: RecordKind, view: &'static str) -> Self {
        Self {
            kind,
            view,
            params: String::new(),
        }
    }

    /// Key for a view with parameters
    pub fn with_params<P: Serialize>(
        kind: RecordKind,
        view: &'static str,
        params: &P,
    ) -> Result<Self> {
        let params = serde_json::to_string(params).map_err(|e| {
            ShepherdError::Internal(format!("failed to serialize cache key for {view}: {e}"))
        })?;
        Ok(Self { kind, view, params })
    }

    /// How long this result stays fresh when configuration sets no override
    pub fn default_stale_time(&self) -> Duration {
        VIEW_STALE_TIMES
            .iter()
            .find(|(view, _)| *view == self.view)
            .map(|(_, stale_time)| *stale_time)
            .unwrap_or_else(|| self.kind.stale_time())
    }
}

/// Per-entry lifetime: the configured override, else the view's stale time
struct StaleTimeExpiry {
    config: CacheConfig,
}

impl Expiry<QueryKey, Arc<Value>> for StaleTimeExpiry {
    fn expire_after_create(
        &self,
        key: &QueryKey,
        _value: &Arc<Value>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(
            self.config
                .stale_time_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| key.default_stale_time()),
        )
    }
}

/// Write counters, one per record kind
#[derive(Debug, Default)]
struct Generations([AtomicU64; RecordKind::ALL.len()]);

impl Generations {
    fn current(&self, kind: RecordKind) -> u64 {
        self.0[kind as usize].load(Ordering::Acquire)
    }

    fn bump(&self, kind: RecordKind) {
        self.0[kind as usize].fetch_add(1, Ordering::AcqRel);
    }
}

/// Shared query cache
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, Arc<Value>>,
    generations: Arc<Generations>,
}

impl QueryCache {
    /// Create a cache from configuration
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(StaleTimeExpiry {
                config: config.clone(),
            })
            .support_invalidation_closures()
            .build();

        Self {
            inner,
            generations: Arc::new(Generations::default()),
        }
    }

    /// Get a cached result
    ///
    /// An entry that no longer decodes as `T` is treated as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.inner.get(key).await?;
        match T::deserialize(value.as_ref()) {
            Ok(hit) => {
                debug!(kind = %key.kind, view = key.view, "cache hit");
                Some(hit)
            }
            Err(e) => {
                warn!(kind = %key.kind, view = key.view, error = %e, "cached value no longer decodes");
                None
            }
        }
    }

    /// Store a result
    pub async fn set<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => {
                debug!(kind = %key.kind, view = key.view, "cache set");
                self.inner.insert(key, Arc::new(value)).await;
            }
            Err(e) => {
                warn!(kind = %key.kind, view = key.view, error = %e, "failed to serialize cache value");
            }
        }
    }

    /// Return the cached result or run `fetch` and cache what it returns
    ///
    /// Errors from `fetch` are returned as is and nothing is cached. A result
    /// fetched while the key's kind was invalidated is returned uncached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get(&key).await {
            return Ok(hit);
        }

        debug!(kind = %key.kind, view = key.view, "cache miss");
        let generation = self.generations.current(key.kind);
        let value = fetch().await?;

        if self.generations.current(key.kind) != generation {
            debug!(kind = %key.kind, view = key.view, "kind written during fetch, not caching");
            return Ok(value);
        }
        self.set(key.clone(), &value).await;

        // An invalidation between the check and the insert does not see the new entry
        if self.generations.current(key.kind) != generation {
            self.inner.invalidate(&key).await;
        }
        Ok(value)
    }

    /// Drop every entry tagged with `kind`
    pub fn invalidate_kind(&self, kind: RecordKind) {
        self.generations.bump(kind);
        match self.inner.invalidate_entries_if(move |key, _| key.kind == kind) {
            Ok(_) => debug!(kind = %kind, "cache kind invalidated"),
            Err(e) => {
                // Predicates are enabled at build time, so this only fires if that changes
                warn!(kind = %kind, error = %e, "kind invalidation rejected, clearing cache");
                self.inner.invalidate_all();
            }
        }
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        for kind in RecordKind::ALL {
            self.generations.bump(kind);
        }
        self.inner.invalidate_all();
        debug!("cache cleared");
    }

    /// Approximate number of live entries
    ///
    /// Pending invalidations are applied first.
    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
