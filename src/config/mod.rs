//! Configuration loading and management
//!
//! Settings come from an optional YAML file and from `SHEPHERD_*`
//! environment variables (a `.env` file is honoured). Environment values
//! win over file values.
//!
//! ```yaml
//! backend:
//!   url: https://project.supabase.co
//!   key: anon-key
//! http:
//!   timeout_secs: 30
//! cache:
//!   max_capacity: 1000
//!   stale_time_secs: 120
//! ```

use crate::core::error::ConfigError;
use crate::core::record::RecordKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Backend base URL
pub const ENV_BACKEND_URL: &str = "SHEPHERD_BACKEND_URL";
/// Backend anonymous API key
pub const ENV_BACKEND_KEY: &str = "SHEPHERD_BACKEND_KEY";
/// HTTP request timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SHEPHERD_HTTP_TIMEOUT_SECS";
/// Stale time applied to every cached query, in seconds
pub const ENV_CACHE_STALE_SECS: &str = "SHEPHERD_CACHE_STALE_SECS";
/// Maximum number of cached query results
pub const ENV_CACHE_CAPACITY: &str = "SHEPHERD_CACHE_CAPACITY";

/// Marker in credentials left at their template values
const PLACEHOLDER_MARKER: &str = "placeholder";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
}

/// Hosted backend connection settings
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

impl BackendConfig {
    /// Usable credentials, if both values are set to something real
    ///
    /// Empty values and values containing `placeholder` count as absent.
    pub fn credentials(&self) -> Option<BackendCredentials> {
        let usable = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty() && !v.contains(PLACEHOLDER_MARKER))
                .map(str::to_string)
        };

        Some(BackendCredentials {
            url: usable(&self.url)?,
            key: usable(&self.key)?,
        })
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Backend URL and API key, both known to be usable
#[derive(Clone, PartialEq, Eq)]
pub struct BackendCredentials {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Query cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,

    /// Overrides every per-record stale time when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_time_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            stale_time_secs: None,
        }
    }
}

impl CacheConfig {
    /// How long a cached read of this kind stays fresh, ignoring per-view times
    pub fn stale_time(&self, kind: RecordKind) -> Duration {
        self.stale_time_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| kind.stale_time())
    }
}

impl AppConfig {
    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Read the process environment (after loading `.env`) over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None::<&Path>)
    }

    /// Layer the environment over an optional YAML file
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        if let Ok(dotenv) = dotenvy::dotenv() {
            tracing::debug!(path = %dotenv.display(), "loaded .env file");
        }

        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        let config = base.apply_env_with(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from a variable lookup
    ///
    /// Unset variables leave the current value alone.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ENV_BACKEND_KEY) {
            self.backend.key = Some(key);
        }
        if let Some(raw) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http.timeout_secs = parse_number(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CACHE_STALE_SECS) {
            self.cache.stale_time_secs = Some(parse_number(ENV_CACHE_STALE_SECS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_CACHE_CAPACITY) {
            self.cache.max_capacity = parse_number(ENV_CACHE_CAPACITY, &raw)?;
        }
        Ok(self)
    }

    /// Reject values the providers and cache cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "0", "must be at least 1 second"));
        }
        if self.cache.max_capacity == 0 {
            return Err(invalid("cache.max_capacity", "0", "must be at least 1"));
        }
        if let Some(credentials) = self.backend.credentials() {
            if !credentials.url.starts_with("http://") && !credentials.url.starts_with("https://") {
                return Err(invalid(
                    "backend.url",
                    &credentials.url,
                    "must be an http(s) URL",
                ));
            }
        }
        Ok(())
    }
}

fn parse_number(field: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(field, raw, "expected a non-negative integer"))
}

fn invalid(field: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.cache.max_capacity, 1000);
        assert!(config.backend.credentials().is_none());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = AppConfig::from_yaml_str(
            "backend:\n  url: https://demo.supabase.co\n  key: anon\ncache:\n  stale_time_secs: 5\n",
        )
        .unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();

        // Should be able to parse it back
        let parsed = AppConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.http.timeout_secs, 30);
    }

    #[test]
    fn test_placeholder_credentials_count_as_absent() {
        let backend = BackendConfig {
            url: Some("https://placeholder.supabase.co".to_string()),
            key: Some("real-key".to_string()),
        };
        assert!(backend.credentials().is_none());

        let backend = BackendConfig {
            url: Some("https://demo.supabase.co".to_string()),
            key: Some("  ".to_string()),
        };
        assert!(backend.credentials().is_none());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = AppConfig::from_yaml_str("http:\n  timeout_secs: 10\n")
            .unwrap()
            .apply_env_with(lookup(&[
                (ENV_HTTP_TIMEOUT_SECS, "45"),
                (ENV_CACHE_STALE_SECS, "3"),
            ]))
            .unwrap();
        assert_eq!(config.http.timeout_secs, 45);
        assert_eq!(
            config.cache.stale_time(RecordKind::Center),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn test_bad_number_names_the_variable() {
        let err = AppConfig::default()
            .apply_env_with(lookup(&[(ENV_CACHE_CAPACITY, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CACHE_CAPACITY));
    }

    #[test]
    fn test_debug_redacts_key() {
        let backend = BackendConfig {
            url: Some("https://demo.supabase.co".to_string()),
            key: Some("super-secret".to_string()),
        };
        assert!(!format!("{:?}", backend).contains("super-secret"));
        let credentials = backend.credentials().unwrap();
        assert!(!format!("{:?}", credentials).contains("super-secret"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_url() {
        let mut config = AppConfig::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.backend = BackendConfig {
            url: Some("demo.supabase.co".to_string()),
            key: Some("anon".to_string()),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "backend.url"
        ));
    }

    #[test]
    fn test_default_stale_times_follow_record_kind() {
        let cache = CacheConfig::default();
        assert_eq!(cache.stale_time(RecordKind::Center), Duration::from_secs(600));
        assert_eq!(cache.stale_time(RecordKind::Member), Duration::from_secs(120));
    }
}
