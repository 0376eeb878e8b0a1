//! Configuration schema for offcache
//!
//! Configuration is stored at `~/.config/offcache/config.toml`

use serde::{Deserialize, Serialize};

/// Active cache generation when none is configured. Bumping it is how a
/// deployment invalidates everything cached by the previous one.
/// 50 MiB
pub const DEFAULT_MAX_BODY_BYTES: u64 = 50 * 1024 * 1024;

pub const DEFAULT_CACHE_NAME: &str = "cache-v1.2.1";

/// Resources fetched into a new generation at install time
pub const DEFAULT_PRECACHE_URLS: &[&str] = &["index.html", "./", "./?source=pwa"];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache generation settings
    pub cache: CacheConfig,

    /// Request resolution settings
    pub fetch: FetchConfig,

    /// HTTP client settings
    pub network: NetworkConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level for the `offcache` target: warn, info, debug, trace
    pub log_level: String,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// Cache generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Name of the active generation
    pub name: String,

    /// Base URL precache entries are resolved against
    pub scope: String,

    /// URLs (relative to `scope`) fetched at install time
    pub precache: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            scope: "http://localhost/".to_string(),
            precache: DEFAULT_PRECACHE_URLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Which source a request is resolved from first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    PreferCache,
    PreferNetwork,
}

/// Request resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Resolution strategy for intercepted GET requests
    pub strategy: Strategy,

    /// Network wait budget for prefer-network, in milliseconds
    pub timeout_ms: Option<u64>,

    /// Re-store every intercepted GET in the background
    pub refresh: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::PreferCache,
            timeout_ms: None,
            refresh: true,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// User-Agent sent with every request
    pub user_agent: String,

    /// Hard limit on a single HTTP exchange, in seconds
    pub request_timeout_secs: u64,

    /// Largest response body accepted, in bytes
    pub max_body_bytes: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("offcache/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
