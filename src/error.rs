//! Error types for offcache
//!
//! All modules use `OffcacheResult<T>` as their return type. Resolution
//! failures (miss, bad status, timeout, transport) never reach the caller of
//! a fetch; policies absorb them and record them on the `Resolution`.

use crate::request::Request;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for offcache operations
pub type OffcacheResult<T> = Result<T, OffcacheError>;

/// All errors that can occur in offcache
#[derive(Error, Debug)]
pub enum OffcacheError {
    // Resolution errors
    #[error("Unable to find {url} in {}", .cache_name.as_deref().unwrap_or("caches"))]
    CacheMiss {
        url: String,
        cache_name: Option<String>,
    },

    #[error("{url} responded with status {status}")]
    NetworkStatus { url: String, status: u16 },

    #[error("{url} timed out after {timeout_ms}ms")]
    NetworkTimeout { url: String, timeout_ms: u64 },

    #[error("{url} could not be fetched: {reason}")]
    Transport { url: String, reason: String },

    // Cache errors
    #[error("Failed to precache {url}: {source}")]
    Precache {
        url: String,
        #[source]
        source: Box<OffcacheError>,
    },

    #[error("Request method {method} is not supported for {url}")]
    UnsupportedMethod { method: String, url: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Lifecycle errors
    #[error("Cannot {action} while worker is {state}")]
    InvalidTransition { action: &'static str, state: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OffcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transport error for a request
    pub fn transport(request: &Request, reason: impl Into<String>) -> Self {
        Self::Transport {
            url: request.url().to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the network could not produce a usable response
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkStatus { .. } | Self::NetworkTimeout { .. } | Self::Transport { .. }
        )
    }

    /// Whether this error is a cache miss
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Precache { .. } => {
                Some("Check that every precache URL is reachable from the configured scope")
            }
            Self::ConfigInvalid { .. } => Some("Fix the config file or delete it to use defaults"),
            Self::InvalidTransition { .. } => {
                Some("Install must complete before activate; each runs once per worker")
            }
            _ => None,
        }
    }
}

/// Error for a request absent from `cache_name`, or from every cache if `None`
pub fn cache_miss(request: &Request, cache_name: Option<&str>) -> OffcacheError {
    OffcacheError::CacheMiss {
        url: request.url().to_string(),
        cache_name: cache_name.map(str::to_string),
    }
}

/// Error for a response the network answered with a server error status
pub fn network_status(request: &Request, status: u16) -> OffcacheError {
    OffcacheError::NetworkStatus {
        url: request.url().to_string(),
        status,
    }
}

/// Error for a network wait that exceeded its budget
pub fn network_timeout(request: &Request, timeout_ms: u64) -> OffcacheError {
    OffcacheError::NetworkTimeout {
        url: request.url().to_string(),
        timeout_ms,
    }
}
