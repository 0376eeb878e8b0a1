//! Request resolution policies
//!
//! Two interchangeable strategies decide where a response comes from:
//! - `PreferCache`: stored entry, else network, else placeholder
//! - `PreferNetwork`: network (written back to the cache), else stored
//!   entry, else placeholder
//!
//! Neither ever fails. Every absorbed error is logged and recorded on the
//! returned `Resolution`.

mod prefer_cache;
mod prefer_network;

pub use prefer_cache::PreferCache;
pub use prefer_network::PreferNetwork;

use crate::cache::GenerationManager;
use crate::config::schema::{FetchConfig, Strategy};
use crate::error::OffcacheError;
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Where a resolved response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Stored entry in the cache
    Cache,
    /// Live network response, not stored
    Network,
    /// Live network response, also written to the active generation
    NetworkCached,
    /// Generated placeholder
    Fallback,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
            Self::NetworkCached => write!(f, "network+cache"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Outcome of resolving one request
#[derive(Debug)]
pub struct Resolution {
    pub response: Response,
    pub source: ResolutionSource,
    /// Errors absorbed on the way, in the order they happened
    pub failures: Vec<OffcacheError>,
}

impl Resolution {
    pub(crate) fn new(response: Response, source: ResolutionSource, failures: Vec<OffcacheError>) -> Self {
        Self {
            response,
            source,
            failures,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResolutionSource::Fallback
    }
}

/// Strategy for answering a single request
#[async_trait]
pub trait ResolutionPolicy: Send + Sync {
    /// Resolve a request against the manager's active generation
    async fn resolve(&self, manager: &GenerationManager, request: &Request) -> Resolution;

    /// Human-readable policy name for logs
    fn name(&self) -> &'static str;
}

/// Build the policy selected in configuration
pub fn create_policy(config: &FetchConfig) -> Box<dyn ResolutionPolicy> {
    match config.strategy {
        Strategy::PreferCache => Box::new(PreferCache),
        Strategy::PreferNetwork => Box::new(PreferNetwork::new(
            config.timeout_ms.map(Duration::from_millis),
        )),
    }
}
