//! Network-first resolution with cache write-back

use crate::cache::GenerationManager;
use crate::fallback;
use crate::network::fetch_checked;
use crate::policy::{Resolution, ResolutionPolicy, ResolutionSource};
use crate::request::Request;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Caption on the placeholder when the cache misses after a network failure
pub const CACHE_MATCH_ERROR_CAPTION: &str = "Cache match error";

/// Ask the network first and keep what it returns; fall back to the stored
/// entry, then to the placeholder.
///
/// With a timeout, a slow network counts as failed once the budget is spent.
/// The fetch is not cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferNetwork {
    timeout: Option<Duration>,
}

impl PreferNetwork {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ResolutionPolicy for PreferNetwork {
    async fn resolve(&self, manager: &GenerationManager, request: &Request) -> Resolution {
        let mut failures = Vec::new();

        match fetch_checked(manager.network(), request, self.timeout).await {
            Ok(response) => {
                // fetch_checked only passes acceptable statuses, which is the write-back gate
                return match manager.store(request, response.clone()).await {
                    Ok(()) => {
                        debug!("Updated {} in {}", request.url(), manager.name());
                        Resolution::new(response, ResolutionSource::NetworkCached, failures)
                    }
                    Err(e) => {
                        warn!("{}", e);
                        failures.push(e);
                        Resolution::new(response, ResolutionSource::Network, failures)
                    }
                };
            }
            Err(e) => {
                warn!("{}", e);
                failures.push(e);
            }
        }

        match manager.lookup(request, Some(manager.name())).await {
            Ok(response) => Resolution::new(response, ResolutionSource::Cache, failures),
            Err(e) => {
                warn!("{}", e);
                failures.push(e);
                Resolution::new(
                    fallback::response(CACHE_MATCH_ERROR_CAPTION),
                    ResolutionSource::Fallback,
                    failures,
                )
            }
        }
    }

    fn name(&self) -> &'static str {
        "prefer-network"
    }
}
