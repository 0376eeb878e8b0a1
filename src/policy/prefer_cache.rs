//! Cache-first resolution

use crate::cache::GenerationManager;
use crate::fallback;
use crate::network::fetch_checked;
use crate::policy::{Resolution, ResolutionPolicy, ResolutionSource};
use crate::request::Request;
use async_trait::async_trait;
use tracing::warn;

/// Caption on the placeholder when the network fails after a cache miss
pub const NETWORK_ERROR_CAPTION: &str = "Network error";

/// Serve the stored entry; on a miss go to the network without storing the
/// result; if that fails too, serve the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferCache;

#[async_trait]
impl ResolutionPolicy for PreferCache {
    async fn resolve(&self, manager: &GenerationManager, request: &Request) -> Resolution {
        let mut failures = Vec::new();

        match manager.lookup(request, Some(manager.name())).await {
            Ok(response) => return Resolution::new(response, ResolutionSource::Cache, failures),
            Err(e) => {
                warn!("{}", e);
                failures.push(e);
            }
        }

        match fetch_checked(manager.network(), request, None).await {
            Ok(response) => Resolution::new(response, ResolutionSource::Network, failures),
            Err(e) => {
                warn!("{}", e);
                failures.push(e);
                Resolution::new(
                    fallback::response(NETWORK_ERROR_CAPTION),
                    ResolutionSource::Fallback,
                    failures,
                )
            }
        }
    }

    fn name(&self) -> &'static str {
        "prefer-cache"
    }
}
