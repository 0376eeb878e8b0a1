//! Network access for resolution policies
//!
//! The `Network` trait is the host's fetch primitive. `fetch_checked` layers
//! status classification and an optional wait budget on top of it.

mod http;

pub use http::HttpNetwork;

use crate::error::{network_status, network_timeout, OffcacheError, OffcacheResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Host fetch primitive
///
/// Implementations return whatever status the server sent. Only transport
/// problems (DNS, refused connections, broken bodies) are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> OffcacheResult<Response>;
}

/// Fetch a request, rejecting server errors and, if `timeout` is set,
/// giving up on the wait after that long.
///
/// A timed-out fetch keeps running on its own task; its eventual response
/// is dropped.
pub async fn fetch_checked(
    network: &Arc<dyn Network>,
    request: &Request,
    timeout: Option<Duration>,
) -> OffcacheResult<Response> {
    let response = match timeout {
        None => network.fetch(request).await?,
        Some(limit) => {
            let network = Arc::clone(network);
            let detached = request.clone();
            let pending = tokio::spawn(async move { network.fetch(&detached).await });

            match tokio::time::timeout(limit, pending).await {
                Ok(joined) => joined
                    .map_err(|e| OffcacheError::Internal(format!("network task failed: {}", e)))??,
                Err(_) => {
                    debug!("Abandoning wait for {} after {:?}", request.url(), limit);
                    return Err(network_timeout(request, limit.as_millis() as u64));
                }
            }
        }
    };

    if !response.is_acceptable() {
        return Err(network_status(request, response.status));
    }
    Ok(response)
}
