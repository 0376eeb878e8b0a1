//! Cache generation lifecycle
//!
//! A generation is a named cache holding one deployment's entries. The
//! manager populates the active generation at install time, deletes every
//! other generation at activation, and gives policies read/write access to
//! the active generation's entries.

use crate::cache::storage::CacheStorage;
use crate::error::{cache_miss, network_status, OffcacheError, OffcacheResult};
use crate::network::Network;
use crate::request::{CacheMode, Method, Request, Response};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Owns the active generation name and every generation create/delete
pub struct GenerationManager {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    name: String,
}

impl GenerationManager {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            network,
            name: name.into(),
        }
    }

    /// Name of the active generation
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    /// Open `name` and fetch every request into it. Every response must be 2xx.
    ///
    /// Stops at the first failure. Entries stored before the failure stay in
    /// the generation; nothing is rolled back.
    pub async fn create_generation(&self, name: &str, requests: &[Request]) -> OffcacheResult<()> {
        let cache = self.storage.open(name).await?;
        info!("Precaching {} resources into {}", requests.len(), name);

        for request in requests {
            let precache_err = |source: OffcacheError| OffcacheError::Precache {
                url: request.url().to_string(),
                source: Box::new(source),
            };

            let response = self.network.fetch(request).await.map_err(precache_err)?;
            if !response.ok() {
                return Err(precache_err(network_status(request, response.status)));
            }
            cache.put(request, response).await.map_err(precache_err)?;
        }

        debug!("Generation {} populated", name);
        Ok(())
    }

    /// Delete every generation whose name is not in `active`.
    ///
    /// Returns the deleted names. Calling it again with the same names
    /// deletes nothing.
    pub async fn purge_inactive_generations(&self, active: &[&str]) -> OffcacheResult<Vec<String>> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| !active.contains(&name.as_str()))
            .collect();

        try_join_all(stale.iter().map(|name| self.storage.delete(name))).await?;

        for name in &stale {
            info!("Deleted inactive generation {}", name);
        }
        Ok(stale)
    }

    /// Find the stored response for a request in `generation`, or in any
    /// generation if `None`.
    pub async fn lookup(
        &self,
        request: &Request,
        generation: Option<&str>,
    ) -> OffcacheResult<Response> {
        let found = match generation {
            // Looking up a missing generation must not create it
            Some(name) => {
                if self.storage.has(name).await? {
                    self.storage.open(name).await?.match_request(request).await?
                } else {
                    None
                }
            }
            None => self.storage.match_any(request).await?,
        };

        match found {
            Some(response) => {
                debug!("Cache hit for {}", request.url());
                Ok(response)
            }
            None => Err(cache_miss(request, generation)),
        }
    }

    /// Store a response in the active generation, replacing any previous entry
    pub async fn store(&self, request: &Request, response: Response) -> OffcacheResult<()> {
        self.storage
            .open(&self.name)
            .await?
            .put(request, response)
            .await
    }

    /// Fetch a request and store the result in the active generation.
    ///
    /// Only 2xx responses are stored; anything else is rejected and leaves
    /// the existing entry untouched.
    pub async fn add(&self, request: &Request) -> OffcacheResult<()> {
        let response = self.network.fetch(request).await?;
        if !response.ok() {
            return Err(network_status(request, response.status));
        }
        self.store(request, response).await
    }
}

/// Resolve precache URLs against `scope` into cache-bypassing GET requests
pub fn precache_requests(scope: &str, urls: &[String]) -> OffcacheResult<Vec<Request>> {
    let base = Url::parse(scope).map_err(|e| OffcacheError::InvalidUrl {
        url: scope.to_string(),
        reason: e.to_string(),
    })?;

    urls.iter()
        .map(|url| {
            let resolved = base.join(url).map_err(|e| OffcacheError::InvalidUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            Ok(Request::new(Method::Get, resolved).with_cache_mode(CacheMode::Reload))
        })
        .collect()
}
