//! In-process cache storage
//!
//! Implements the storage traits on top of `tokio::sync::RwLock` maps. Used
//! by embedders without a platform cache and throughout the tests.

use crate::cache::storage::{Cache, CacheStorage};
use crate::error::{OffcacheError, OffcacheResult};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A single in-memory named cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<BTreeMap<String, Response>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn match_request(&self, request: &Request) -> OffcacheResult<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }
        Ok(self.entries.read().await.get(&request.cache_key()).cloned())
    }

    async fn put(&self, request: &Request, response: Response) -> OffcacheResult<()> {
        if !request.is_get() {
            return Err(OffcacheError::UnsupportedMethod {
                method: request.method().to_string(),
                url: request.url().to_string(),
            });
        }
        let key = request.cache_key();
        debug!("Storing {} (status {})", key, response.status);
        self.entries.write().await.insert(key, response);
        Ok(())
    }

    async fn keys(&self) -> OffcacheResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

/// In-memory registry of named caches
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<Vec<(String, Arc<MemoryCache>)>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed handle to a named cache, if it exists
    pub async fn get(&self, name: &str) -> Option<Arc<MemoryCache>> {
        self.caches
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| Arc::clone(c))
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> OffcacheResult<Arc<dyn Cache>> {
        let mut caches = self.caches.write().await;
        if let Some((_, cache)) = caches.iter().find(|(n, _)| n == name) {
            return Ok(Arc::clone(cache) as Arc<dyn Cache>);
        }

        debug!("Creating cache {}", name);
        let cache = Arc::new(MemoryCache::new());
        caches.push((name.to_string(), Arc::clone(&cache)));
        Ok(cache)
    }

    async fn has(&self, name: &str) -> OffcacheResult<bool> {
        Ok(self.caches.read().await.iter().any(|(n, _)| n == name))
    }

    async fn keys(&self) -> OffcacheResult<Vec<String>> {
        Ok(self
            .caches
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> OffcacheResult<bool> {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|(n, _)| n != name);
        Ok(caches.len() != before)
    }

    async fn match_any(&self, request: &Request) -> OffcacheResult<Option<Response>> {
        let caches: Vec<Arc<MemoryCache>> = self
            .caches
            .read()
            .await
            .iter()
            .map(|(_, c)| Arc::clone(c))
            .collect();

        for cache in caches {
            if let Some(response) = cache.match_request(request).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
