//! Cache storage abstraction
//!
//! Provides traits for the host's named-cache registry and for a single
//! named cache, so policies and the generation manager can run against
//! a platform cache or the in-memory implementation.

use crate::error::OffcacheResult;
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

/// One named cache (a generation's store)
///
/// Individual operations are atomic per entry. Nothing spans entries.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up the stored response for a request, `None` on miss.
    /// Non-GET requests never match.
    async fn match_request(&self, request: &Request) -> OffcacheResult<Option<Response>>;

    /// Store a response under the request's key, replacing any previous entry
    async fn put(&self, request: &Request, response: Response) -> OffcacheResult<()>;

    /// Keys of every stored entry
    async fn keys(&self) -> OffcacheResult<Vec<String>>;
}

/// Registry of named caches
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a named cache, creating it if it does not exist
    async fn open(&self, name: &str) -> OffcacheResult<Arc<dyn Cache>>;

    /// Check whether a named cache exists
    async fn has(&self, name: &str) -> OffcacheResult<bool>;

    /// Names of all caches, in creation order
    async fn keys(&self) -> OffcacheResult<Vec<String>>;

    /// Delete a named cache, returning whether it existed
    async fn delete(&self, name: &str) -> OffcacheResult<bool>;

    /// Search every cache in creation order; first hit wins
    async fn match_any(&self, request: &Request) -> OffcacheResult<Option<Response>>;
}
