//! offcache - offline-caching request proxy
//!
//! Serves intercepted GET requests from a versioned cache generation, falls
//! back to the network or to a placeholder image, and replaces the whole
//! generation when a new deployment is installed and activated.

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod network;
pub mod policy;
pub mod request;
pub mod worker;

pub use error::{OffcacheError, OffcacheResult};
pub use request::{CacheMode, Method, Request, Response};
pub use worker::{FetchDisposition, OfflineWorker, WorkerState};
