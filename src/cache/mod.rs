//! Generation-scoped response cache
//!
//! Provides the storage traits the host implements, an in-memory
//! implementation, and the manager that owns generation lifecycle.
//!
//! # Generation Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | Install | Active generation opened and precached |
//! | Activate | Every other generation deleted |
//! | Fetch | Entries in the active generation read or overwritten |

pub mod generation;
pub mod memory;
pub mod storage;

pub use generation::{precache_requests, GenerationManager};
pub use memory::{MemoryCache, MemoryCacheStorage};
pub use storage::{Cache, CacheStorage};
