//! Client host abstraction
//!
//! The host owns the pages ("clients") a worker serves. These hooks let the
//! worker take over from a previous instance without a graceful handoff.

use crate::error::OffcacheResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Lifecycle hooks provided by the host runtime
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Replace any running worker without waiting for its clients to close
    async fn skip_waiting(&self) -> OffcacheResult<()>;

    /// Route already-open clients' subsequent requests to this worker
    async fn claim_clients(&self) -> OffcacheResult<()>;
}

/// Host with no client concept; records which hooks were requested
#[derive(Debug, Default)]
pub struct DetachedHost {
    skipped_waiting: AtomicBool,
    claimed: AtomicBool,
}

impl DetachedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped_waiting(&self) -> bool {
        self.skipped_waiting.load(Ordering::SeqCst)
    }

    pub fn claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientHost for DetachedHost {
    async fn skip_waiting(&self) -> OffcacheResult<()> {
        debug!("skip_waiting requested");
        self.skipped_waiting.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> OffcacheResult<()> {
        debug!("claim_clients requested");
        self.claimed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
