//! Offline worker: lifecycle events and fetch interception
//!
//! The host glue forwards three kinds of events here:
//! - install: take over from the previous worker, then precache
//! - activate: claim open clients, then purge old generations
//! - fetch: resolve GET requests through the configured policy and refresh
//!   the cached entry in the background

mod host;
mod state;

pub use host::{ClientHost, DetachedHost};
pub use state::WorkerState;

use crate::cache::{precache_requests, CacheStorage, GenerationManager};
use crate::config::Config;
use crate::error::{OffcacheError, OffcacheResult};
use crate::network::Network;
use crate::policy::{create_policy, Resolution, ResolutionPolicy};
use crate::request::{Request, Response};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the host should do with an intercepted request
#[derive(Debug)]
pub enum FetchDisposition {
    /// Not intercepted; the host's default handling applies
    PassThrough,
    /// Answer with `resolution.response`. `refresh`, when present, is the
    /// background work the host should keep alive until it settles.
    Respond {
        resolution: Resolution,
        refresh: Option<JoinHandle<()>>,
    },
}

impl FetchDisposition {
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }

    /// The response to hand back, if the request was intercepted
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::PassThrough => None,
            Self::Respond { resolution, .. } => Some(&resolution.response),
        }
    }
}

/// Binds lifecycle and fetch events to the generation manager and policy
pub struct OfflineWorker {
    manager: Arc<GenerationManager>,
    policy: Box<dyn ResolutionPolicy>,
    host: Arc<dyn ClientHost>,
    precache: Vec<Request>,
    refresh: bool,
    state: RwLock<WorkerState>,
}

impl OfflineWorker {
    pub fn new(
        manager: Arc<GenerationManager>,
        policy: Box<dyn ResolutionPolicy>,
        host: Arc<dyn ClientHost>,
        precache: Vec<Request>,
    ) -> Self {
        Self {
            manager,
            policy,
            host,
            precache,
            refresh: true,
            state: RwLock::new(WorkerState::Pending),
        }
    }

    /// Build a worker from configuration and host collaborators
    pub fn from_config(
        config: &Config,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        host: Arc<dyn ClientHost>,
    ) -> OffcacheResult<Self> {
        let manager = Arc::new(GenerationManager::new(
            storage,
            network,
            config.cache.name.clone(),
        ));
        let precache = precache_requests(&config.cache.scope, &config.cache.precache)?;

        Ok(Self::new(manager, create_policy(&config.fetch), host, precache)
            .with_refresh(config.fetch.refresh))
    }

    /// Enable or disable the background refresh of intercepted GETs
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn manager(&self) -> &Arc<GenerationManager> {
        &self.manager
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Handle the install event.
    ///
    /// Precache failure leaves the worker `Redundant` and is returned, so the
    /// previous generation stays in service.
    pub async fn install(&self) -> OffcacheResult<()> {
        self.transition(WorkerState::can_install, "install", WorkerState::Installing)
            .await?;

        if let Err(e) = self.host.skip_waiting().await {
            warn!("skip_waiting failed: {}", e);
        }

        match self
            .manager
            .create_generation(self.manager.name(), &self.precache)
            .await
        {
            Ok(()) => {
                self.set_state(WorkerState::Installed).await;
                Ok(())
            }
            Err(e) => {
                warn!("Install of {} failed: {}", self.manager.name(), e);
                self.set_state(WorkerState::Redundant).await;
                Err(e)
            }
        }
    }

    /// Handle the activate event, returning the purged generation names.
    ///
    /// The worker ends up `Active` even when claiming or purging fails; the
    /// failure is still returned to the host.
    pub async fn activate(&self) -> OffcacheResult<Vec<String>> {
        self.transition(WorkerState::can_activate, "activate", WorkerState::Activating)
            .await?;

        let result = match self.host.claim_clients().await {
            Ok(()) => {
                self.manager
                    .purge_inactive_generations(&[self.manager.name()])
                    .await
            }
            Err(e) => Err(e),
        };

        self.set_state(WorkerState::Active).await;
        match &result {
            Ok(purged) => info!(
                "Generation {} active ({} purged)",
                self.manager.name(),
                purged.len()
            ),
            Err(e) => warn!("Activation of {} incomplete: {}", self.manager.name(), e),
        }
        result
    }

    /// Handle a fetch event
    pub async fn handle_fetch(&self, request: Request) -> FetchDisposition {
        if !request.is_get() {
            debug!("Passing through {} {}", request.method(), request.url());
            return FetchDisposition::PassThrough;
        }

        let state = self.state().await;
        if !state.is_serving() {
            debug!("Worker {}, passing through {}", state, request.url());
            return FetchDisposition::PassThrough;
        }

        let refresh = self.refresh.then(|| self.spawn_refresh(request.clone()));
        let resolution = self.policy.resolve(&self.manager, &request).await;
        debug!(
            "{} resolved from {} via {}",
            request.url(),
            resolution.source,
            self.policy.name()
        );

        FetchDisposition::Respond {
            resolution,
            refresh,
        }
    }

    /// Re-store a request in the active generation without blocking the response
    fn spawn_refresh(&self, request: Request) -> JoinHandle<()> {
        let manager = Arc::clone(&self.manager);
        tokio::spawn(async move {
            if let Err(e) = manager.add(&request).await {
                warn!("Background refresh of {} failed: {}", request.url(), e);
            }
        })
    }

    async fn transition(
        &self,
        allowed: fn(&WorkerState) -> bool,
        action: &'static str,
        next: WorkerState,
    ) -> OffcacheResult<()> {
        let mut state = self.state.write().await;
        if !allowed(&*state) {
            return Err(OffcacheError::InvalidTransition {
                action,
                state: (*state).to_string(),
            });
        }
        debug!("Worker {} -> {}", *state, next);
        *state = next;
        Ok(())
    }

    async fn set_state(&self, next: WorkerState) {
        *self.state.write().await = next;
    }
}
