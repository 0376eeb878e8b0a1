//! HTTP fetch primitive backed by a blocking `ureq` agent

use crate::config::schema::NetworkConfig;
use crate::error::{OffcacheError, OffcacheResult};
use crate::network::Network;
use crate::request::{CacheMode, Method, Request, Response};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Network implementation that performs real HTTP requests
pub struct HttpNetwork {
    agent: ureq::Agent,
    user_agent: String,
    max_body_bytes: u64,
}

impl HttpNetwork {
    pub fn new(config: &NetworkConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.request_timeout_secs)))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            user_agent: config.user_agent.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn fetch_blocking(
        agent: &ureq::Agent,
        user_agent: &str,
        max_body_bytes: u64,
        request: &Request,
    ) -> OffcacheResult<Response> {
        let url = request.url().as_str();
        let mut builder = match request.method() {
            Method::Get => agent.get(url),
            Method::Head => agent.head(url),
            other => {
                return Err(OffcacheError::UnsupportedMethod {
                    method: other.to_string(),
                    url: url.to_string(),
                })
            }
        };

        builder = builder.header("User-Agent", user_agent);
        if request.cache_mode() == CacheMode::Reload {
            builder = builder
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache");
        }

        let mut response = builder
            .call()
            .map_err(|e| OffcacheError::transport(request, e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(max_body_bytes)
            .read_to_vec()
            .map_err(|e| OffcacheError::transport(request, e.to_string()))?;

        debug!("{} {} -> {}", request.method(), url, status);
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> OffcacheResult<Response> {
        // Run blocking HTTP call off the async runtime
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let max_body_bytes = self.max_body_bytes;
        let request = request.clone();

        tokio::task::spawn_blocking(move || {
            Self::fetch_blocking(&agent, &user_agent, max_body_bytes, &request)
        })
            .await
            .map_err(|e| OffcacheError::Internal(format!("fetch task panicked: {}", e)))?
    }
}
