//! Integration tests for offcache

mod worker_tests {
    use async_trait::async_trait;
    use offcache::cache::{Cache, CacheStorage, MemoryCacheStorage};
    use offcache::config::schema::Strategy;
    use offcache::config::Config;
    use offcache::network::Network;
    use offcache::policy::ResolutionSource;
    use offcache::worker::DetachedHost;
    use offcache::{
        FetchDisposition, OffcacheError, OffcacheResult, OfflineWorker, Request, Response,
        WorkerState,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const SCOPE: &str = "https://app.test/";

    /// Network serving a mutable url -> (status, body) table.
    /// Bodies get a per-call sequence number appended when `numbered` is set.
    #[derive(Default)]
    struct SiteNetwork {
        pages: Mutex<HashMap<String, (u16, String)>>,
        delay: Option<Duration>,
        numbered: bool,
        calls: AtomicUsize,
    }

    impl SiteNetwork {
        fn with_pages(pages: &[(&str, u16, &str)]) -> Self {
            let network = Self::default();
            for (url, status, body) in pages {
                network.set(url, *status, body);
            }
            network
        }

        fn set(&self, url: &str, status: u16, body: &str) {
            self.pages
                .lock()
                .unwrap()
                .insert(url.to_string(), (status, body.to_string()));
        }

        fn go_offline(&self) {
            self.pages.lock().unwrap().clear();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Network for SiteNetwork {
        async fn fetch(&self, request: &Request) -> OffcacheResult<Response> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let page = self.pages.lock().unwrap().get(request.url().as_str()).cloned();
            match page {
                Some((status, body)) if self.numbered => {
                    Ok(Response::new(status, format!("{}#{}", body, n)))
                }
                Some((status, body)) => Ok(Response::new(status, body)),
                None => Err(OffcacheError::transport(request, "network unreachable")),
            }
        }
    }

    fn config(name: &str, precache: &[&str]) -> Config {
        let mut config = Config::default();
        config.cache.name = name.to_string();
        config.cache.scope = SCOPE.to_string();
        config.cache.precache = precache.iter().map(|s| s.to_string()).collect();
        config
    }

    fn worker(
        config: &Config,
        storage: &Arc<MemoryCacheStorage>,
        network: &Arc<SiteNetwork>,
    ) -> OfflineWorker {
        OfflineWorker::from_config(
            config,
            storage.clone(),
            network.clone(),
            Arc::new(DetachedHost::new()),
        )
        .unwrap()
    }

    fn get(url: &str) -> Request {
        Request::get(url).unwrap()
    }

    async fn settle(disposition: FetchDisposition) -> (Response, ResolutionSource) {
        match disposition {
            FetchDisposition::Respond {
                resolution,
                refresh,
            } => {
                if let Some(handle) = refresh {
                    handle.await.unwrap();
                }
                (resolution.response, resolution.source)
            }
            FetchDisposition::PassThrough => panic!("request was not intercepted"),
        }
    }

    #[tokio::test]
    async fn precached_page_served_offline() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[
            ("https://app.test/index.html", 200, "<html>index</html>"),
            ("https://app.test/", 200, "<html>root</html>"),
        ]));
        let worker = worker(&config("v1", &["index.html", "./"]), &storage, &network);

        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        network.go_offline();

        let (response, source) = settle(worker.handle_fetch(get("https://app.test/")).await).await;
        assert_eq!(source, ResolutionSource::Cache);
        assert_eq!(response.body_text(), "<html>root</html>");
    }

    #[tokio::test]
    async fn unknown_page_offline_gets_placeholder() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::default());
        let worker = worker(&config("v1", &[]), &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let (response, source) =
            settle(worker.handle_fetch(get("https://app.test/logo.png")).await).await;

        assert_eq!(source, ResolutionSource::Fallback);
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("image/svg+xml"));
        assert!(response.body_text().contains("Network error"));
    }

    #[tokio::test]
    async fn generation_replacement_purges_old_entries() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[
            ("https://app.test/a", 200, "A"),
            ("https://app.test/b", 200, "B"),
            ("https://app.test/c", 200, "C"),
        ]));

        let v1 = worker(&config("v1", &["a", "b"]), &storage, &network);
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        let v2 = worker(&config("v2", &["c"]), &storage, &network);
        v2.install().await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);

        let purged = v2.activate().await.unwrap();
        assert_eq!(purged, vec!["v1"]);
        assert_eq!(storage.keys().await.unwrap(), vec!["v2"]);

        let entries = storage.get("v2").await.unwrap().keys().await.unwrap();
        assert_eq!(entries, vec!["https://app.test/c"]);
        assert!(storage.match_any(&get("https://app.test/a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_install_keeps_previous_generation() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[("https://app.test/a", 200, "A")]));

        let v1 = worker(&config("v1", &["a"]), &storage, &network);
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        let v2 = worker(&config("v2", &["a", "missing"]), &storage, &network);
        let err = v2.install().await.unwrap_err();
        assert!(err.to_string().contains("Failed to precache https://app.test/missing"));
        assert_eq!(v2.state().await, WorkerState::Redundant);

        network.go_offline();
        let (response, _) = settle(v1.handle_fetch(get("https://app.test/a")).await).await;
        assert_eq!(response.body_text(), "A");
        assert!(storage.has("v1").await.unwrap());
    }

    #[tokio::test]
    async fn not_found_during_precache_fails_install() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[("https://app.test/a", 200, "A")]));

        let v1 = worker(&config("v1", &["a"]), &storage, &network);
        v1.install().await.unwrap();
        v1.activate().await.unwrap();

        network.set("https://app.test/b", 404, "not found");
        let v2 = worker(&config("v2", &["a", "b"]), &storage, &network);
        let err = v2.install().await.unwrap_err();
        assert!(err.to_string().contains("responded with status 404"));
        assert_eq!(v2.state().await, WorkerState::Redundant);
        assert!(storage
            .get("v2")
            .await
            .unwrap()
            .match_request(&get("https://app.test/b"))
            .await
            .unwrap()
            .is_none());

        network.go_offline();
        let (response, source) = settle(v1.handle_fetch(get("https://app.test/a")).await).await;
        assert_eq!(source, ResolutionSource::Cache);
        assert_eq!(response.body_text(), "A");
    }

    #[tokio::test]
    async fn refresh_not_found_keeps_cached_page() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[("https://app.test/a", 200, "good")]));
        let worker = worker(&config("v1", &["a"]), &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        network.set("https://app.test/a", 404, "not found");
        let (response, source) = settle(worker.handle_fetch(get("https://app.test/a")).await).await;

        assert_eq!(source, ResolutionSource::Cache);
        assert_eq!(response.body_text(), "good");
        let stored = worker
            .manager()
            .lookup(&get("https://app.test/a"), Some("v1"))
            .await
            .unwrap();
        assert_eq!(stored.status, 200);
        assert_eq!(stored.body_text(), "good");
    }

    #[tokio::test]
    async fn refresh_updates_entry_after_response() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[("https://app.test/a", 200, "old")]));
        let worker = worker(&config("v1", &["a"]), &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        network.set("https://app.test/a", 200, "new");
        let (response, source) = settle(worker.handle_fetch(get("https://app.test/a")).await).await;
        assert_eq!(source, ResolutionSource::Cache);
        assert!(response.body_text() == "old" || response.body_text() == "new");

        let stored = worker
            .manager()
            .lookup(&get("https://app.test/a"), Some("v1"))
            .await
            .unwrap();
        assert_eq!(stored.body_text(), "new");
    }

    #[tokio::test]
    async fn refresh_failure_does_not_affect_response() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[("https://app.test/a", 200, "A")]));
        let worker = worker(&config("v1", &["a"]), &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        network.set("https://app.test/a", 503, "down");
        let (response, source) = settle(worker.handle_fetch(get("https://app.test/a")).await).await;

        assert_eq!(source, ResolutionSource::Cache);
        assert_eq!(response.body_text(), "A");
        let stored = worker
            .manager()
            .lookup(&get("https://app.test/a"), Some("v1"))
            .await
            .unwrap();
        assert_eq!(stored.body_text(), "A");
    }

    #[tokio::test]
    async fn refresh_can_be_disabled() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::with_pages(&[("https://app.test/a", 200, "A")]));
        let mut cfg = config("v1", &[]);
        cfg.fetch.refresh = false;
        let worker = worker(&cfg, &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let (_, source) = settle(worker.handle_fetch(get("https://app.test/a")).await).await;

        assert_eq!(source, ResolutionSource::Network);
        assert_eq!(network.calls(), 1);
        assert!(storage.get("v1").await.unwrap().is_empty().await);
    }

    #[tokio::test]
    async fn write_back_and_refresh_race_leaves_consistent_entry() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork {
            numbered: true,
            ..SiteNetwork::default()
        });
        network.set("https://app.test/feed", 200, "feed");
        let mut cfg = config("v1", &[]);
        cfg.fetch.strategy = Strategy::PreferNetwork;
        let worker = worker(&cfg, &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let (response, source) =
            settle(worker.handle_fetch(get("https://app.test/feed")).await).await;
        assert_eq!(source, ResolutionSource::NetworkCached);
        assert_eq!(network.calls(), 2);

        let stored = worker
            .manager()
            .lookup(&get("https://app.test/feed"), Some("v1"))
            .await
            .unwrap();
        assert_eq!(stored.status, 200);
        let body = stored.body_text();
        assert!(body == "feed#0" || body == "feed#1", "unexpected entry {}", body);
        assert!(response.body_text().starts_with("feed#"));
    }

    #[tokio::test(start_paused = true)]
    async fn prefer_network_timeout_serves_cache() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork {
            delay: Some(Duration::from_millis(500)),
            ..SiteNetwork::default()
        });
        network.set("https://app.test/a", 200, "cached");
        let mut cfg = config("v1", &["a"]);
        cfg.fetch.strategy = Strategy::PreferNetwork;
        cfg.fetch.timeout_ms = Some(100);
        cfg.fetch.refresh = false;
        let worker = worker(&cfg, &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        assert_eq!(worker.policy_name(), "prefer-network");

        network.set("https://app.test/a", 200, "late");
        let (response, source) = settle(worker.handle_fetch(get("https://app.test/a")).await).await;

        assert_eq!(source, ResolutionSource::Cache);
        assert_eq!(response.body_text(), "cached");
    }

    #[tokio::test]
    async fn post_is_never_intercepted() {
        let storage = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(SiteNetwork::default());
        let worker = worker(&config("v1", &[]), &storage, &network);
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let post = Request::parse("POST", "https://app.test/api/save").unwrap();
        let disposition = worker.handle_fetch(post).await;

        assert!(disposition.is_pass_through());
        assert_eq!(network.calls(), 0);
    }
}
