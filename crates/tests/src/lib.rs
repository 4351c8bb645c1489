//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试（Consul watch 实际输出）
//! - 端到端测试：HTTP 推送 -> Ingress -> Sentry -> 回调/订阅通道
//! - 配置文件 -> Sentry 装配

/// Watch handler bodies captured from Consul
#[cfg(test)]
mod fixtures {
    pub const KEY: &str = r#"{"Key":"foo/bar/baz","CreateIndex":1793,"ModifyIndex":1793,"LockIndex":0,"Flags":0,"Value":"aGV5","Session":""}"#;

    pub const KEY_PREFIX: &str = r#"[{"Key":"foo/bar","CreateIndex":1796,"ModifyIndex":1796,"LockIndex":0,"Flags":0,"Value":"TU9BUg==","Session":""},{"Key":"foo/baz","CreateIndex":1795,"ModifyIndex":1795,"LockIndex":0,"Flags":0,"Value":"YXNkZg==","Session":""},{"Key":"foo/test","CreateIndex":1793,"ModifyIndex":1793,"LockIndex":0,"Flags":0,"Value":"aGV5","Session":""}]"#;

    pub const SERVICES: &str = r#"{"consul":[],"redis":[],"web":[]}"#;

    pub const NODES: &str = r#"[{"Node":"nyc1-consul-1","Address":"192.241.159.115"},{"Node":"nyc1-consul-2","Address":"192.241.158.205"},{"Node":"nyc1-consul-3","Address":"198.199.77.133"},{"Node":"nyc1-worker-1","Address":"162.243.162.228"},{"Node":"nyc1-worker-2","Address":"162.243.162.226"},{"Node":"nyc1-worker-3","Address":"162.243.162.229"}]"#;

    pub const SERVICE: &str = r#"[{"Node":{"Node":"foobar","Address":"10.1.10.12"},"Service":{"ID":"redis","Service":"redis","Tags":null,"Port":8000},"Checks":[{"Node":"foobar","CheckID":"service:redis","Name":"Service 'redis' check","Status":"passing","Notes":"","Output":"","ServiceID":"redis","ServiceName":"redis"},{"Node":"foobar","CheckID":"serfHealth","Name":"Serf Health Status","Status":"passing","Notes":"","Output":"","ServiceID":"","ServiceName":""}]}]"#;

    pub const CHECKS: &str = r#"[{"Node":"foobar","CheckID":"service:redis","Name":"Service 'redis' check","Status":"passing","Notes":"","Output":"","ServiceID":"redis","ServiceName":"redis"}]"#;

    pub const EVENT: &str = r#"[{"ID":"f07f3fcc-4b7d-3a7c-6d1e-cf414039fcee","Name":"web-deploy","Payload":"MTYwOTAzMA==","NodeFilter":"","ServiceFilter":"","TagFilter":"","Version":1,"LTime":18}]"#;
}

#[cfg(test)]
mod contract_tests {
    use super::fixtures;
    use decoder::{decode, decode_any, ChecksWatch, EventWatch, KeyPrefixWatch, ServiceWatch};

    #[test]
    fn test_key_prefix_snapshot() {
        let kvs = decode::<KeyPrefixWatch>(fixtures::KEY_PREFIX.as_bytes()).unwrap();
        assert_eq!(kvs.len(), 3);
        assert_eq!(kvs[0].key, "foo/bar");
        assert_eq!(kvs[0].value, b"MOAR");
        assert_eq!(kvs[1].value, b"asdf");
        assert_eq!(kvs[2].modify_index, 1793);
    }

    #[test]
    fn test_service_snapshot() {
        let entries = decode::<ServiceWatch>(fixtures::SERVICE.as_bytes()).unwrap();
        assert_eq!(entries[0].node.node, "foobar");
        assert_eq!(entries[0].service.port, 8000);
        assert!(entries[0].service.tags.is_empty());
        assert_eq!(entries[0].checks[1].check_id, "serfHealth");
    }

    #[test]
    fn test_checks_and_event_snapshot() {
        let checks = decode::<ChecksWatch>(fixtures::CHECKS.as_bytes()).unwrap();
        assert_eq!(checks[0].service_name, "redis");

        let events = decode::<EventWatch>(fixtures::EVENT.as_bytes()).unwrap();
        assert_eq!(events[0].name, "web-deploy");
        assert_eq!(events[0].payload, b"1609030");
        assert_eq!(events[0].l_time, 18);
    }

    #[test]
    fn test_every_fixture_decodes_untyped() {
        use contracts::EventKind;
        let cases = [
            (EventKind::Key, fixtures::KEY, 1),
            (EventKind::KeyPrefix, fixtures::KEY_PREFIX, 3),
            (EventKind::Services, fixtures::SERVICES, 3),
            (EventKind::Nodes, fixtures::NODES, 6),
            (EventKind::Service, fixtures::SERVICE, 1),
            (EventKind::Checks, fixtures::CHECKS, 1),
            (EventKind::Event, fixtures::EVENT, 1),
        ];
        for (kind, body, records) in cases {
            let payload = decode_any(kind, body.as_bytes()).unwrap();
            assert_eq!(payload.kind(), kind);
            assert_eq!(payload.len(), records, "{kind}");
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::RequestContext;
    use dispatcher::{ChecksWatch, Sentry, SentryBuilder};
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    use super::fixtures;

    /// Running sentry bound to an ephemeral port
    struct Harness {
        addr: SocketAddr,
        stop: oneshot::Sender<()>,
        server: JoinHandle<Result<(), ingress::IngressError>>,
        client: reqwest::Client,
    }

    impl Harness {
        async fn start(sentry: Arc<Sentry>) -> Self {
            let listener = ingress::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (stop, stopped) = oneshot::channel::<()>();
            let server = tokio::spawn(ingress::serve_on(listener, sentry, async {
                let _ = stopped.await;
            }));
            Self {
                addr,
                stop,
                server,
                client: reqwest::Client::new(),
            }
        }

        async fn push(&self, route: &str, token: &str, index: Option<u64>, body: &'static str) -> u16 {
            let mut request = self
                .client
                .post(format!("http://{}{}", self.addr, route))
                .header("type", token)
                .body(body);
            if let Some(index) = index {
                request = request.header("X-Consul-Index", index.to_string());
            }
            request.send().await.unwrap().status().as_u16()
        }

        async fn shutdown(self) {
            self.stop.send(()).unwrap();
            self.server.await.unwrap().unwrap();
        }
    }

    /// Every kind pushed over HTTP reaches its callback and its channel
    #[tokio::test]
    async fn test_e2e_every_kind_over_http() {
        let sentry = Arc::new(Sentry::new());
        let calls = Arc::new(AtomicUsize::new(0));

        macro_rules! count_calls {
            ($($set:ident),*) => {$(
                let c = Arc::clone(&calls);
                sentry.$set(move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                });
            )*};
        }
        count_calls!(
            set_key_func,
            set_key_prefix_func,
            set_services_func,
            set_nodes_func,
            set_service_func,
            set_checks_func,
            set_event_func
        );

        let mut key = sentry.key_channel();
        let mut key_prefix = sentry.key_prefix_channel();
        let mut services = sentry.services_channel();
        let mut nodes = sentry.nodes_channel();
        let mut service = sentry.service_channel();
        let mut checks = sentry.checks_channel();
        let mut event = sentry.event_channel();

        let harness = Harness::start(Arc::clone(&sentry)).await;
        for (token, body) in [
            ("key", fixtures::KEY),
            ("keyprefix", fixtures::KEY_PREFIX),
            ("services", fixtures::SERVICES),
            ("nodes", fixtures::NODES),
            ("service", fixtures::SERVICE),
            ("checks", fixtures::CHECKS),
            ("event", fixtures::EVENT),
        ] {
            assert_eq!(harness.push("/", token, None, body).await, 200, "{token}");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 7);
        assert_eq!(key.recv().await.unwrap().as_ref().as_ref().unwrap().key, "foo/bar/baz");
        assert_eq!(key_prefix.recv().await.unwrap()[0].key, "foo/bar");
        assert!(services.recv().await.unwrap().contains_key("consul"));
        assert_eq!(nodes.recv().await.unwrap()[0].node, "nyc1-consul-1");
        assert_eq!(service.recv().await.unwrap()[0].node.node, "foobar");
        assert_eq!(checks.recv().await.unwrap()[0].node, "foobar");
        assert_eq!(
            event.recv().await.unwrap()[0].id,
            "f07f3fcc-4b7d-3a7c-6d1e-cf414039fcee"
        );

        harness.shutdown().await;
    }

    /// A deleted key arrives as `null` and is delivered as `None`
    #[tokio::test]
    async fn test_e2e_key_deletion() {
        let sentry = Arc::new(Sentry::new());
        let mut key = sentry.key_channel();

        let harness = Harness::start(Arc::clone(&sentry)).await;
        assert_eq!(harness.push("/", "key", Some(1793), fixtures::KEY).await, 200);
        assert_eq!(harness.push("/", "key", Some(1794), "null").await, 200);
        harness.shutdown().await;

        assert!(key.recv().await.unwrap().is_some());
        assert!(key.recv().await.unwrap().is_none());
    }

    /// Unknown type carries the peer address to the error callback
    #[tokio::test]
    async fn test_e2e_unknown_type_has_remote_addr() {
        let sentry = Arc::new(Sentry::new());
        let seen: Arc<Mutex<Vec<RequestContext>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        sentry.set_error_func(move |ctx| seen_cb.lock().unwrap().push(ctx.clone()));

        let harness = Harness::start(Arc::clone(&sentry)).await;
        assert_eq!(harness.push("/", "bogus", Some(3), "{}").await, 200);
        harness.shutdown().await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let remote = seen[0].remote_addr.expect("remote address");
        assert!(remote.ip().is_loopback());
        assert_eq!(seen[0].index, Some(3));
    }

    /// Statuses over a real socket
    #[tokio::test]
    async fn test_e2e_statuses() {
        let sentry = Arc::new(
            SentryBuilder::new()
                .duplicate_policy(contracts::DuplicatePolicy::SuppressRepeatedIndex)
                .build(),
        );
        let nodes = sentry.nodes_channel();

        let harness = Harness::start(Arc::clone(&sentry)).await;
        assert_eq!(harness.push("/", "nodes", Some(1), "").await, 400);
        assert_eq!(harness.push("/", "nodes", Some(1), "{").await, 500);
        assert_eq!(harness.push("/", "nodes", None, fixtures::NODES).await, 502);
        assert_eq!(harness.push("/", "nodes", Some(1), fixtures::NODES).await, 200);
        assert_eq!(harness.push("/", "nodes", Some(1), fixtures::NODES).await, 200);
        assert_eq!(harness.push("/", "nodes", Some(2), fixtures::NODES).await, 200);
        harness.shutdown().await;

        assert_eq!(nodes.len(), 2);
    }

    /// A subscriber that never reads does not hold up the others
    #[tokio::test]
    async fn test_e2e_slow_subscriber_isolated() {
        let sentry = Arc::new(SentryBuilder::new().queue_capacity(2).build());
        let stalled = sentry.checks_channel();
        let mut reader = sentry.checks_channel();
        let reader_id = reader.id();

        let harness = Harness::start(Arc::clone(&sentry)).await;
        let consumer = tokio::spawn(async move {
            let mut received = 0;
            while received < 5 {
                if reader.recv().await.is_none() {
                    break;
                }
                received += 1;
            }
            received
        });

        for index in 0..5 {
            let status = tokio::time::timeout(
                Duration::from_secs(5),
                harness.push("/", "checks", Some(index), fixtures::CHECKS),
            )
            .await
            .expect("request must not block");
            assert_eq!(status, 200);
            tokio::task::yield_now().await;
        }

        assert_eq!(stalled.len(), 2);
        let snapshot = sentry
            .metrics()
            .into_iter()
            .find(|(_, id, _)| *id == stalled.id())
            .map(|(_, _, m)| m)
            .unwrap();
        assert_eq!(snapshot.delivered_count, 2);
        assert_eq!(snapshot.dropped_count, 3);

        harness.shutdown().await;
        // Dropping the handle ends the consumer's stream
        assert!(sentry.unsubscribe::<ChecksWatch>(reader_id));
        assert!(consumer.await.unwrap() >= 2);
    }

    /// Config file -> sentry -> custom route
    #[tokio::test]
    async fn test_e2e_config_route() {
        let blueprint = ConfigLoader::load_from_str(
            r#"
[server]
address = "127.0.0.1:0"
route = "/consul/watch"

[delivery]
queue_capacity = 4
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        let sentry = Arc::new(SentryBuilder::from_blueprint(blueprint).build());
        let sub = sentry.services_channel();

        let harness = Harness::start(Arc::clone(&sentry)).await;
        assert_eq!(harness.push("/", "services", None, fixtures::SERVICES).await, 404);
        assert_eq!(
            harness
                .push("/consul/watch", "SERVICES", None, fixtures::SERVICES)
                .await,
            200
        );
        harness.shutdown().await;

        assert_eq!(sub.len(), 1);
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use dispatcher::Sentry;
    use tower::ServiceExt;

    use super::fixtures;

    /// Callback sees the notification before the subscriber can
    #[tokio::test]
    async fn test_callback_precedes_channel() {
        let sentry = Arc::new(Sentry::new());
        let sub = Arc::new(std::sync::Mutex::new(sentry.key_channel()));
        let observed = Arc::new(std::sync::Mutex::new(None));

        let (sub_cb, observed_cb) = (Arc::clone(&sub), Arc::clone(&observed));
        sentry.set_key_func(move |_| {
            *observed_cb.lock().unwrap() = Some(sub_cb.lock().unwrap().len());
        });

        let response = ingress::router(Arc::clone(&sentry))
            .oneshot(
                Request::post("/")
                    .header("type", "key")
                    .body(Body::from(fixtures::KEY))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*observed.lock().unwrap(), Some(0));
        assert_eq!(sub.lock().unwrap().len(), 1);
    }
}
