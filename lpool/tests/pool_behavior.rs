use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::join_all;
use lmodel::ToolContent;
use lpool::{
    CallToolResult, ConnectionPool, PoolError, PoolErrorKind, PoolFuture, PoolHooks,
    ProtocolError, ProviderConnector, ProviderIdentity, ProviderSession, RemoteToolSpec,
};
use lresource::ResourceCache;
use ltooling::{CallerMetadata, Tool, ToolExecutionContext};
use serde_json::{Value, json};

struct FakeSession {
    provider: String,
    closed: Arc<AtomicUsize>,
}

impl ProviderSession for FakeSession {
    fn list_tools<'a>(&'a self) -> PoolFuture<'a, Result<Vec<RemoteToolSpec>, ProtocolError>> {
        Box::pin(async move {
            Ok(vec![RemoteToolSpec {
                name: "ping".to_string(),
                description: Some(format!("Ping {}", self.provider)),
                input_schema: json!({ "type": "object" }),
            }])
        })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        _arguments: Value,
        _meta: &'a CallerMetadata,
    ) -> PoolFuture<'a, Result<CallToolResult, ProtocolError>> {
        Box::pin(async move {
            Ok(CallToolResult::success(vec![ToolContent::text(format!(
                "{} answered {name}",
                self.provider
            ))]))
        })
    }

    fn close<'a>(&'a self) -> PoolFuture<'a, ()> {
        Box::pin(async move {
            self.closed.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Counts handshakes per provider; providers listed in `failing` refuse
/// until they are removed from it.
#[derive(Default)]
struct FakeConnector {
    handshakes: Mutex<HashMap<String, usize>>,
    failing: Mutex<Vec<String>>,
    closed: Arc<AtomicUsize>,
}

impl FakeConnector {
    fn handshakes(&self, provider: &str) -> usize {
        self.handshakes
            .lock()
            .expect("handshakes lock")
            .get(provider)
            .copied()
            .unwrap_or_default()
    }

    fn fail(&self, provider: &str) {
        self.failing.lock().expect("failing lock").push(provider.to_string());
    }

    fn heal(&self) {
        self.failing.lock().expect("failing lock").clear();
    }
}

impl ProviderConnector for FakeConnector {
    fn connect<'a>(
        &'a self,
        identity: &'a ProviderIdentity,
    ) -> PoolFuture<'a, Result<Arc<dyn ProviderSession>, ProtocolError>> {
        Box::pin(async move {
            *self
                .handshakes
                .lock()
                .expect("handshakes lock")
                .entry(identity.name.clone())
                .or_default() += 1;

            tokio::time::sleep(Duration::from_millis(30)).await;

            if self.failing.lock().expect("failing lock").contains(&identity.name) {
                return Err(ProtocolError::connect("connection refused"));
            }

            Ok(Arc::new(FakeSession {
                provider: identity.name.clone(),
                closed: Arc::clone(&self.closed),
            }) as Arc<dyn ProviderSession>)
        })
    }
}

#[derive(Default)]
struct CountingHooks {
    reused: AtomicUsize,
    failures: AtomicUsize,
}

impl PoolHooks for CountingHooks {
    fn on_connection_reused(&self, _provider: &str) {
        self.reused.fetch_add(1, Ordering::SeqCst);
    }

    fn on_connect_failure(&self, _provider: &str, _error: &PoolError, _elapsed: Duration) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

fn identity(name: &str) -> ProviderIdentity {
    ProviderIdentity::new(name, format!("http://{name}.invalid/mcp"))
}

fn pool_with(connector: Arc<FakeConnector>) -> ConnectionPool {
    ConnectionPool::new(connector, Arc::new(ResourceCache::default()))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_handshake() {
    let connector = Arc::new(FakeConnector::default());
    let pool = pool_with(Arc::clone(&connector));

    let callers = (0..16).map(|_| {
        let pool = pool.clone();
        tokio::spawn(async move { pool.ensure_connected(&[identity("web")]).await })
    });
    for outcome in join_all(callers).await {
        outcome.expect("task").expect("connected");
    }

    assert_eq!(connector.handshakes("web"), 1);
    assert!(pool.is_connected("web"));
}

#[tokio::test]
async fn established_provider_is_reused_across_turns() {
    let connector = Arc::new(FakeConnector::default());
    let hooks = Arc::new(CountingHooks::default());
    let pool = ConnectionPool::builder(
        Arc::clone(&connector) as Arc<dyn ProviderConnector>,
        Arc::new(ResourceCache::default()),
    )
    .hooks(Arc::clone(&hooks) as Arc<dyn PoolHooks>)
    .build();

    pool.ensure_connected(&[identity("web")]).await.expect("first turn");
    pool.ensure_connected(&[identity("web")]).await.expect("second turn");

    assert_eq!(connector.handshakes("web"), 1);
    assert_eq!(hooks.reused.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failure_is_reported_in_request_order_and_isolated() {
    let connector = Arc::new(FakeConnector::default());
    connector.fail("rag");
    connector.fail("trivia");
    let pool = pool_with(Arc::clone(&connector));

    let error = pool
        .ensure_connected(&[identity("web"), identity("rag"), identity("trivia")])
        .await
        .expect_err("rag refuses");

    assert_eq!(error.kind, PoolErrorKind::Connect);
    assert_eq!(error.provider, "rag");
    assert!(error.to_string().contains("connection refused"));
    assert!(pool.is_connected("web"));
    assert!(!pool.is_connected("rag"));
    assert_eq!(pool.connected_providers(), vec!["web".to_string()]);
}

#[tokio::test]
async fn failed_provider_is_retried_on_next_call() {
    let connector = Arc::new(FakeConnector::default());
    connector.fail("web");
    let pool = pool_with(Arc::clone(&connector));

    assert!(pool.ensure_connected(&[identity("web")]).await.is_err());
    connector.heal();
    pool.ensure_connected(&[identity("web")]).await.expect("second attempt");

    assert_eq!(connector.handshakes("web"), 2);
    assert!(pool.is_connected("web"));
}

#[tokio::test]
async fn list_tools_is_restricted_to_allowed_providers() {
    let connector = Arc::new(FakeConnector::default());
    let pool = pool_with(connector);
    pool.ensure_connected(&[identity("web"), identity("rag")])
        .await
        .expect("connected");

    let names: Vec<String> = pool
        .list_tools(&["rag".to_string(), "unknown".to_string()])
        .iter()
        .map(|tool| tool.definition().name)
        .collect();
    assert_eq!(names, vec!["rag_ping".to_string()]);

    let first = pool.list_tools(&["web".to_string()]);
    let second = pool.list_tools(&["web".to_string()]);
    assert!(Arc::ptr_eq(&first[0], &second[0]));
}

#[tokio::test]
async fn pooled_tools_call_through_to_the_session() {
    let connector = Arc::new(FakeConnector::default());
    let pool = pool_with(connector);
    pool.ensure_connected(&[identity("web")]).await.expect("connected");

    let tools = pool.list_tools(&["web".to_string()]);
    let output = tools[0]
        .invoke(&json!({}), &ToolExecutionContext::new("s1"))
        .await;

    assert_eq!(output.to_text(), "web answered ping");
}

#[tokio::test]
async fn disconnect_and_shutdown_close_sessions() {
    let connector = Arc::new(FakeConnector::default());
    let pool = pool_with(Arc::clone(&connector));
    pool.ensure_connected(&[identity("web"), identity("rag"), identity("trivia")])
        .await
        .expect("connected");

    assert!(pool.disconnect("web").await);
    assert!(!pool.disconnect("web").await);
    assert!(!pool.is_connected("web"));

    pool.shutdown().await;
    assert!(pool.connected_providers().is_empty());
    assert_eq!(connector.closed.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_failed_handshake() {
    let connector = Arc::new(FakeConnector::default());
    connector.fail("web");
    let pool = pool_with(Arc::clone(&connector));

    let callers = (0..8).map(|_| {
        let pool = pool.clone();
        tokio::spawn(async move { pool.ensure_connected(&[identity("web")]).await })
    });
    let errors: Vec<PoolError> = join_all(callers)
        .await
        .into_iter()
        .map(|outcome| outcome.expect("task").expect_err("web refuses"))
        .collect();

    assert_eq!(connector.handshakes("web"), 1);
    assert_eq!(errors.len(), 8);
    assert!(errors.iter().all(|error| *error == errors[0]));
    assert_eq!(errors[0].provider, "web");
    assert!(!pool.is_connected("web"));
}

#[tokio::test]
async fn shutdown_during_handshake_discards_the_late_session() {
    let connector = Arc::new(FakeConnector::default());
    let pool = pool_with(Arc::clone(&connector));

    let pending = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.ensure_connected(&[identity("web")]).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    pool.shutdown().await;

    let error = pending.await.expect("task").expect_err("pool was shut down");
    assert_eq!(error.provider, "web");
    assert!(error.reason().contains("shut down"));
    assert!(!pool.is_connected("web"));
    assert!(pool.connected_providers().is_empty());
    assert_eq!(connector.closed.load(Ordering::SeqCst), 1);
}
