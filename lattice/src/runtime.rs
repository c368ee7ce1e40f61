//! Runtime wiring: one resource cache with its sweeper, one connection pool
//! and one turn orchestrator, shared by every conversation of a process.

use std::sync::Arc;

use crate::{
    AdapterConfig, ConnectionPool, MetricsObservabilityHooks, ModelClient, NoopPoolHooks,
    NoopToolRuntimeHooks, NoopTurnHooks, OrchestratorConfig, PoolHooks, ProviderConnector,
    ResourceCache, ResourceCacheConfig, SafePoolHooks, SafeToolHooks, SafeTurnHooks,
    SweeperHandle, ToolRuntimeHooks, TracingObservabilityHooks, TurnEventStream, TurnHooks,
    TurnOrchestrator, TurnRequest,
};

/// Which built-in hooks observe the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observability {
    #[default]
    Tracing,
    Metrics,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuntimeConfig {
    pub cache: ResourceCacheConfig,
    pub adapter: AdapterConfig,
    pub orchestrator: OrchestratorConfig,
    pub observability: Observability,
}

impl RuntimeConfig {
    /// Reads every environment-backed setting the runtime understands.
    pub fn from_env() -> Self {
        Self {
            cache: ResourceCacheConfig::default(),
            adapter: AdapterConfig::from_env(),
            orchestrator: OrchestratorConfig::from_env(),
            observability: Observability::default(),
        }
    }

    pub fn with_cache(mut self, cache: ResourceCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_adapter(mut self, adapter: AdapterConfig) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_orchestrator(mut self, orchestrator: OrchestratorConfig) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn with_observability(mut self, observability: Observability) -> Self {
        self.observability = observability;
        self
    }
}

struct HookSet {
    pool: Arc<dyn PoolHooks>,
    tool: Arc<dyn ToolRuntimeHooks>,
    turn: Arc<dyn TurnHooks>,
}

impl HookSet {
    fn for_mode(mode: Observability) -> Self {
        match mode {
            Observability::Tracing => Self {
                pool: Arc::new(SafePoolHooks::new(TracingObservabilityHooks)),
                tool: Arc::new(SafeToolHooks::new(TracingObservabilityHooks)),
                turn: Arc::new(SafeTurnHooks::new(TracingObservabilityHooks)),
            },
            Observability::Metrics => Self {
                pool: Arc::new(SafePoolHooks::new(MetricsObservabilityHooks)),
                tool: Arc::new(SafeToolHooks::new(MetricsObservabilityHooks)),
                turn: Arc::new(SafeTurnHooks::new(MetricsObservabilityHooks)),
            },
            Observability::Disabled => Self {
                pool: Arc::new(NoopPoolHooks),
                tool: Arc::new(NoopToolRuntimeHooks),
                turn: Arc::new(NoopTurnHooks),
            },
        }
    }
}

pub struct RuntimeBundle {
    pub resources: Arc<ResourceCache>,
    pub pool: ConnectionPool,
    pub orchestrator: TurnOrchestrator,
    sweeper: SweeperHandle,
}

impl RuntimeBundle {
    pub fn run_turn(&self, request: TurnRequest) -> TurnEventStream<'_> {
        self.orchestrator.run_turn(request)
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Stops the cache sweeper and closes every pooled provider session.
    pub async fn shutdown(self) {
        self.sweeper.shutdown();
        self.pool.shutdown().await;
        tracing::info!("lattice runtime shut down");
    }
}

/// Builds a runtime over the HTTP provider transport with settings from the
/// environment. Must be called inside a tokio runtime.
#[cfg(feature = "transport-http")]
pub fn build_runtime(model: Arc<dyn ModelClient>) -> RuntimeBundle {
    build_runtime_with(
        model,
        Arc::new(crate::HttpProviderConnector::default()),
        RuntimeConfig::from_env(),
    )
}

/// Must be called inside a tokio runtime: the resource sweeper is spawned
/// onto it.
pub fn build_runtime_with(
    model: Arc<dyn ModelClient>,
    connector: Arc<dyn ProviderConnector>,
    config: RuntimeConfig,
) -> RuntimeBundle {
    let hooks = HookSet::for_mode(config.observability);

    let resources = Arc::new(ResourceCache::new(config.cache));
    let sweeper = ResourceCache::spawn_sweeper(Arc::clone(&resources));

    let pool = ConnectionPool::builder(connector, Arc::clone(&resources))
        .adapter_config(config.adapter)
        .hooks(hooks.pool)
        .build();

    let orchestrator = TurnOrchestrator::builder(model, pool.clone())
        .config(config.orchestrator)
        .hooks(hooks.turn)
        .tool_hooks(hooks.tool)
        .build();

    tracing::debug!(observability = ?config.observability, "lattice runtime built");

    RuntimeBundle {
        resources,
        pool,
        orchestrator,
        sweeper,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::StreamExt;

    use crate::{
        ActivityConfig, BoxedEventStream, ChatMessage, ModelClient, ModelError, ModelEvent,
        ModelFuture, ModelRequest, ModelSettings, PoolFuture, ProtocolError, ProviderConnector,
        ProviderIdentity, ProviderSession, Role, StopReason, TokenUsage, TurnEvent, TurnRequest,
        VecEventStream,
    };

    use super::{Observability, RuntimeConfig, build_runtime_with};

    struct EchoModel;

    impl ModelClient for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        fn stream<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ModelFuture<'a, Result<BoxedEventStream<'a>, ModelError>> {
            Box::pin(async move {
                let last = request
                    .messages
                    .last()
                    .map(ChatMessage::text_content)
                    .unwrap_or_default();
                let stream = VecEventStream::new(vec![
                    Ok(ModelEvent::TextDelta(format!("echo: {last}"))),
                    Ok(ModelEvent::Finish {
                        stop_reason: StopReason::EndTurn,
                        usage: TokenUsage::default(),
                    }),
                ]);
                Ok(Box::pin(stream) as BoxedEventStream<'a>)
            })
        }
    }

    struct OfflineConnector;

    impl ProviderConnector for OfflineConnector {
        fn connect<'a>(
            &'a self,
            _identity: &'a ProviderIdentity,
        ) -> PoolFuture<'a, Result<Arc<dyn ProviderSession>, ProtocolError>> {
            Box::pin(async { Err(ProtocolError::connect("offline")) })
        }
    }

    #[tokio::test]
    async fn runtime_runs_turns_and_shuts_down() {
        let runtime = build_runtime_with(
            Arc::new(EchoModel),
            Arc::new(OfflineConnector),
            RuntimeConfig::default().with_observability(Observability::Metrics),
        );
        assert!(runtime.sweeper_running());

        let activity = Arc::new(ActivityConfig::new(
            "echo",
            "Repeat the user.",
            ModelSettings::new("echo-1"),
        ));
        let request = TurnRequest::new(
            activity,
            "alice",
            vec![ChatMessage::text("m1", Role::User, "ping")],
        );

        let events: Vec<TurnEvent> = runtime.run_turn(request).collect().await;
        assert_eq!(
            events,
            vec![TurnEvent::text("echo: ping"), TurnEvent::Done]
        );

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn pool_is_shared_between_bundle_and_orchestrator() {
        let runtime = build_runtime_with(
            Arc::new(EchoModel),
            Arc::new(OfflineConnector),
            RuntimeConfig::default().with_observability(Observability::Disabled),
        );

        let activity = Arc::new(
            ActivityConfig::new("web", "p", ModelSettings::new("echo-1"))
                .with_provider(ProviderIdentity::new("web", "http://web.invalid/mcp")),
        );
        let request = TurnRequest::new(
            activity,
            "bob",
            vec![ChatMessage::text("m1", Role::User, "search")],
        );

        let events: Vec<TurnEvent> = runtime.run_turn(request).collect().await;
        assert!(matches!(events[0], TurnEvent::Error { .. }));
        assert!(runtime.pool.connected_providers().is_empty());
        assert!(runtime.orchestrator.pool().connected_providers().is_empty());
    }
}
