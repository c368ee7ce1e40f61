//! Unified facade over the lattice workspace crates.
//!
//! Most applications only need this crate. It re-exports the building blocks
//! (model contract, tooling, provider pool, resource cache, turn orchestrator,
//! observability hooks) and wires them into a ready-to-use [`RuntimeBundle`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use futures_util::StreamExt;
//! use lattice::prelude::*;
//!
//! async fn answer(model: Arc<dyn ModelClient>) {
//!     let runtime = build_runtime(model);
//!     let activity = lt_activity!("ama", "gpt-4o-mini", "Answer briefly.", local: [memory]);
//!     let request = turn(activity, "alice", lt_messages![user => "Hi!"]);
//!
//!     let mut events = runtime.run_turn(request);
//!     while let Some(event) = events.next().await {
//!         if let TurnEvent::TextDelta { text } = &event {
//!             print!("{text}");
//!         }
//!     }
//!     drop(events);
//!     runtime.shutdown().await;
//! }
//! ```

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use lchat;
pub use lcommon;
pub use lmodel;
pub use lobserve;
pub use lpool;
pub use lresource;
pub use ltooling;

pub use lchat::{
    ActivityCatalog, ActivityConfig, CallerContext, ChatError, ChatErrorKind, FailureCategory,
    LocalTool, ModelSettings, NoopTurnHooks, OrchestratorConfig, PromptRenderer,
    ProviderFailurePolicy, TemplateContext, TemplateRenderer, TurnEvent, TurnEventStream,
    TurnHooks, TurnOrchestrator, TurnOrchestratorBuilder, TurnRequest, TurnSummary,
};
pub use lcommon::{BoxFuture, GenerationOptions, MetadataMap, SessionId, TraceId, UserId};
pub use lmodel::{
    BoxedEventStream, ChatMessage, ContentPart, ModelClient, ModelError, ModelErrorKind,
    ModelEvent, ModelEventStream, ModelFuture, ModelRequest, ModelRequestBuilder, Role,
    StopReason, TokenUsage, ToolCall, ToolContent, ToolDefinition, ToolExchange, ToolResult,
    VecEventStream,
};
pub use lobserve::{
    MetricsObservabilityHooks, SafePoolHooks, SafeToolHooks, SafeTurnHooks,
    TracingObservabilityHooks,
};
#[cfg(feature = "transport-http")]
pub use lpool::HttpProviderConnector;
pub use lpool::{
    AdapterConfig, ConnectionPool, ConnectionPoolBuilder, NoopPoolHooks, PoolError,
    PoolErrorKind, PoolFuture, PoolHooks, ProtocolError, ProtocolErrorKind, ProviderConnector,
    ProviderIdentity, ProviderSession, RemoteTool, RemoteToolSpec, CallToolResult,
};
pub use lresource::{ResourceCache, ResourceCacheConfig, ResourceId, ResourceUrls, SweeperHandle};
pub use ltooling::{
    DefaultToolRuntime, FunctionTool, MemoryState, MemoryTool, NoopToolRuntimeHooks, Tool,
    ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolOutput,
    ToolRegistry, ToolRuntime, ToolRuntimeHooks, required_string,
};

#[cfg(feature = "transport-http")]
pub use runtime::build_runtime;
pub use runtime::{Observability, RuntimeBundle, RuntimeConfig, build_runtime_with};
pub use util::{
    activity, assistant_message, next_message_id, parse_local_tool, provider, turn, user_message,
};
