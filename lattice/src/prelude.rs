//! Common imports for most lattice applications.

pub use crate::{
    Observability, RuntimeBundle, RuntimeConfig, activity, assistant_message, build_runtime_with,
    provider, turn, user_message,
};
#[cfg(feature = "transport-http")]
pub use crate::{HttpProviderConnector, build_runtime};
pub use crate::{lt_activity, lt_messages, lt_msg};
pub use crate::{
    ActivityCatalog, ActivityConfig, CallerContext, ChatError, ChatMessage, ConnectionPool,
    ContentPart, LocalTool, MemoryState, ModelClient, ModelError, ModelEvent, ModelRequest,
    ModelSettings, OrchestratorConfig, PoolError, ProviderFailurePolicy, ProviderIdentity,
    ResourceCache, Role, SessionId, TraceId, TurnEvent, TurnOrchestrator, TurnRequest, UserId,
};
