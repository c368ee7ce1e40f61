//! Session orchestration: one chat turn from activity configuration to a
//! stream of user-facing events.
//!
//! A turn prepares the activity's tools (local memory plus pooled remote
//! providers), bounds the history, renders the system prompt and drives the
//! model/tool loop until the model stops asking for tools.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use futures_util::StreamExt;
//! use lchat::{ActivityConfig, ModelSettings, TurnEvent, TurnOrchestrator, TurnRequest};
//! use lmodel::{ChatMessage, ModelClient, Role};
//! use lpool::ConnectionPool;
//!
//! async fn answer(model: Arc<dyn ModelClient>, pool: ConnectionPool) {
//!     let orchestrator = TurnOrchestrator::builder(model, pool).build();
//!     let activity = Arc::new(ActivityConfig::new(
//!         "ama",
//!         "Answer questions for {{userId}}.",
//!         ModelSettings::new("gpt-4o-mini"),
//!     ));
//!     let request = TurnRequest::new(
//!         activity,
//!         "alice",
//!         vec![ChatMessage::text("m1", Role::User, "What is Rust?")],
//!     );
//!
//!     let mut events = orchestrator.run_turn(request);
//!     while let Some(event) = events.next().await {
//!         if let TurnEvent::TextDelta { text } = event {
//!             print!("{text}");
//!         }
//!     }
//! }
//! ```

mod activity;
mod config;
mod error;
mod history;
mod hooks;
mod keepalive;
mod orchestrator;
mod prompt;
mod tool_history;
mod types;

pub mod prelude {
    pub use crate::{
        ActivityCatalog, ActivityConfig, CallerContext, ChatError, ChatErrorKind,
        FailureCategory, LocalTool, ModelSettings, NoopTurnHooks, OrchestratorConfig,
        PromptRenderer, ProviderFailurePolicy, TemplateContext, TemplateRenderer, TurnEvent,
        TurnEventStream, TurnHooks, TurnOrchestrator, TurnOrchestratorBuilder, TurnRequest,
        TurnSummary,
    };
    pub use lcommon::{SessionId, TraceId, UserId};
    pub use ltooling::{MemoryState, ToolRuntimeHooks};
}

pub use activity::{
    ActivityCatalog, ActivityConfig, DEFAULT_MAX_HISTORY_BYTES, DEFAULT_TEMPERATURE, LocalTool,
    ModelSettings, ProviderFailurePolicy,
};
pub use config::{
    DEFAULT_KEEP_ALIVE, DEFAULT_MAX_ROUND_TRIPS, DEFAULT_MAX_TOOL_RETRIES, ENABLE_TOOL_RETRY_ENV,
    KEEP_ALIVE_SECS_ENV, MAX_ROUND_TRIPS_ENV, MAX_TOOL_RETRIES_ENV, OrchestratorConfig,
};
pub use error::{ChatError, ChatErrorKind, FailureCategory, classify_failure, with_request_id};
pub use history::{sanitize_history, truncate_history};
pub use hooks::{NoopTurnHooks, TurnHooks, TurnSummary};
pub use keepalive::KeepAlive;
pub use orchestrator::{TurnOrchestrator, TurnOrchestratorBuilder};
pub use prompt::{
    MESSAGE_HANDLING_INSTRUCTIONS, PromptRenderer, TemplateContext, TemplateRenderer,
    build_system_prompt,
};
pub use tool_history::ToolCallHistory;
pub use types::{CallerContext, TurnEvent, TurnEventStream, TurnRequest};
