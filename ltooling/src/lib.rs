//! Capability layer for describing, registering and executing tools.
//!
//! Every tool answers with a [`ToolOutput`]: failures are content the model
//! can read, never errors that escape the turn.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lmodel::{ToolCall, ToolContent, ToolDefinition};
//! use ltooling::{DefaultToolRuntime, ToolExecutionContext, ToolRegistry, ToolRuntime};
//! use serde_json::json;
//!
//! # async fn demo() {
//! let mut registry = ToolRegistry::new();
//! registry.register_fn(
//!     ToolDefinition {
//!         name: "shout".to_string(),
//!         description: "Uppercases text".to_string(),
//!         input_schema: json!({ "type": "object" }),
//!     },
//!     |args, _ctx| async move {
//!         let text = args["text"].as_str().unwrap_or_default().to_uppercase();
//!         Ok(vec![ToolContent::text(text)])
//!     },
//! );
//!
//! let runtime = DefaultToolRuntime::new(Arc::new(registry));
//! let result = runtime
//!     .execute(
//!         ToolCall::new("call-1", "shout", json!({ "text": "hi" })),
//!         ToolExecutionContext::new("session-1"),
//!     )
//!     .await;
//! assert_eq!(result.output.to_text(), "HI");
//! # }
//! ```

mod args;
mod error;
mod hooks;
mod memory;
mod registry;
mod runtime;
mod schema;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        ArgumentSchema, CallerMetadata, DefaultToolRuntime, MemoryState, MemoryTool, Tool,
        ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFailureKind,
        ToolFuture, ToolOutput, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
    };
}

pub use args::{argument_object, optional_string, parse_json_value, required_string};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use memory::{MEMORY_TOOL_NAME, MemoryState, MemoryTool, format_memory_for_prompt};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use schema::{ArgumentSchema, FieldSpec, FieldType};
pub use tool::{FunctionTool, Tool, ToolFuture, error_output};
pub use types::{
    CallerMetadata, ToolExecutionContext, ToolExecutionResult, ToolFailure, ToolFailureKind,
    ToolOutput,
};
