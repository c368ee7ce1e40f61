//! Common `lmodel` imports for downstream crates.

pub use crate::{
    BoxedEventStream, ChatMessage, ContentPart, ModelClient, ModelError, ModelErrorKind,
    ModelEvent, ModelFuture, ModelRequest, Role, StopReason, TokenUsage, ToolCall, ToolContent,
    ToolDefinition, ToolExchange, ToolResult, VecEventStream,
};
pub use lcommon::{BoxFuture, MetadataMap};
