//! Model client contract: chat messages, tool definitions, streamed model
//! events, and the `ModelClient` trait the orchestrator drives.

mod content;
mod error;
mod message;
mod model;
mod provider;
mod stream;

pub mod prelude;

pub use content::{ToolContent, flatten_text, serialized_size};
pub use error::{ModelError, ModelErrorKind};
pub use message::{ChatMessage, ChoiceOption, ContentPart, PaymentStatus, Role};
pub use model::{
    ModelRequest, ModelRequestBuilder, StopReason, TokenUsage, ToolCall, ToolDefinition,
    ToolExchange, ToolResult,
};
pub use provider::{ModelClient, ModelFuture};
pub use stream::{BoxedEventStream, ModelEvent, ModelEventStream, VecEventStream};
