//! Request, tool, and completion types exchanged with a model client.
//!
//! ```rust
//! use lmodel::{ChatMessage, ModelErrorKind, ModelRequest, Role};
//!
//! let ok = ModelRequest::builder("gemini-2.5-flash")
//!     .system_prompt("You are the trivia host.")
//!     .message(ChatMessage::text("m-1", Role::User, "start a game"))
//!     .build();
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::builder("gemini-2.5-flash").build().err().expect("needs a message");
//! assert_eq!(err.kind, ModelErrorKind::InvalidRequest);
//! ```

use lcommon::{GenerationOptions, MetadataMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ChatMessage, ModelError, ToolContent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Canonical argument encoding used for duplicate-call detection.
    pub fn serialized_arguments(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

/// One executed tool call paired with its result, replayed to the model on
/// the next round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExchange {
    pub call: ToolCall,
    pub result: ToolResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    ContentFilter,
    Error,
    Cancelled,
    Other,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndTurn => "stop",
            Self::MaxTokens => "length",
            Self::ToolUse => "tool-calls",
            Self::ContentFilter => "content-filter",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn accumulate(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub exchanges: Vec<ToolExchange>,
    pub options: GenerationOptions,
    pub metadata: MetadataMap,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn with_exchanges(mut self, exchanges: Vec<ToolExchange>) -> Self {
        self.exchanges = exchanges;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.model.trim().is_empty() {
            return Err(ModelError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ModelError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ModelError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    request: ModelRequest,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: ModelRequest {
                model: model.into(),
                system_prompt: String::new(),
                messages: Vec::new(),
                tools: Vec::new(),
                exchanges: Vec::new(),
                options: GenerationOptions::default(),
                metadata: MetadataMap::new(),
            },
        }
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.request.system_prompt = system_prompt.into();
        self
    }

    pub fn message(mut self, message: ChatMessage) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request.tools = tools;
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.request.options = options;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<ModelRequest, ModelError> {
        self.request.validate()?;
        Ok(self.request)
    }
}
