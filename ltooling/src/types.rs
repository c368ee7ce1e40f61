//! Tool execution context and the typed never-throw tool output.

use std::time::Duration;

use lcommon::{MetadataMap, SessionId, TraceId};
use lmodel::{ToolCall, ToolContent, ToolResult, flatten_text};
use serde::Serialize;

/// Advisory caller context forwarded to tool providers for personalization.
/// Never used for authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_country: Option<String>,
}

impl CallerMetadata {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.user_ip.is_none() && self.user_country.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    pub trace_id: Option<TraceId>,
    pub caller: CallerMetadata,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            trace_id: None,
            caller: CallerMetadata::default(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_caller(mut self, caller: CallerMetadata) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFailureKind {
    NotFound,
    InvalidArguments,
    RemoteError,
    Exception,
    Timeout,
    PayloadTooLarge,
}

/// A failure already rendered as content the model can read and act on.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolFailure {
    pub kind: ToolFailureKind,
    pub content: Vec<ToolContent>,
}

/// Result of invoking a tool. Errors are data: a failure carries content
/// that is fed back to the model exactly like a successful result.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Content(Vec<ToolContent>),
    Failure(ToolFailure),
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Content(vec![ToolContent::text(text)])
    }

    pub fn failure(kind: ToolFailureKind, message: impl Into<String>) -> Self {
        Self::Failure(ToolFailure {
            kind,
            content: vec![ToolContent::text(message)],
        })
    }

    pub fn content(&self) -> &[ToolContent] {
        match self {
            Self::Content(content) => content,
            Self::Failure(failure) => &failure.content,
        }
    }

    pub fn into_content(self) -> Vec<ToolContent> {
        match self {
            Self::Content(content) => content,
            Self::Failure(failure) => failure.content,
        }
    }

    pub fn failure_kind(&self) -> Option<ToolFailureKind> {
        match self {
            Self::Content(_) => None,
            Self::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn to_text(&self) -> String {
        flatten_text(self.content())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub call: ToolCall,
    pub output: ToolOutput,
    pub elapsed: Duration,
}

impl ToolExecutionResult {
    pub fn new(call: ToolCall, output: ToolOutput, elapsed: Duration) -> Self {
        Self {
            call,
            output,
            elapsed,
        }
    }

    pub fn into_tool_result(self) -> ToolResult {
        let is_error = self.output.is_failure();
        ToolResult {
            tool_call_id: self.call.id,
            tool_name: self.call.name,
            content: self.output.into_content(),
            is_error,
        }
    }
}
