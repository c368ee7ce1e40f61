//! Turn request and the events a turn streams back to the client.

use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use lcommon::{TraceId, UserId};
use lmodel::ChatMessage;
use ltooling::{CallerMetadata, MemoryState};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ActivityConfig;

/// Advisory, client-reported details about the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    pub ip: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub activity: Arc<ActivityConfig>,
    pub user_id: UserId,
    pub messages: Vec<ChatMessage>,
    pub caller: CallerContext,
    pub memory_state: Option<MemoryState>,
    pub request_id: Option<TraceId>,
}

impl TurnRequest {
    pub fn new(
        activity: Arc<ActivityConfig>,
        user_id: impl Into<UserId>,
        messages: Vec<ChatMessage>,
    ) -> Self {
        Self {
            activity,
            user_id: user_id.into(),
            messages,
            caller: CallerContext::default(),
            memory_state: None,
            request_id: None,
        }
    }

    pub fn with_caller(mut self, caller: CallerContext) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_memory(mut self, memory_state: MemoryState) -> Self {
        self.memory_state = Some(memory_state);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<TraceId>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Metadata forwarded to tool providers with every call.
    pub fn caller_metadata(&self) -> CallerMetadata {
        CallerMetadata {
            user_id: Some(self.user_id.to_string()),
            user_ip: self.caller.ip.clone(),
            user_country: self.caller.country.clone(),
        }
    }
}

/// One item of a turn's output stream. Every stream ends with [`TurnEvent::Done`].
///
/// ```rust
/// use lchat::TurnEvent;
///
/// let event = TurnEvent::Error {
///     message: "_Something went wrong._".to_string(),
///     correlation_id: Some("req-1".to_string()),
/// };
/// let json = serde_json::to_string(&event).expect("serialize");
/// assert_eq!(
///     json,
///     r#"{"type":"error","message":"_Something went wrong._","correlationId":"req-1"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TurnEvent {
    TextDelta {
        text: String,
    },
    Reasoning {
        text: String,
    },
    MemoryUpdate {
        state: Map<String, Value>,
    },
    Error {
        message: String,
        #[serde(rename = "correlationId", skip_serializing_if = "Option::is_none")]
        correlation_id: Option<String>,
    },
    Done,
    Ping,
}

impl TurnEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta { text: text.into() }
    }

    pub fn error(message: impl Into<String>, correlation_id: Option<&TraceId>) -> Self {
        Self::Error {
            message: message.into(),
            correlation_id: correlation_id.map(ToString::to_string),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

pub type TurnEventStream<'a> = Pin<Box<dyn Stream<Item = TurnEvent> + Send + 'a>>;
