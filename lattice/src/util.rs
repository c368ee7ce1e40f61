//! Small convenience constructors for common types.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    ActivityConfig, ChatMessage, LocalTool, ModelSettings, ProviderIdentity, Role, TurnRequest,
    UserId,
};

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique message id of the form `msg-<n>`.
pub fn next_message_id() -> String {
    format!("msg-{}", MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub fn user_message(text: impl Into<String>) -> ChatMessage {
    ChatMessage::text(next_message_id(), Role::User, text)
}

pub fn assistant_message(text: impl Into<String>) -> ChatMessage {
    ChatMessage::text(next_message_id(), Role::Assistant, text)
}

pub fn provider(name: impl Into<String>, endpoint: impl Into<String>) -> ProviderIdentity {
    ProviderIdentity::new(name, endpoint)
}

pub fn activity(
    id: impl Into<String>,
    model: impl Into<String>,
    system_prompt: impl Into<String>,
) -> ActivityConfig {
    ActivityConfig::new(id, system_prompt, ModelSettings::new(model))
}

pub fn turn(
    activity: impl Into<Arc<ActivityConfig>>,
    user_id: impl Into<UserId>,
    messages: Vec<ChatMessage>,
) -> TurnRequest {
    TurnRequest::new(activity.into(), user_id, messages)
}

pub fn parse_local_tool(value: &str) -> Option<LocalTool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" | "mem" => Some(LocalTool::Memory),
        _ => None,
    }
}
