//! Chat messages as they arrive from the client transport.
//!
//! ```rust
//! use lmodel::{ChatMessage, ContentPart, Role};
//!
//! let message = ChatMessage::text("m-1", Role::User, "what's on today?");
//! assert!(message.has_renderable_content());
//!
//! let blank = ChatMessage::new("m-2", Role::Assistant, vec![ContentPart::text("   ")]);
//! assert!(blank.sanitized().is_none());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentPart {
    Text {
        text: String,
    },
    Thinking {
        text: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Choice {
        question: String,
        options: Vec<ChoiceOption>,
    },
    #[serde(rename_all = "camelCase")]
    Payment {
        tx_data: Map<String, Value>,
        status: PaymentStatus,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            alt: None,
        }
    }

    /// Blank text and URL-less images carry nothing a model can use.
    pub fn is_renderable(&self) -> bool {
        match self {
            Self::Text { text } => !text.trim().is_empty(),
            Self::Image { url, .. } => !url.is_empty(),
            _ => true,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: Vec<ContentPart>,
    #[serde(default)]
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn new(id: impl Into<String>, role: Role, content: Vec<ContentPart>) -> Self {
        Self {
            id: id.into(),
            role,
            content,
            timestamp: 0,
        }
    }

    pub fn text(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self::new(id, role, vec![ContentPart::text(text)])
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn has_renderable_content(&self) -> bool {
        self.content.iter().any(ContentPart::is_renderable)
    }

    /// Drops blank parts; returns `None` when nothing is left.
    pub fn sanitized(&self) -> Option<Self> {
        let content: Vec<ContentPart> = self
            .content
            .iter()
            .filter(|part| part.is_renderable())
            .cloned()
            .collect();

        if content.is_empty() {
            return None;
        }

        Some(Self {
            id: self.id.clone(),
            role: self.role,
            content,
            timestamp: self.timestamp,
        })
    }

    /// Size of the message as it would travel on the wire.
    pub fn serialized_len(&self) -> usize {
        serde_json::to_string(self)
            .map(|json| json.len())
            .unwrap_or_default()
    }

    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
