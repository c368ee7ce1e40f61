//! Typed items carried in tool results.
//!
//! ```rust
//! use lmodel::ToolContent;
//!
//! let item = ToolContent::image("iVBORw0KGgo=", "image/png");
//! assert!(item.is_image());
//! assert_eq!(ToolContent::text("ok").as_text(), Some("ok"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolContent {
    Text {
        text: String,
    },
    /// Inline binary payload, base64 encoded as it travels on the tool protocol.
    #[serde(rename_all = "camelCase")]
    Image {
        data: String,
        mime_type: String,
    },
    Resource {
        resource: Value,
    },
    #[serde(other)]
    Unsupported,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Serialized byte size of a content list, the unit tool payload limits use.
pub fn serialized_size(content: &[ToolContent]) -> usize {
    serde_json::to_string(content)
        .map(|json| json.len())
        .unwrap_or_default()
}

/// Joins text items; non-text items are rendered as their JSON form.
pub fn flatten_text(content: &[ToolContent]) -> String {
    content
        .iter()
        .map(|item| match item {
            ToolContent::Text { text } => text.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_protocol_items_and_tolerates_unknown_types() {
        let items: Vec<ToolContent> = serde_json::from_value(json!([
            { "type": "text", "text": "hello" },
            { "type": "image", "data": "AAAA", "mimeType": "image/png" },
            { "type": "audio", "data": "AAAA", "mimeType": "audio/wav" }
        ]))
        .expect("content should decode");

        assert_eq!(items[0], ToolContent::text("hello"));
        assert_eq!(items[1], ToolContent::image("AAAA", "image/png"));
        assert_eq!(items[2], ToolContent::Unsupported);
    }

    #[test]
    fn flatten_text_joins_lines() {
        let items = vec![ToolContent::text("a"), ToolContent::text("b")];
        assert_eq!(flatten_text(&items), "a\nb");
        assert_eq!(serialized_size(&items), serde_json::to_string(&items).unwrap().len());
    }
}
