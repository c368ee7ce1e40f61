//! Chat-layer errors and the user-facing failure classification.
//!
//! Raw provider messages never reach the end user. They are matched against
//! a fixed table of substrings and replaced by a neutral message, with the
//! turn's correlation id appended so operators can find the full details.
//!
//! ```rust
//! use lchat::{FailureCategory, classify_failure};
//!
//! assert_eq!(classify_failure("HTTP 429 Too Many Requests"), FailureCategory::RateLimited);
//! assert_eq!(classify_failure("connect ECONNREFUSED 127.0.0.1"), FailureCategory::Network);
//! assert_eq!(classify_failure("boom"), FailureCategory::Generic);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use lcommon::TraceId;
use lmodel::{ModelError, ModelErrorKind};
use lpool::PoolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Model,
    Connection,
    Tooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    ApiConfiguration,
    RateLimited,
    QuotaExceeded,
    Network,
    Storage,
    ToolExecution,
    MalformedRequest,
    Generic,
}

const CLASSIFICATION: &[(FailureCategory, &[&str])] = &[
    (
        FailureCategory::ApiConfiguration,
        &[
            "API key",
            "GOOGLE_API_KEY",
            "Incorrect API key",
            "invalid_api_key",
            "Invalid authentication",
            "401",
            "Unauthorized",
        ],
    ),
    (FailureCategory::RateLimited, &["rate limit", "429"]),
    (
        FailureCategory::QuotaExceeded,
        &[
            "quota",
            "RESOURCE_EXHAUSTED",
            "Peak input tokens",
            "Peak output tokens",
            "Requests per minute",
        ],
    ),
    (
        FailureCategory::Network,
        &["ECONNREFUSED", "ENOTFOUND", "network"],
    ),
    (FailureCategory::Storage, &["database", "postgres", "relation"]),
    (FailureCategory::ToolExecution, &["ToolExecutionError"]),
    (
        FailureCategory::MalformedRequest,
        &["Invalid Request", "parts field"],
    ),
];

impl FailureCategory {
    pub fn message(self) -> &'static str {
        match self {
            Self::ApiConfiguration => {
                "_Sorry, there's an API configuration issue. Please contact support._"
            }
            Self::RateLimited => {
                "_I'm receiving too many requests right now. Please try again in a moment._"
            }
            Self::QuotaExceeded => {
                "_API quota limit reached. Please wait a moment before trying again._"
            }
            Self::Network => {
                "_I'm having trouble connecting. Please check your internet connection and try again._"
            }
            Self::Storage => {
                "_There was a database issue. Your request couldn't be saved, but you can continue chatting._"
            }
            Self::ToolExecution => {
                "_One of my tools encountered an error. Please try rephrasing your request._"
            }
            Self::MalformedRequest => {
                "_I had trouble understanding the request format. Please try again._"
            }
            Self::Generic => "_Something went wrong. Please try again or rephrase your request._",
        }
    }

    fn from_model_kind(kind: ModelErrorKind) -> Self {
        match kind {
            ModelErrorKind::Authentication => Self::ApiConfiguration,
            ModelErrorKind::RateLimited => Self::RateLimited,
            ModelErrorKind::QuotaExceeded => Self::QuotaExceeded,
            ModelErrorKind::InvalidRequest => Self::MalformedRequest,
            ModelErrorKind::Transport => Self::Network,
            ModelErrorKind::Timeout | ModelErrorKind::Unavailable | ModelErrorKind::Other => {
                Self::Generic
            }
        }
    }
}

/// Matches raw error text against the category table, first match wins.
pub fn classify_failure(text: &str) -> FailureCategory {
    CLASSIFICATION
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| text.contains(needle)))
        .map(|(category, _)| *category)
        .unwrap_or(FailureCategory::Generic)
}

/// Appends ` (Request ID: …)` when a correlation id is known.
pub fn with_request_id(message: &str, request_id: Option<&TraceId>) -> String {
    match request_id {
        Some(id) => format!("{message} (Request ID: {id})"),
        None => message.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub category: FailureCategory,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            category: classify_failure(&message),
            message,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Model, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Connection, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Tooling, message)
    }

    /// Neutral text suitable for the end user.
    pub fn user_message(&self, request_id: Option<&TraceId>) -> String {
        with_request_id(self.category.message(), request_id)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ModelError> for ChatError {
    fn from(value: ModelError) -> Self {
        let mut category = classify_failure(&value.message);
        if category == FailureCategory::Generic {
            category = FailureCategory::from_model_kind(value.kind);
        }
        Self {
            kind: ChatErrorKind::Model,
            category,
            message: value.message,
        }
    }
}

impl From<PoolError> for ChatError {
    fn from(value: PoolError) -> Self {
        Self::connection(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_table_order() {
        let cases = [
            ("Incorrect API key provided", FailureCategory::ApiConfiguration),
            ("status 401", FailureCategory::ApiConfiguration),
            ("rate limit exceeded", FailureCategory::RateLimited),
            ("RESOURCE_EXHAUSTED: Peak input tokens", FailureCategory::QuotaExceeded),
            ("getaddrinfo ENOTFOUND api.example", FailureCategory::Network),
            ("relation \"chats\" does not exist", FailureCategory::Storage),
            ("ToolExecutionError: web_fetch", FailureCategory::ToolExecution),
            ("Invalid Request: parts field empty", FailureCategory::MalformedRequest),
            ("unexpected end of stream", FailureCategory::Generic),
        ];

        for (text, expected) in cases {
            assert_eq!(classify_failure(text), expected, "{text}");
        }
    }

    #[test]
    fn api_key_wins_over_later_categories() {
        assert_eq!(
            classify_failure("API key quota exhausted (429)"),
            FailureCategory::ApiConfiguration
        );
    }

    #[test]
    fn model_error_kind_is_fallback_for_unmatched_text() {
        let error = ChatError::from(ModelError::rate_limited("slow down"));
        assert_eq!(error.category, FailureCategory::RateLimited);

        let matched = ChatError::from(ModelError::other("quota reached for project"));
        assert_eq!(matched.category, FailureCategory::QuotaExceeded);
    }

    #[test]
    fn user_message_appends_request_id() {
        let error = ChatError::model("socket hang up");
        let id = TraceId::from("req-42");
        assert_eq!(
            error.user_message(Some(&id)),
            "_Something went wrong. Please try again or rephrase your request._ (Request ID: req-42)"
        );
        assert_eq!(error.user_message(None), FailureCategory::Generic.message());
    }
}
