//! Errors raised while talking to tool providers and while pooling them.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    Connect,
    Http,
    Rpc,
    Decode,
    Closed,
}

/// Failure of a single provider round trip (handshake, listing or call).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub kind: ProtocolErrorKind,
    pub message: String,
}

impl ProtocolError {
    pub fn new(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Connect, message)
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Http, message)
    }

    pub fn rpc(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Rpc, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Decode, message)
    }

    pub fn closed(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Closed, message)
    }
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ProtocolError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolErrorKind {
    Connect,
    ListTools,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolError {
    pub kind: PoolErrorKind,
    pub provider: String,
    pub source: ProtocolError,
}

impl PoolError {
    pub fn connect(provider: impl Into<String>, source: ProtocolError) -> Self {
        Self {
            kind: PoolErrorKind::Connect,
            provider: provider.into(),
            source,
        }
    }

    pub fn list_tools(provider: impl Into<String>, source: ProtocolError) -> Self {
        Self {
            kind: PoolErrorKind::ListTools,
            provider: provider.into(),
            source,
        }
    }

    /// Root cause without the provider prefix.
    pub fn reason(&self) -> &str {
        &self.source.message
    }
}

impl Display for PoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            PoolErrorKind::Connect => write!(
                f,
                "connection failed for provider '{}': {}",
                self.provider, self.source
            ),
            PoolErrorKind::ListTools => write!(
                f,
                "tool listing failed for provider '{}': {}",
                self.provider, self.source
            ),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
