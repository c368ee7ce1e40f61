//! Transport-neutral contract for talking to a tool provider.

use std::sync::Arc;

use lcommon::BoxFuture;
use lmodel::ToolContent;
use ltooling::CallerMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProtocolError, ProviderIdentity};

pub type PoolFuture<'a, T> = BoxFuture<'a, T>;

/// A tool as advertised by its provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteToolSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn success(content: Vec<ToolContent>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(message)],
            is_error: true,
        }
    }
}

/// An established, initialized session with one provider.
pub trait ProviderSession: Send + Sync {
    fn list_tools<'a>(&'a self) -> PoolFuture<'a, Result<Vec<RemoteToolSpec>, ProtocolError>>;

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        arguments: Value,
        meta: &'a CallerMetadata,
    ) -> PoolFuture<'a, Result<CallToolResult, ProtocolError>>;

    fn close<'a>(&'a self) -> PoolFuture<'a, ()> {
        Box::pin(async {})
    }
}

/// Opens sessions. Connecting includes whatever handshake the transport
/// requires; a returned session is ready for `list_tools`.
pub trait ProviderConnector: Send + Sync {
    fn connect<'a>(
        &'a self,
        identity: &'a ProviderIdentity,
    ) -> PoolFuture<'a, Result<Arc<dyn ProviderSession>, ProtocolError>>;
}
