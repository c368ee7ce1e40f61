//! Shared connection pool for remote tool providers and the adapter that
//! exposes their tools through the [`ltooling::Tool`] contract.
//!
//! One pool serves every concurrent conversation: connections are created on
//! first use, deduplicated while in flight and kept until explicitly
//! disconnected.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lpool::{ConnectionPool, HttpProviderConnector, ProviderIdentity};
//! use lresource::ResourceCache;
//!
//! # async fn demo() -> Result<(), lpool::PoolError> {
//! let pool = ConnectionPool::new(
//!     Arc::new(HttpProviderConnector::default()),
//!     Arc::new(ResourceCache::default()),
//! );
//!
//! let web = ProviderIdentity::new("web", "http://localhost:8001/mcp");
//! pool.ensure_connected(&[web]).await?;
//!
//! let tools = pool.list_tools(&["web".to_string()]);
//! for tool in &tools {
//!     println!("{}", tool.definition().name);
//! }
//! # Ok(())
//! # }
//! ```

mod adapter;
mod config;
mod error;
mod hooks;
#[cfg(feature = "transport-http")]
mod http;
mod identity;
mod pool;
mod session;

pub mod prelude {
    pub use crate::{
        AdapterConfig, ConnectionPool, PoolError, PoolHooks, ProtocolError, ProviderConnector,
        ProviderIdentity, ProviderSession, RemoteTool,
    };

    #[cfg(feature = "transport-http")]
    pub use crate::HttpProviderConnector;
}

pub use adapter::{RemoteErrorCategory, RemoteTool, classify_tool_error, instructive_error};
pub use config::{AdapterConfig, DEFAULT_MAX_PAYLOAD_BYTES, MAX_TOOL_PAYLOAD_BYTES_ENV};
pub use error::{PoolError, PoolErrorKind, ProtocolError, ProtocolErrorKind};
pub use hooks::{NoopPoolHooks, PoolHooks};
#[cfg(feature = "transport-http")]
pub use http::{HttpProviderConnector, HttpProviderSession};
pub use identity::{ProviderIdentity, qualified_tool_name};
pub use pool::{ConnectionPool, ConnectionPoolBuilder, EstablishedConnection};
pub use session::{
    CallToolResult, PoolFuture, ProviderConnector, ProviderSession, RemoteToolSpec,
};
