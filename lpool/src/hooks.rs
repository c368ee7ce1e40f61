//! Lifecycle hooks for pooled provider connections.
//!
//! ```rust
//! use lpool::{NoopPoolHooks, PoolHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn PoolHooks) {}
//!
//! assert_hooks_trait(&NoopPoolHooks);
//! ```

use std::time::Duration;

use crate::PoolError;

pub trait PoolHooks: Send + Sync {
    /// A caller claimed an absent slot and is about to connect.
    fn on_connect_start(&self, _provider: &str) {}

    fn on_connect_success(&self, _provider: &str, _tool_count: usize, _elapsed: Duration) {}

    fn on_connect_failure(&self, _provider: &str, _error: &PoolError, _elapsed: Duration) {}

    /// A caller found the provider already established.
    fn on_connection_reused(&self, _provider: &str) {}

    fn on_disconnect(&self, _provider: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPoolHooks;

impl PoolHooks for NoopPoolHooks {}
