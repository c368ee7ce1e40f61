//! Production-friendly observability hooks for the connection pool, tool
//! runtime and turn orchestrator.
//!
//! ```rust
//! use lobserve::{MetricsObservabilityHooks, SafePoolHooks, SafeTurnHooks, TracingObservabilityHooks};
//!
//! let _pool_hooks = SafePoolHooks::new(TracingObservabilityHooks);
//! let _turn_hooks = SafeTurnHooks::new(MetricsObservabilityHooks);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafePoolHooks, SafeToolHooks, SafeTurnHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafePoolHooks, SafeToolHooks, SafeTurnHooks,
        TracingObservabilityHooks,
    };
}

#[cfg(test)]
mod tests;
