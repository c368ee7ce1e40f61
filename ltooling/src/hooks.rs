//! Runtime hooks for tool execution lifecycle events.
//!
//! ```rust
//! use ltooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use lmodel::ToolCall;

use crate::{ToolExecutionContext, ToolExecutionResult, ToolFailure};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    /// Called when the tool answered with failure content. The failure is
    /// still handed to the model; this is for observation only.
    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _failure: &ToolFailure,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
