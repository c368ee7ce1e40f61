//! Tool runtime trait and the default registry-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{self, Either};
use lmodel::ToolCall;

use crate::{
    NoopToolRuntimeHooks, ToolExecutionContext, ToolExecutionResult, ToolFailureKind, ToolFuture,
    ToolOutput, ToolRegistry, ToolRuntimeHooks,
};

/// Executes model-requested tool calls. Like [`crate::Tool::invoke`], this
/// never fails: unknown tools and timeouts come back as failure content.
pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds each call; an expired call resolves to failure content.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            let output = match self.registry.get(&tool_call.name) {
                None => ToolOutput::failure(
                    ToolFailureKind::NotFound,
                    format!(
                        "Error: Tool '{}' is not available. Use only the tools listed for this conversation.",
                        tool_call.name
                    ),
                ),
                Some(tool) => {
                    let invocation = tool.invoke(&tool_call.arguments, &context);
                    match self.timeout {
                        None => invocation.await,
                        Some(limit) => {
                            match future::select(invocation, Delay::new(limit)).await {
                                Either::Left((output, _)) => output,
                                Either::Right(_) => ToolOutput::failure(
                                    ToolFailureKind::Timeout,
                                    format!(
                                        "Tool execution failed for '{}': timed out after {}s\n\nThis may be a temporary issue. Please try again or use different arguments.",
                                        tool_call.name,
                                        limit.as_secs()
                                    ),
                                ),
                            }
                        }
                    }
                }
            };

            let elapsed = started.elapsed();
            let result = ToolExecutionResult::new(tool_call, output, elapsed);
            match &result.output {
                ToolOutput::Failure(failure) => {
                    self.hooks
                        .on_execution_failure(&result.call, &context, failure, elapsed)
                }
                ToolOutput::Content(_) => {
                    self.hooks
                        .on_execution_success(&result.call, &context, &result, elapsed)
                }
            }

            result
        })
    }
}
