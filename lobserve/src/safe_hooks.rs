//! Wrappers that keep a panicking hook from unwinding into the runtime.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnSummary};
use lcommon::SessionId;
use lmodel::ToolCall;
use lpool::{PoolError, PoolHooks};
use ltooling::{ToolExecutionContext, ToolExecutionResult, ToolFailure, ToolRuntimeHooks};

pub struct SafePoolHooks<H> {
    inner: H,
}

impl<H> SafePoolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> PoolHooks for SafePoolHooks<H>
where
    H: PoolHooks,
{
    fn on_connect_start(&self, provider: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_connect_start(provider)));
    }

    fn on_connect_success(&self, provider: &str, tool_count: usize, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_connect_success(provider, tool_count, elapsed)
        }));
    }

    fn on_connect_failure(&self, provider: &str, error: &PoolError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_connect_failure(provider, error, elapsed)
        }));
    }

    fn on_connection_reused(&self, provider: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_connection_reused(provider)));
    }

    fn on_disconnect(&self, provider: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_disconnect(provider)));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        failure: &ToolFailure,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, failure, elapsed)
        }));
    }
}

pub struct SafeTurnHooks<H> {
    inner: H,
}

impl<H> SafeTurnHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> TurnHooks for SafeTurnHooks<H>
where
    H: TurnHooks,
{
    fn on_turn_start(&self, activity_id: &str, session_id: &SessionId) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(activity_id, session_id)
        }));
    }

    fn on_turn_finish(
        &self,
        activity_id: &str,
        session_id: &SessionId,
        summary: &TurnSummary,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_finish(activity_id, session_id, summary, elapsed)
        }));
    }

    fn on_connect_failure(&self, activity_id: &str, providers: &[String], error: &PoolError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_connect_failure(activity_id, providers, error)
        }));
    }

    fn on_hallucination_signal(
        &self,
        activity_id: &str,
        session_id: &SessionId,
        tool_call: &ToolCall,
        previous_calls: usize,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_hallucination_signal(activity_id, session_id, tool_call, previous_calls)
        }));
    }

    fn on_empty_output(&self, activity_id: &str, session_id: &SessionId, finish_reason: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_empty_output(activity_id, session_id, finish_reason)
        }));
    }

    fn on_model_error(&self, activity_id: &str, session_id: &SessionId, error: &ChatError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_model_error(activity_id, session_id, error)
        }));
    }
}
