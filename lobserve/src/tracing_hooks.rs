//! Tracing-based observability hooks for pool, tool runtime and turn events.
//!
//! ```rust
//! use lchat::TurnHooks;
//! use lobserve::TracingObservabilityHooks;
//!
//! fn accepts_turn_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_turn_hooks(&hooks);
//! ```

use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnSummary};
use lcommon::SessionId;
use lmodel::ToolCall;
use lpool::{PoolError, PoolHooks};
use ltooling::{ToolExecutionContext, ToolExecutionResult, ToolFailure, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl PoolHooks for TracingObservabilityHooks {
    fn on_connect_start(&self, provider: &str) {
        tracing::info!(phase = "pool", event = "connect_start", provider);
    }

    fn on_connect_success(&self, provider: &str, tool_count: usize, elapsed: Duration) {
        tracing::info!(
            phase = "pool",
            event = "connect_success",
            provider,
            tool_count,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_connect_failure(&self, provider: &str, error: &PoolError, elapsed: Duration) {
        tracing::error!(
            phase = "pool",
            event = "connect_failure",
            provider,
            error_kind = ?error.kind,
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }

    fn on_connection_reused(&self, provider: &str) {
        tracing::debug!(phase = "pool", event = "connection_reused", provider);
    }

    fn on_disconnect(&self, provider: &str) {
        tracing::info!(phase = "pool", event = "disconnect", provider);
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        failure: &ToolFailure,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            failure_kind = ?failure.kind,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }
}

impl TurnHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, activity_id: &str, session_id: &SessionId) {
        tracing::info!(
            phase = "turn",
            event = "start",
            activity = activity_id,
            session_id = %session_id
        );
    }

    fn on_turn_finish(
        &self,
        activity_id: &str,
        session_id: &SessionId,
        summary: &TurnSummary,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "turn",
            event = "finish",
            activity = activity_id,
            session_id = %session_id,
            round_trips = summary.round_trips,
            tool_calls = summary.tool_calls,
            generated_chars = summary.generated_chars,
            stop_reason = summary.stop_reason.map(|reason| reason.as_str()),
            total_tokens = summary.usage.total_tokens,
            failed = summary.failed,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_connect_failure(&self, activity_id: &str, providers: &[String], error: &PoolError) {
        tracing::error!(
            phase = "turn",
            event = "connect_failure",
            activity = activity_id,
            providers = %providers.join(","),
            provider = %error.provider,
            error = %error
        );
    }

    fn on_hallucination_signal(
        &self,
        activity_id: &str,
        session_id: &SessionId,
        tool_call: &ToolCall,
        previous_calls: usize,
    ) {
        tracing::warn!(
            phase = "turn",
            event = "hallucination_signal",
            activity = activity_id,
            session_id = %session_id,
            tool_name = tool_call.name,
            arguments = %tool_call.serialized_arguments(),
            previous_calls
        );
    }

    fn on_empty_output(&self, activity_id: &str, session_id: &SessionId, finish_reason: &str) {
        tracing::warn!(
            phase = "turn",
            event = "empty_output",
            activity = activity_id,
            session_id = %session_id,
            finish_reason
        );
    }

    fn on_model_error(&self, activity_id: &str, session_id: &SessionId, error: &ChatError) {
        tracing::error!(
            phase = "turn",
            event = "model_error",
            activity = activity_id,
            session_id = %session_id,
            error_kind = ?error.kind,
            category = ?error.category,
            error = %error
        );
    }
}
