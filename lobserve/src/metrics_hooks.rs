//! Metrics-based observability hooks for pool, tool runtime and turn events.
//!
//! ```rust
//! use lobserve::MetricsObservabilityHooks;
//! use lpool::PoolHooks;
//!
//! fn accepts_pool_hooks(_hooks: &dyn PoolHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_pool_hooks(&hooks);
//! ```

use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnSummary};
use lcommon::SessionId;
use lmodel::ToolCall;
use lpool::{PoolError, PoolHooks};
use ltooling::{ToolExecutionContext, ToolExecutionResult, ToolFailure, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl PoolHooks for MetricsObservabilityHooks {
    fn on_connect_start(&self, provider: &str) {
        metrics::counter!("lattice_pool_connect_start_total", "provider" => provider.to_string())
            .increment(1);
    }

    fn on_connect_success(&self, provider: &str, tool_count: usize, elapsed: Duration) {
        metrics::counter!("lattice_pool_connect_success_total", "provider" => provider.to_string())
            .increment(1);
        metrics::histogram!(
            "lattice_pool_connect_duration_seconds",
            "provider" => provider.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
        metrics::gauge!("lattice_pool_provider_tools", "provider" => provider.to_string())
            .set(tool_count as f64);
    }

    fn on_connect_failure(&self, provider: &str, error: &PoolError, elapsed: Duration) {
        metrics::counter!(
            "lattice_pool_connect_failure_total",
            "provider" => provider.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "lattice_pool_connect_duration_seconds",
            "provider" => provider.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_connection_reused(&self, provider: &str) {
        metrics::counter!("lattice_pool_connection_reused_total", "provider" => provider.to_string())
            .increment(1);
    }

    fn on_disconnect(&self, provider: &str) {
        metrics::counter!("lattice_pool_disconnect_total", "provider" => provider.to_string())
            .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "lattice_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "lattice_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "lattice_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        failure: &ToolFailure,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "lattice_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "failure_kind" => format!("{:?}", failure.kind)
        )
        .increment(1);
        metrics::histogram!(
            "lattice_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl TurnHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, activity_id: &str, _session_id: &SessionId) {
        metrics::counter!("lattice_turn_start_total", "activity" => activity_id.to_string())
            .increment(1);
    }

    fn on_turn_finish(
        &self,
        activity_id: &str,
        _session_id: &SessionId,
        summary: &TurnSummary,
        elapsed: Duration,
    ) {
        let status = if summary.failed { "failure" } else { "success" };
        metrics::counter!(
            "lattice_turn_finish_total",
            "activity" => activity_id.to_string(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            "lattice_turn_duration_seconds",
            "activity" => activity_id.to_string(),
            "status" => status
        )
        .record(elapsed.as_secs_f64());
        metrics::histogram!("lattice_turn_round_trips", "activity" => activity_id.to_string())
            .record(f64::from(summary.round_trips));
        metrics::counter!("lattice_turn_tokens_total", "activity" => activity_id.to_string())
            .increment(u64::from(summary.usage.total_tokens));
    }

    fn on_connect_failure(&self, activity_id: &str, _providers: &[String], error: &PoolError) {
        metrics::counter!(
            "lattice_turn_connect_failure_total",
            "activity" => activity_id.to_string(),
            "provider" => error.provider.clone()
        )
        .increment(1);
    }

    fn on_hallucination_signal(
        &self,
        activity_id: &str,
        _session_id: &SessionId,
        tool_call: &ToolCall,
        _previous_calls: usize,
    ) {
        metrics::counter!(
            "lattice_turn_hallucination_signal_total",
            "activity" => activity_id.to_string(),
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_empty_output(&self, activity_id: &str, _session_id: &SessionId, finish_reason: &str) {
        metrics::counter!(
            "lattice_turn_empty_output_total",
            "activity" => activity_id.to_string(),
            "finish_reason" => finish_reason.to_string()
        )
        .increment(1);
    }

    fn on_model_error(&self, activity_id: &str, _session_id: &SessionId, error: &ChatError) {
        metrics::counter!(
            "lattice_turn_model_error_total",
            "activity" => activity_id.to_string(),
            "category" => format!("{:?}", error.category)
        )
        .increment(1);
    }
}
