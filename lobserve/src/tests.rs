use std::sync::{Arc, Mutex};
use std::time::Duration;

use lchat::{ChatError, TurnHooks, TurnSummary};
use lcommon::SessionId;
use lmodel::{StopReason, ToolCall};
use lpool::{PoolError, PoolHooks, ProtocolError};
use ltooling::{
    ToolExecutionContext, ToolExecutionResult, ToolFailure, ToolFailureKind, ToolOutput,
    ToolRuntimeHooks,
};
use serde_json::json;

use crate::{
    MetricsObservabilityHooks, SafePoolHooks, SafeToolHooks, SafeTurnHooks,
    TracingObservabilityHooks,
};

fn sample_tool_call() -> ToolCall {
    ToolCall::new("call-1", "trivia_ask", json!({ "topic": "space" }))
}

fn sample_tool_context() -> ToolExecutionContext {
    ToolExecutionContext::new("trivia:alice").with_trace_id("trace-1")
}

fn sample_result() -> ToolExecutionResult {
    ToolExecutionResult::new(
        sample_tool_call(),
        ToolOutput::text("ok"),
        Duration::from_millis(20),
    )
}

fn sample_failure() -> ToolFailure {
    ToolFailure {
        kind: ToolFailureKind::RemoteError,
        content: Vec::new(),
    }
}

fn sample_pool_error() -> PoolError {
    PoolError::connect("web", ProtocolError::connect("connection refused"))
}

fn sample_summary() -> TurnSummary {
    TurnSummary {
        round_trips: 2,
        tool_calls: 1,
        generated_chars: 40,
        stop_reason: Some(StopReason::EndTurn),
        ..TurnSummary::default()
    }
}

fn exercise_pool_hooks(hooks: &dyn PoolHooks) {
    hooks.on_connect_start("web");
    hooks.on_connect_success("web", 3, Duration::from_millis(12));
    hooks.on_connect_failure("web", &sample_pool_error(), Duration::from_millis(12));
    hooks.on_connection_reused("web");
    hooks.on_disconnect("web");
}

fn exercise_tool_hooks(hooks: &dyn ToolRuntimeHooks) {
    hooks.on_execution_start(&sample_tool_call(), &sample_tool_context());
    hooks.on_execution_success(
        &sample_tool_call(),
        &sample_tool_context(),
        &sample_result(),
        Duration::from_millis(20),
    );
    hooks.on_execution_failure(
        &sample_tool_call(),
        &sample_tool_context(),
        &sample_failure(),
        Duration::from_millis(20),
    );
}

fn exercise_turn_hooks(hooks: &dyn TurnHooks) {
    let session = SessionId::from("trivia:alice");
    hooks.on_turn_start("trivia", &session);
    hooks.on_connect_failure("trivia", &["web".to_string()], &sample_pool_error());
    hooks.on_hallucination_signal("trivia", &session, &sample_tool_call(), 2);
    hooks.on_empty_output("trivia", &session, "stop");
    hooks.on_model_error("trivia", &session, &ChatError::model("429 Too Many Requests"));
    hooks.on_turn_finish("trivia", &session, &sample_summary(), Duration::from_millis(50));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    let hooks = TracingObservabilityHooks;
    exercise_pool_hooks(&hooks);
    exercise_tool_hooks(&hooks);
    exercise_turn_hooks(&hooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    let hooks = MetricsObservabilityHooks;
    exercise_pool_hooks(&hooks);
    exercise_tool_hooks(&hooks);
    exercise_turn_hooks(&hooks);
}

#[derive(Default, Clone)]
struct Recording {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl Recording {
    fn push(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }

    fn count(&self) -> usize {
        self.events.lock().expect("events lock").len()
    }
}

impl PoolHooks for Recording {
    fn on_connect_start(&self, _provider: &str) {
        self.push("connect_start");
    }

    fn on_connect_success(&self, _provider: &str, _tool_count: usize, _elapsed: Duration) {
        self.push("connect_success");
    }

    fn on_connect_failure(&self, _provider: &str, _error: &PoolError, _elapsed: Duration) {
        self.push("connect_failure");
    }

    fn on_connection_reused(&self, _provider: &str) {
        self.push("reused");
    }

    fn on_disconnect(&self, _provider: &str) {
        self.push("disconnect");
    }
}

impl ToolRuntimeHooks for Recording {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        self.push("start");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
        self.push("success");
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _failure: &ToolFailure,
        _elapsed: Duration,
    ) {
        self.push("failure");
    }
}

impl TurnHooks for Recording {
    fn on_turn_start(&self, _activity_id: &str, _session_id: &SessionId) {
        self.push("turn_start");
    }

    fn on_turn_finish(
        &self,
        _activity_id: &str,
        _session_id: &SessionId,
        _summary: &TurnSummary,
        _elapsed: Duration,
    ) {
        self.push("turn_finish");
    }

    fn on_connect_failure(&self, _activity_id: &str, _providers: &[String], _error: &PoolError) {
        self.push("turn_connect_failure");
    }

    fn on_hallucination_signal(
        &self,
        _activity_id: &str,
        _session_id: &SessionId,
        _tool_call: &ToolCall,
        _previous_calls: usize,
    ) {
        self.push("hallucination");
    }

    fn on_empty_output(&self, _activity_id: &str, _session_id: &SessionId, _finish_reason: &str) {
        self.push("empty_output");
    }

    fn on_model_error(&self, _activity_id: &str, _session_id: &SessionId, _error: &ChatError) {
        self.push("model_error");
    }
}

struct Panicking;

impl PoolHooks for Panicking {
    fn on_connect_start(&self, _provider: &str) {
        panic!("connect_start panic");
    }

    fn on_connect_success(&self, _provider: &str, _tool_count: usize, _elapsed: Duration) {
        panic!("connect_success panic");
    }

    fn on_connect_failure(&self, _provider: &str, _error: &PoolError, _elapsed: Duration) {
        panic!("connect_failure panic");
    }

    fn on_connection_reused(&self, _provider: &str) {
        panic!("reused panic");
    }

    fn on_disconnect(&self, _provider: &str) {
        panic!("disconnect panic");
    }
}

impl ToolRuntimeHooks for Panicking {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        panic!("start panic");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
        panic!("success panic");
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _failure: &ToolFailure,
        _elapsed: Duration,
    ) {
        panic!("failure panic");
    }
}

impl TurnHooks for Panicking {
    fn on_turn_start(&self, _activity_id: &str, _session_id: &SessionId) {
        panic!("turn_start panic");
    }

    fn on_turn_finish(
        &self,
        _activity_id: &str,
        _session_id: &SessionId,
        _summary: &TurnSummary,
        _elapsed: Duration,
    ) {
        panic!("turn_finish panic");
    }

    fn on_connect_failure(&self, _activity_id: &str, _providers: &[String], _error: &PoolError) {
        panic!("turn_connect_failure panic");
    }

    fn on_hallucination_signal(
        &self,
        _activity_id: &str,
        _session_id: &SessionId,
        _tool_call: &ToolCall,
        _previous_calls: usize,
    ) {
        panic!("hallucination panic");
    }

    fn on_empty_output(&self, _activity_id: &str, _session_id: &SessionId, _finish_reason: &str) {
        panic!("empty_output panic");
    }

    fn on_model_error(&self, _activity_id: &str, _session_id: &SessionId, _error: &ChatError) {
        panic!("model_error panic");
    }
}

#[test]
fn safe_hooks_delegate_when_inner_succeeds() {
    let inner = Recording::default();

    exercise_pool_hooks(&SafePoolHooks::new(inner.clone()));
    assert_eq!(inner.count(), 5);

    exercise_tool_hooks(&SafeToolHooks::new(inner.clone()));
    assert_eq!(inner.count(), 8);

    exercise_turn_hooks(&SafeTurnHooks::new(inner.clone()));
    assert_eq!(inner.count(), 14);
}

#[test]
fn safe_hooks_swallow_panics() {
    exercise_pool_hooks(&SafePoolHooks::new(Panicking));
    exercise_tool_hooks(&SafeToolHooks::new(Panicking));
    exercise_turn_hooks(&SafeTurnHooks::new(Panicking));
}
