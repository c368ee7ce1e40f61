//! Hook contracts for observing turn execution.
//!
//! ```rust
//! use lchat::{NoopTurnHooks, TurnHooks};
//!
//! fn accepts_hooks(_hooks: &dyn TurnHooks) {}
//!
//! let hooks = NoopTurnHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use lcommon::SessionId;
use lmodel::{StopReason, TokenUsage, ToolCall};
use lpool::PoolError;

use crate::ChatError;

/// Totals for one finished turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnSummary {
    pub round_trips: u32,
    pub tool_calls: usize,
    pub generated_chars: usize,
    pub stop_reason: Option<StopReason>,
    pub usage: TokenUsage,
    pub failed: bool,
}

pub trait TurnHooks: Send + Sync {
    fn on_turn_start(&self, _activity_id: &str, _session_id: &SessionId) {}

    fn on_turn_finish(
        &self,
        _activity_id: &str,
        _session_id: &SessionId,
        _summary: &TurnSummary,
        _elapsed: Duration,
    ) {
    }

    fn on_connect_failure(&self, _activity_id: &str, _providers: &[String], _error: &PoolError) {}

    /// The same tool was called with identical arguments `previous_calls`
    /// times earlier in this turn.
    fn on_hallucination_signal(
        &self,
        _activity_id: &str,
        _session_id: &SessionId,
        _tool_call: &ToolCall,
        _previous_calls: usize,
    ) {
    }

    fn on_empty_output(&self, _activity_id: &str, _session_id: &SessionId, _finish_reason: &str) {}

    fn on_model_error(&self, _activity_id: &str, _session_id: &SessionId, _error: &ChatError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
