//! Streaming event contracts and in-memory stream utilities.
//!
//! ```rust
//! use lmodel::{BoxedEventStream, ModelEvent, VecEventStream};
//!
//! let stream = VecEventStream::new(vec![Ok(ModelEvent::TextDelta("hello".into()))]);
//! let _boxed: BoxedEventStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{ModelError, StopReason, TokenUsage, ToolCall, ToolResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    TextDelta(String),
    ReasoningDelta(String),
    /// The model asked for a tool; the orchestrator executes it.
    ToolCallStarted(ToolCall),
    /// A result the client produced itself (provider-side tools).
    ToolCallResult(ToolResult),
    /// An in-band failure reported by the model provider mid-stream.
    Error(ModelError),
    Finish {
        stop_reason: StopReason,
        usage: TokenUsage,
    },
    /// Event kinds this crate does not model; consumers skip them.
    Unknown(String),
}

/// Model stream contract.
///
/// Invariants for consumers:
/// - Events are emitted in generation order.
/// - Deltas and tool-call events may appear zero or more times.
/// - `Finish` closes one round trip and arrives after all related deltas.
/// - An `Err` item means the round trip was aborted; `ModelEvent::Error`
///   means the provider reported a failure but the stream stays readable.
pub trait ModelEventStream: Stream<Item = Result<ModelEvent, ModelError>> + Send {}

impl<T> ModelEventStream for T where T: Stream<Item = Result<ModelEvent, ModelError>> + Send {}

pub type BoxedEventStream<'a> = Pin<Box<dyn ModelEventStream + 'a>>;

#[derive(Debug)]
pub struct VecEventStream {
    events: VecDeque<Result<ModelEvent, ModelError>>,
}

impl VecEventStream {
    pub fn new(events: Vec<Result<ModelEvent, ModelError>>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl Stream for VecEventStream {
    type Item = Result<ModelEvent, ModelError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<ModelEvent, ModelError>>> {
        Poll::Ready(self.events.pop_front())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.events.len(), Some(self.events.len()))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn vec_stream_yields_events_in_order_then_ends() {
        let mut stream = VecEventStream::new(vec![
            Ok(ModelEvent::TextDelta("a".to_string())),
            Ok(ModelEvent::Finish {
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }),
        ]);

        assert_eq!(
            stream.next().await,
            Some(Ok(ModelEvent::TextDelta("a".to_string())))
        );
        assert!(matches!(stream.next().await, Some(Ok(ModelEvent::Finish { .. }))));
        assert_eq!(stream.next().await, None);
    }
}
