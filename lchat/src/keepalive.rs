//! Keep-alive wrapper for turn streams.
//!
//! A [`TurnEvent::Ping`] is emitted on a fixed cadence for as long as the
//! turn runs, whether or not the model is producing output, so
//! intermediaries do not drop the connection. Nothing is emitted after
//! `Done`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::Stream;
use futures_timer::Delay;
use futures_util::StreamExt;

use crate::{TurnEvent, TurnEventStream};

pub struct KeepAlive<'a> {
    inner: TurnEventStream<'a>,
    interval: Duration,
    tick: Delay,
    finished: bool,
}

impl<'a> KeepAlive<'a> {
    pub fn new(inner: TurnEventStream<'a>, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            tick: Delay::new(interval),
            finished: false,
        }
    }
}

impl Stream for KeepAlive<'_> {
    type Item = TurnEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<TurnEvent>> {
        if self.finished {
            return Poll::Ready(None);
        }

        // The tick is checked first so a chatty model cannot starve it.
        if Pin::new(&mut self.tick).poll(cx).is_ready() {
            let interval = self.interval;
            self.tick.reset(interval);
            return Poll::Ready(Some(TurnEvent::Ping));
        }

        match self.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_done() {
                    self.finished = true;
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_stream::stream;
    use futures_util::StreamExt;

    use super::*;

    #[tokio::test]
    async fn idle_stream_receives_pings_until_done() {
        let inner: TurnEventStream<'static> = Box::pin(stream! {
            tokio::time::sleep(Duration::from_millis(90)).await;
            yield TurnEvent::text("late");
            yield TurnEvent::Done;
            yield TurnEvent::text("ignored");
        });

        let events: Vec<TurnEvent> = KeepAlive::new(inner, Duration::from_millis(20))
            .collect()
            .await;

        let pings = events
            .iter()
            .filter(|event| matches!(event, TurnEvent::Ping))
            .count();
        assert!(pings >= 2, "expected pings while idle, got {events:?}");
        assert_eq!(
            &events[events.len() - 2..],
            &[TurnEvent::text("late"), TurnEvent::Done]
        );
    }

    #[tokio::test]
    async fn pings_keep_their_cadence_while_the_model_streams() {
        let inner: TurnEventStream<'static> = Box::pin(stream! {
            for i in 0..12 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                yield TurnEvent::text(format!("chunk {i}"));
            }
            yield TurnEvent::Done;
        });

        let events: Vec<TurnEvent> = KeepAlive::new(inner, Duration::from_millis(25))
            .collect()
            .await;

        let pings = events
            .iter()
            .filter(|event| matches!(event, TurnEvent::Ping))
            .count();
        assert!(pings >= 2, "expected pings during steady output, got {events:?}");
        assert_eq!(events.len(), 13 + pings);
        assert_eq!(events.last(), Some(&TurnEvent::Done));
    }

    #[tokio::test]
    async fn quick_stream_is_passed_through_without_pings() {
        let inner: TurnEventStream<'static> = Box::pin(futures_util::stream::iter(vec![
            TurnEvent::text("a"),
            TurnEvent::Done,
        ]));

        let events: Vec<TurnEvent> = KeepAlive::new(inner, Duration::from_secs(30))
            .collect()
            .await;

        assert_eq!(events, vec![TurnEvent::text("a"), TurnEvent::Done]);
    }
}
