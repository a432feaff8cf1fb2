//! # Consumer loop: drain a subscriber into an outbound sink.
//!
//! Provides the [`Sink`] trait, the extension point for pushing messages
//! out-of-process (HTTP response body, websocket, file), and [`forward`], the
//! read loop every consumer is expected to run.
//!
//! ## Architecture
//! ```text
//! Subscriber::recv() ──► forward() ──► sink.send(&Message) ──► client
//!        │                    │
//!        └─ None ─► Ended     └─ Err ─► unregister ─► SinkFailed
//! ```
//!
//! ## Rules
//! - The loop must keep up: a sink that is too slow gets the subscriber evicted.
//! - End-of-stream is terminal; `forward` returns and the subscriber is consumed.
//! - A sink error means the client is gone; the subscriber is unregistered
//!   right away so the hub stops delivering to it.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use vmhub::{Message, Sink, SinkError};
//!
//! struct Console;
//!
//! #[async_trait]
//! impl Sink for Console {
//!     async fn send(&mut self, msg: &Message) -> Result<(), SinkError> {
//!         println!("{msg}");
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "console" }
//! }
//! ```

use async_trait::async_trait;
use tracing::debug;

use crate::error::SinkError;
use crate::messages::Message;
use crate::subscribers::Subscriber;

/// Outbound side of a consumer loop.
///
/// ### Implementation requirements
/// - Use async I/O; a blocked sink stalls its subscriber and gets it evicted.
/// - Return an error once the peer is gone; `forward` stops and unregisters.
#[async_trait]
pub trait Sink: Send {
    /// Pushes one message out.
    async fn send(&mut self, msg: &Message) -> Result<(), SinkError>;

    /// Returns the sink name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Why a [`forward`] loop stopped.
#[derive(Debug)]
pub enum ForwardEnd {
    /// The queue closed: evicted, unregistered, or hub stopped.
    Ended,
    /// The sink failed; the subscriber was unregistered.
    SinkFailed(SinkError),
}

/// Summary of a finished [`forward`] loop.
#[derive(Debug)]
pub struct ForwardOutcome {
    /// Messages successfully handed to the sink.
    pub delivered: u64,
    pub end: ForwardEnd,
}

impl ForwardOutcome {
    /// Returns `true` if the loop ended because the queue closed.
    pub fn is_ended(&self) -> bool {
        matches!(self.end, ForwardEnd::Ended)
    }
}

/// Drains `sub` into `sink` until end-of-stream or a sink error.
pub async fn forward<S>(mut sub: Subscriber, sink: &mut S) -> ForwardOutcome
where
    S: Sink + ?Sized,
{
    let mut delivered = 0u64;

    while let Some(msg) = sub.recv().await {
        if let Err(e) = sink.send(&msg).await {
            debug!(
                subscriber = %sub.id(),
                label = sub.label(),
                sink = sink.name(),
                error = %e,
                "sink failed, unregistering"
            );
            sub.unregister().await;
            return ForwardOutcome {
                delivered,
                end: ForwardEnd::SinkFailed(e),
            };
        }
        delivered += 1;
    }

    debug!(
        subscriber = %sub.id(),
        label = sub.label(),
        delivered,
        "subscriber stream ended"
    );
    ForwardOutcome {
        delivered,
        end: ForwardEnd::Ended,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::core::{Hub, HubConfig};

    const WAIT: Duration = Duration::from_secs(5);

    /// Collects texts; fails after `fail_after` messages.
    struct Collect {
        seen: Vec<String>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl Sink for Collect {
        async fn send(&mut self, msg: &Message) -> Result<(), SinkError> {
            if self.fail_after == Some(self.seen.len()) {
                return Err(SinkError::Closed { sink: "collect" });
            }
            self.seen.push(msg.text.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[tokio::test]
    async fn test_forward_until_unregistered() {
        let hub = Hub::new(HubConfig::default().with_delivery_capacity(8));
        let sub = hub.register("forward").await.unwrap();
        let id = sub.id();

        let task = tokio::spawn(async move {
            let mut sink = Collect {
                seen: Vec::new(),
                fail_after: None,
            };
            let outcome = forward(sub, &mut sink).await;
            (outcome, sink.seen)
        });

        hub.broadcast(Message::info("vm", "one")).await.unwrap();
        hub.broadcast(Message::info("vm", "two")).await.unwrap();
        hub.unregister(id).await;

        let (outcome, seen) = timeout(WAIT, task).await.unwrap().unwrap();
        assert!(outcome.is_ended());
        assert_eq!(outcome.delivered, 2);
        assert_eq!(seen, ["one", "two"]);
    }

    #[tokio::test]
    async fn test_sink_failure_unregisters_subscriber() {
        let hub = Hub::new(HubConfig::default().with_delivery_capacity(8));
        let sub = hub.register("flaky-client").await.unwrap();

        hub.broadcast(Message::info("vm", "ok")).await.unwrap();
        hub.broadcast(Message::info("vm", "boom")).await.unwrap();

        let mut sink = Collect {
            seen: Vec::new(),
            fail_after: Some(1),
        };
        let outcome = timeout(WAIT, forward(sub, &mut sink)).await.unwrap();

        assert_eq!(outcome.delivered, 1);
        match outcome.end {
            ForwardEnd::SinkFailed(e) => assert_eq!(e.as_label(), "sink_closed"),
            ForwardEnd::Ended => panic!("expected sink failure"),
        }
        assert!(hub.subscribers().await.unwrap().is_empty());
    }
}
