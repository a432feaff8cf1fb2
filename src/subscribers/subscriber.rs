//! # Subscriber: one attached observer of the hub.
//!
//! A [`Subscriber`] is created by [`Hub::register`](crate::Hub::register) and
//! owns the **reading** end of its delivery queue. The matching writing end
//! (an [`Outlet`]) lives inside the dispatcher's active set.
//!
//! ## Architecture
//! ```text
//! Dispatcher ── Outlet::offer() ──► [delivery queue] ──► Subscriber::recv() ──► consumer loop
//!   (single writer)                  (bounded mpsc)        (single reader)
//! ```
//!
//! ## Rules
//! - **End-of-stream is terminal**: `recv()` returning `None` means the
//!   subscriber was evicted, unregistered, or the hub stopped. Register again
//!   to get a fresh subscriber.
//! - **Close once**: the dispatcher holds the only sender; removing the
//!   outlet from the active set drops it, and the queue closes.
//! - **Rendezvous readiness**: with capacity 0 the reader arms a flag while it
//!   is parked in `recv`. The dispatcher consumes the flag for each hand-off;
//!   no armed reader means the subscriber is stalled.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::Stream;
use tokio::sync::mpsc;

use crate::core::{Delivery, Hub};
use crate::messages::Message;

/// Hub-unique identity of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(pub(crate) u64);

impl SubscriberId {
    /// Returns the raw numeric id.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Snapshot entry describing one active subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberInfo {
    pub id: SubscriberId,
    pub label: Arc<str>,
    /// Delivery capacity (`0` = rendezvous).
    pub capacity: usize,
}

/// Outcome of a non-blocking delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Offer {
    /// Message enqueued.
    Delivered,
    /// Queue full or reader not waiting: evict.
    Stalled,
    /// Reader dropped its subscriber.
    Gone,
}

impl Offer {
    pub(crate) fn as_reason(&self) -> &'static str {
        match self {
            Offer::Delivered => "delivered",
            Offer::Stalled => "stalled",
            Offer::Gone => "gone",
        }
    }
}

/// Writing end of a subscriber's delivery queue, owned by the dispatcher.
pub(crate) struct Outlet {
    pub(crate) id: SubscriberId,
    pub(crate) label: Arc<str>,
    pub(crate) delivery: Delivery,
    tx: mpsc::Sender<Arc<Message>>,
    ready: Option<Arc<AtomicBool>>,
}

impl Outlet {
    /// Attempts to enqueue without waiting.
    pub(crate) fn offer(&self, msg: &Arc<Message>) -> Offer {
        if let Some(ready) = &self.ready {
            if !ready.swap(false, Ordering::AcqRel) {
                return if self.tx.is_closed() {
                    Offer::Gone
                } else {
                    Offer::Stalled
                };
            }
        }

        match self.tx.try_send(Arc::clone(msg)) {
            Ok(()) => Offer::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => Offer::Stalled,
            Err(mpsc::error::TrySendError::Closed(_)) => Offer::Gone,
        }
    }

    pub(crate) fn info(&self) -> SubscriberInfo {
        SubscriberInfo {
            id: self.id,
            label: Arc::clone(&self.label),
            capacity: self.delivery.capacity(),
        }
    }
}

/// Arms the rendezvous flag for the duration of one receive.
struct Armed<'a>(Option<&'a AtomicBool>);

impl<'a> Armed<'a> {
    fn new(flag: Option<&'a AtomicBool>) -> Self {
        if let Some(f) = flag {
            f.store(true, Ordering::Release);
        }
        Self(flag)
    }
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        if let Some(f) = self.0 {
            f.store(false, Ordering::Release);
        }
    }
}

/// A registered observer with its own bounded delivery queue.
///
/// ### Consumer obligations
/// - Drain continuously; a reader that falls behind is evicted on the next
///   broadcast it cannot take.
/// - Treat `None` from [`recv`](Self::recv) as terminal.
/// - Call [`unregister`](Self::unregister) on client disconnect to stop
///   deliveries nobody will read (optional; dropping works too, it is just
///   reaped later).
pub struct Subscriber {
    id: SubscriberId,
    label: Arc<str>,
    delivery: Delivery,
    rx: mpsc::Receiver<Arc<Message>>,
    ready: Option<Arc<AtomicBool>>,
    hub: Hub,
}

impl Subscriber {
    /// Creates the subscriber and the outlet handed to the dispatcher.
    pub(crate) fn pair(
        id: SubscriberId,
        label: Arc<str>,
        delivery: Delivery,
        hub: Hub,
    ) -> (Subscriber, Outlet) {
        let (tx, rx) = mpsc::channel(delivery.channel_size());
        let ready = match delivery {
            Delivery::Rendezvous => Some(Arc::new(AtomicBool::new(false))),
            Delivery::Buffered(_) => None,
        };

        let outlet = Outlet {
            id,
            label: Arc::clone(&label),
            delivery,
            tx,
            ready: ready.clone(),
        };
        let sub = Subscriber {
            id,
            label,
            delivery,
            rx,
            ready,
            hub,
        };
        (sub, outlet)
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Delivery capacity (`0` = rendezvous).
    pub fn capacity(&self) -> usize {
        self.delivery.capacity()
    }

    /// Waits for the next message.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<Arc<Message>> {
        let _armed = Armed::new(self.ready.as_deref());
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for synchronous readers.
    ///
    /// # Panics
    /// Panics if called from within an async execution context.
    pub fn blocking_recv(&mut self) -> Option<Arc<Message>> {
        let _armed = Armed::new(self.ready.as_deref());
        self.rx.blocking_recv()
    }

    /// Asks the hub to remove this subscriber. Does not wait for confirmation.
    ///
    /// Idempotent: a no-op if already evicted or unregistered.
    pub async fn unregister(&self) {
        self.hub.unregister(self.id).await;
    }

    #[cfg(test)]
    pub(crate) fn ready_flag(&self) -> Option<Arc<AtomicBool>> {
        self.ready.clone()
    }

    /// Converts into a stream that ends when the queue closes.
    pub fn into_stream(self) -> impl Stream<Item = Arc<Message>> + Send + 'static {
        futures::stream::unfold(self, |mut sub| async move {
            let msg = sub.recv().await?;
            Some((msg, sub))
        })
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HubConfig;

    fn detached(delivery: Delivery) -> (Subscriber, Outlet) {
        let hub = Hub::new(HubConfig::default());
        Subscriber::pair(SubscriberId(7), Arc::from("test"), delivery, hub)
    }

    #[tokio::test]
    async fn test_rendezvous_offer_requires_waiting_reader() {
        let (mut sub, outlet) = detached(Delivery::Rendezvous);
        let msg = Arc::new(Message::info("vm", "hello"));

        assert_eq!(outlet.offer(&msg), Offer::Stalled);

        let reader = tokio::spawn(async move { sub.recv().await });
        // wait until the reader is parked
        while !outlet.ready.as_ref().unwrap().load(Ordering::Acquire) {
            tokio::task::yield_now().await;
        }
        assert_eq!(outlet.offer(&msg), Offer::Delivered);

        let got = reader.await.unwrap().unwrap();
        assert_eq!(got.text.as_ref(), "hello");
    }

    #[tokio::test]
    async fn test_buffered_offer_fills_then_stalls() {
        let (mut sub, outlet) = detached(Delivery::Buffered(2));
        let msg = Arc::new(Message::trace("vm", "tick"));

        assert_eq!(outlet.offer(&msg), Offer::Delivered);
        assert_eq!(outlet.offer(&msg), Offer::Delivered);
        assert_eq!(outlet.offer(&msg), Offer::Stalled);

        assert!(sub.recv().await.is_some());
        assert_eq!(outlet.offer(&msg), Offer::Delivered);
    }

    #[tokio::test]
    async fn test_dropped_reader_is_gone() {
        let (sub, outlet) = detached(Delivery::Buffered(1));
        drop(sub);
        let msg = Arc::new(Message::info("vm", "x"));
        assert_eq!(outlet.offer(&msg), Offer::Gone);

        let (sub, outlet) = detached(Delivery::Rendezvous);
        drop(sub);
        assert_eq!(outlet.offer(&msg), Offer::Gone);
    }

    #[tokio::test]
    async fn test_dropping_outlet_ends_stream() {
        let (mut sub, outlet) = detached(Delivery::Buffered(4));
        let msg = Arc::new(Message::info("vm", "last words"));
        assert_eq!(outlet.offer(&msg), Offer::Delivered);
        drop(outlet);

        assert_eq!(sub.recv().await.unwrap().text.as_ref(), "last words");
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_into_stream_ends_with_queue() {
        use futures::StreamExt;

        let (sub, outlet) = detached(Delivery::Buffered(4));
        for text in ["a", "b", "c"] {
            assert_eq!(outlet.offer(&Arc::new(Message::info("vm", text))), Offer::Delivered);
        }
        drop(outlet);

        let texts: Vec<String> = sub
            .into_stream()
            .map(|m| m.text.to_string())
            .collect()
            .await;
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_recv_on_plain_thread() {
        let (mut sub, outlet) = detached(Delivery::Buffered(1));
        assert_eq!(
            outlet.offer(&Arc::new(Message::warning("vm", "sync reader"))),
            Offer::Delivered
        );
        drop(outlet);

        let got = tokio::task::spawn_blocking(move || {
            let first = sub.blocking_recv();
            let second = sub.blocking_recv();
            (first, second)
        })
        .await
        .unwrap();
        assert_eq!(got.0.unwrap().text.as_ref(), "sync reader");
        assert!(got.1.is_none());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(SubscriberId(42).to_string(), "sub-42");
        assert_eq!(SubscriberId(42).get(), 42);
    }
}
