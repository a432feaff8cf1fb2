//! # Hub: the facade producers and consumers talk to.
//!
//! [`Hub`] is a cheap, cloneable handle to one running dispatcher. It is
//! constructed explicitly and passed to whoever needs it; there is no global
//! instance.
//!
//! ## Architecture
//! ```text
//! Producers (many):                            Consumers (many):
//!   VM op 1 ──┐                                  ┌──► Subscriber A ──► HTTP stream A
//!   VM op 2 ──┼── broadcast(msg) ──► Hub ──► Dispatcher ──┼──► Subscriber B ──► HTTP stream B
//!   Logger  ──┘   (waits for accept)  (intake)   (fan-out) └──► Subscriber N ──► ...
//! ```
//!
//! ## Rules
//! - **Rendezvous intake**: `broadcast` returns once the dispatcher has taken
//!   the request, never later (no waiting for delivery).
//! - **Asynchronous registration**: `register` returns without waiting for the
//!   dispatcher, but every broadcast submitted after it returns reaches the
//!   new subscriber.
//! - **Idempotent unregistration**: unknown or already-removed ids are ignored.
//! - **Slow consumers never fail a broadcast**: they are evicted.
//! - **No replay**: a subscriber only sees messages broadcast while it is active.
//!
//! ## Example
//! ```rust
//! use vmhub::{Hub, HubConfig, Message};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), vmhub::HubError> {
//! let hub = Hub::new(HubConfig::default().with_delivery_capacity(16));
//! let mut sub = hub.register("GET /log").await?;
//!
//! hub.broadcast(Message::info("vm-1", "booting")).await?;
//! let msg = sub.recv().await.expect("still registered");
//! assert_eq!(&*msg.text, "booting");
//!
//! sub.unregister().await;
//! hub.shutdown();
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::config::{Delivery, HubConfig};
use super::dispatcher::{Dispatcher, Request};
use crate::error::HubError;
use crate::messages::Message;
use crate::subscribers::{Subscriber, SubscriberId, SubscriberInfo};

/// Handle to a running event hub.
///
/// Cloning is cheap; all clones talk to the same dispatcher.
#[derive(Clone)]
pub struct Hub {
    intake: mpsc::Sender<Request>,
    token: CancellationToken,
    next_id: Arc<AtomicU64>,
    delivery: Delivery,
}

impl Hub {
    /// Starts a hub with its own cancellation token.
    ///
    /// Must be called from within a Tokio runtime (the dispatcher is spawned).
    pub fn new(cfg: HubConfig) -> Self {
        Self::with_token(cfg, &CancellationToken::new())
    }

    /// Starts a hub whose dispatcher stops when `parent` is cancelled.
    ///
    /// Use this to tie the hub to the daemon's runtime token.
    pub fn with_token(cfg: HubConfig, parent: &CancellationToken) -> Self {
        let token = parent.child_token();
        let (intake, rx) = mpsc::channel(1);
        Dispatcher::new(rx, token.clone()).spawn();

        Self {
            intake,
            token,
            next_id: Arc::new(AtomicU64::new(1)),
            delivery: cfg.delivery_mode(),
        }
    }

    /// Registers a new subscriber with the configured delivery capacity.
    pub async fn register(&self, label: impl Into<Arc<str>>) -> Result<Subscriber, HubError> {
        self.register_as(label.into(), self.delivery).await
    }

    /// Registers a new subscriber with its own delivery capacity (`0` = rendezvous).
    pub async fn register_with_capacity(
        &self,
        label: impl Into<Arc<str>>,
        capacity: usize,
    ) -> Result<Subscriber, HubError> {
        self.register_as(label.into(), Delivery::from_capacity(capacity))
            .await
    }

    async fn register_as(
        &self,
        label: Arc<str>,
        delivery: Delivery,
    ) -> Result<Subscriber, HubError> {
        if self.token.is_cancelled() {
            return Err(HubError::Closed);
        }

        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sub, outlet) = Subscriber::pair(id, label, delivery, self.clone());

        self.intake
            .send(Request::Register(outlet))
            .await
            .map_err(|_| HubError::Closed)?;
        Ok(sub)
    }

    /// Requests removal of a subscriber. Does not wait for confirmation.
    ///
    /// A no-op for ids that are not active, and on a stopped hub.
    pub async fn unregister(&self, id: SubscriberId) {
        if self.token.is_cancelled() {
            return;
        }
        let _ = self.intake.send(Request::Unregister(id)).await;
    }

    /// Submits a message for fan-out to every active subscriber.
    ///
    /// Suspends until the dispatcher accepts the request; does not wait for
    /// delivery. Fails only when the hub is closed.
    pub async fn broadcast(&self, message: Message) -> Result<(), HubError> {
        if self.token.is_cancelled() {
            return Err(HubError::Closed);
        }

        let (accepted, ack) = oneshot::channel();
        self.intake
            .send(Request::Broadcast {
                message: Arc::new(message),
                accepted,
            })
            .await
            .map_err(|_| HubError::Closed)?;
        ack.await.map_err(|_| HubError::Closed)
    }

    /// Blocking variant of [`broadcast`](Self::broadcast) for plain threads.
    ///
    /// # Panics
    /// Panics if called from within an async execution context.
    pub fn blocking_broadcast(&self, message: Message) -> Result<(), HubError> {
        if self.token.is_cancelled() {
            return Err(HubError::Closed);
        }

        let (accepted, ack) = oneshot::channel();
        self.intake
            .blocking_send(Request::Broadcast {
                message: Arc::new(message),
                accepted,
            })
            .map_err(|_| HubError::Closed)?;
        ack.blocking_recv().map_err(|_| HubError::Closed)
    }

    /// Returns the active subscribers, sorted by id.
    ///
    /// Answered by the dispatcher in intake order, so it reflects every
    /// request submitted before it.
    pub async fn subscribers(&self) -> Result<Vec<SubscriberInfo>, HubError> {
        if self.token.is_cancelled() {
            return Err(HubError::Closed);
        }

        let (reply, rx) = oneshot::channel();
        self.intake
            .send(Request::Snapshot(reply))
            .await
            .map_err(|_| HubError::Closed)?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Stops the dispatcher. Every subscriber observes end-of-stream.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the hub no longer accepts requests.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.intake.is_closed()
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("delivery", &self.delivery)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
