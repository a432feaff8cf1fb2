//! # Dispatcher: the single serial owner of the active subscriber set.
//!
//! The dispatcher is one spawned task reading the hub's intake. Every request
//! (register, unregister, broadcast, snapshot) is handled to completion before
//! the next one is taken, so a fan-out never interleaves with a membership
//! change.
//!
//! ## Architecture
//! ```text
//! Hub::register()   ──┐
//! Hub::unregister() ──┼──► [intake: mpsc(1)] ──► Dispatcher::run()
//! Hub::broadcast()  ──┤     (FIFO, one total      ├─► Register(outlet)  → active.insert
//! Hub::subscribers()──┘      order)               ├─► Unregister(id)    → active.remove (closes queue)
//!                                                 ├─► Broadcast(msg)    → ack, then fan_out(msg)
//!                                                 └─► Snapshot(reply)   → reply with active set
//!
//! fan_out(msg):
//!   for each outlet in active:
//!       offer(msg) ─┬─ Delivered → keep
//!                   ├─ Stalled   → remove (evict, queue closed)
//!                   └─ Gone      → remove (reader dropped)
//! ```
//!
//! ## Rules
//! - Only this task touches `active`; no locks.
//! - Removing an outlet drops the queue's only sender: closing happens exactly once.
//! - On stop (cancellation or every `Hub` handle dropped) all queues are closed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::messages::Message;
use crate::subscribers::{Offer, Outlet, SubscriberId, SubscriberInfo};

/// Requests accepted on the hub intake.
pub(crate) enum Request {
    Register(Outlet),
    Unregister(SubscriberId),
    Broadcast {
        message: Arc<Message>,
        /// Fired as soon as the request is dequeued.
        accepted: oneshot::Sender<()>,
    },
    Snapshot(oneshot::Sender<Vec<SubscriberInfo>>),
}

pub(crate) struct Dispatcher {
    active: HashMap<SubscriberId, Outlet>,
    intake: mpsc::Receiver<Request>,
    token: CancellationToken,
}

impl Dispatcher {
    pub(crate) fn new(intake: mpsc::Receiver<Request>, token: CancellationToken) -> Self {
        Self {
            active: HashMap::new(),
            intake,
            token,
        }
    }

    /// Spawns the dispatch loop onto the current runtime.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        info!("hub dispatcher started");

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                req = self.intake.recv() => match req {
                    Some(req) => self.handle(req),
                    None => break,
                },
            }
        }

        self.intake.close();
        let remaining = self.active.len();
        self.active.clear();
        info!(subscribers = remaining, "hub dispatcher stopped");
    }

    fn handle(&mut self, req: Request) {
        match req {
            Request::Register(outlet) => self.register(outlet),
            Request::Unregister(id) => self.unregister(id),
            Request::Broadcast { message, accepted } => {
                let _ = accepted.send(());
                self.fan_out(&message);
            }
            Request::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn register(&mut self, outlet: Outlet) {
        debug!(
            subscriber = %outlet.id,
            label = %outlet.label,
            capacity = outlet.delivery.capacity(),
            "subscriber registered"
        );
        self.active.insert(outlet.id, outlet);
    }

    fn unregister(&mut self, id: SubscriberId) {
        if let Some(outlet) = self.active.remove(&id) {
            debug!(subscriber = %id, label = %outlet.label, "subscriber unregistered");
        }
    }

    fn fan_out(&mut self, message: &Arc<Message>) {
        self.active.retain(|id, outlet| match outlet.offer(message) {
            Offer::Delivered => true,
            offer => {
                debug!(
                    subscriber = %id,
                    label = %outlet.label,
                    reason = offer.as_reason(),
                    "subscriber evicted"
                );
                false
            }
        });
    }

    fn snapshot(&self) -> Vec<SubscriberInfo> {
        let mut list: Vec<SubscriberInfo> = self.active.values().map(Outlet::info).collect();
        list.sort_unstable_by_key(|info| info.id);
        list
    }
}
