//! # vmhub
//!
//! **vmhub** is the in-process event broadcast hub of a VM control-plane
//! daemon.
//!
//! Many concurrent VM-lifecycle operations (and the daemon's own leveled
//! logger) produce status/log messages; the hub fans them out, live, to any
//! number of streaming observers such as long-lived HTTP connections.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  VM op #1    │   │  VM op #2    │   │    Logger    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──── broadcast(Message) (waits for accept) ─┘
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Hub (cloneable handle) ──► intake: mpsc(1), FIFO                 │
//! │                               │                                   │
//! │  Dispatcher (one task)  ◄─────┘                                   │
//! │  - owns HashMap<SubscriberId, Outlet> (no locks)                  │
//! │  - Register / Unregister / Broadcast / Snapshot, one at a time    │
//! │  - fan-out: non-blocking offer to every outlet; stalled → evicted │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   [queue A]          [queue B]          [queue N]       (bounded, or rendezvous)
//!        ▼                  ▼                  ▼
//!   Subscriber A       Subscriber B       Subscriber N
//!        └─ forward() ──► Sink (NDJSON over HTTP, ...)
//! ```
//!
//! ### Delivery policy
//! ```text
//! fan_out(msg):
//!   for each active subscriber:
//!     ├─ enqueue succeeds immediately  ─► keep
//!     ├─ would block (full / not ready) ─► close queue, remove (eviction)
//!     └─ reader dropped                 ─► remove
//! ```
//! Eviction is not an error: the consumer just sees end-of-stream. A
//! broadcast never fails because of a slow consumer.
//!
//! ## Features
//! | Area           | Description                                             | Key types                          |
//! |----------------|---------------------------------------------------------|------------------------------------|
//! | **Hub**        | Register/unregister observers, broadcast messages.      | [`Hub`], [`HubConfig`]             |
//! | **Messages**   | Immutable status/log events with severity.              | [`Message`], [`MessageKind`]       |
//! | **Consumers**  | Read loop and outbound sinks.                           | [`Subscriber`], [`Sink`], [`forward`], [`NdjsonSink`] |
//! | **Logging**    | Leveled producer mirrored to `tracing`.                 | [`Logger`]                         |
//! | **Errors**     | Typed errors for the hub and sinks.                     | [`HubError`], [`SinkError`]        |
//!
//! ## Example
//! ```rust
//! use vmhub::{Hub, HubConfig, Logger, NdjsonSink, forward};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Hub::new(HubConfig::default().with_delivery_capacity(16));
//!
//!     // A consumer, e.g. one per streaming HTTP response.
//!     let sub = hub.register("GET /log").await?;
//!     let consumer = tokio::spawn(async move {
//!         let mut sink = NdjsonSink::new(tokio::io::sink());
//!         forward(sub, &mut sink).await
//!     });
//!
//!     // Producers.
//!     let log = Logger::new(hub.clone()).with_origin("vm-web-1");
//!     log.info("creating VM").await;
//!     log.trace("disk allocated").await;
//!
//!     hub.shutdown();
//!     let outcome = consumer.await?;
//!     assert!(outcome.is_ended());
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod logger;
mod messages;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Delivery, Hub, HubConfig};
pub use error::{HubError, SinkError};
pub use logger::Logger;
pub use messages::{Message, MessageKind};
pub use subscribers::{
    ForwardEnd, ForwardOutcome, NdjsonSink, Sink, Subscriber, SubscriberId, SubscriberInfo,
    forward,
};
