//! # Consumer side of the hub.
//!
//! This module provides the [`Subscriber`] handle returned by
//! [`Hub::register`](crate::Hub::register), the [`Sink`] trait for pushing
//! messages out-of-process, and the [`forward`] read loop tying them together.
//!
//! ## Architecture
//! ```text
//! Hub ──► Dispatcher ──► Outlet ──► [queue] ──► Subscriber ──► forward() ──► Sink
//!                                                                        │
//!                                                               ┌────────┴────────┐
//!                                                               ▼                 ▼
//!                                                          NdjsonSink          custom
//! ```
//!
//! ## Implementing custom sinks
//! ```no_run
//! use async_trait::async_trait;
//! use vmhub::{Message, MessageKind, Sink, SinkError};
//!
//! struct ErrorCounter(u64);
//!
//! #[async_trait]
//! impl Sink for ErrorCounter {
//!     async fn send(&mut self, msg: &Message) -> Result<(), SinkError> {
//!         if msg.kind == MessageKind::Error {
//!             self.0 += 1;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod forward;
mod ndjson;
mod subscriber;

pub use forward::{ForwardEnd, ForwardOutcome, Sink, forward};
pub use ndjson::NdjsonSink;
pub use subscriber::{Subscriber, SubscriberId, SubscriberInfo};

pub(crate) use subscriber::{Offer, Outlet};
