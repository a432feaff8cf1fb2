//! Status/log messages carried by the hub.
//!
//! ## Contents
//! - [`MessageKind`] severity classification (display/filtering only)
//! - [`Message`] immutable event payload
//!
//! ## Quick reference
//! - **Producers**: VM lifecycle operations, [`Logger`](crate::Logger).
//! - **Consumers**: [`Subscriber`](crate::Subscriber) owners, usually through
//!   [`forward`](crate::forward).

mod message;

pub use message::{Message, MessageKind};
