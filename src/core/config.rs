//! # Hub configuration.
//!
//! Provides [`HubConfig`], the settings of one hub instance.
//!
//! ## Sentinel values
//! - `delivery_capacity = 0` → rendezvous delivery: a message is handed over
//!   only if the subscriber's reader is waiting right now, otherwise the
//!   subscriber is evicted.
//!
//! The struct deserializes with defaults, so it can be embedded in a larger
//! daemon config file:
//! ```toml
//! [hub]
//! delivery_capacity = 16
//! ```

use serde::Deserialize;

/// How a subscriber's delivery queue accepts messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Hand-off only to a reader parked in `recv`; otherwise evict.
    Rendezvous,
    /// Buffer up to `n` undelivered messages; evict when full.
    Buffered(usize),
}

impl Delivery {
    /// Builds the mode from a raw capacity (`0` = rendezvous).
    #[inline]
    pub fn from_capacity(capacity: usize) -> Self {
        match capacity {
            0 => Delivery::Rendezvous,
            n => Delivery::Buffered(n),
        }
    }

    /// Returns the raw capacity (`0` for rendezvous).
    #[inline]
    pub fn capacity(&self) -> usize {
        match self {
            Delivery::Rendezvous => 0,
            Delivery::Buffered(n) => *n,
        }
    }

    /// Returns the size of the underlying channel buffer.
    ///
    /// Rendezvous still needs one slot to park the handed-over message.
    #[inline]
    pub(crate) fn channel_size(&self) -> usize {
        self.capacity().max(1)
    }
}

/// Configuration for a [`Hub`](crate::Hub).
///
/// ## Field semantics
/// - `delivery_capacity`: per-subscriber queue size (`0` = rendezvous, eager eviction)
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Default capacity of each subscriber's delivery queue.
    ///
    /// - `0` = no buffering; a subscriber whose reader is not waiting when a
    ///   broadcast is fanned out gets evicted
    /// - `n > 0` = up to `n` messages may wait; eviction when the queue is full
    ///
    /// Can be overridden per subscriber with
    /// [`Hub::register_with_capacity`](crate::Hub::register_with_capacity).
    pub delivery_capacity: usize,
}

impl HubConfig {
    /// Returns the default delivery mode for new subscribers.
    #[inline]
    pub fn delivery_mode(&self) -> Delivery {
        Delivery::from_capacity(self.delivery_capacity)
    }

    /// Sets the default delivery capacity.
    pub fn with_delivery_capacity(mut self, capacity: usize) -> Self {
        self.delivery_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rendezvous() {
        let cfg = HubConfig::default();
        assert_eq!(cfg.delivery_capacity, 0);
        assert_eq!(cfg.delivery_mode(), Delivery::Rendezvous);
        assert_eq!(cfg.delivery_mode().channel_size(), 1);
    }

    #[test]
    fn test_buffered_mode() {
        let cfg = HubConfig::default().with_delivery_capacity(8);
        assert_eq!(cfg.delivery_mode(), Delivery::Buffered(8));
        assert_eq!(cfg.delivery_mode().channel_size(), 8);
        assert_eq!(cfg.delivery_mode().capacity(), 8);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let cfg: HubConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.delivery_capacity, 0);

        let cfg: HubConfig = serde_json::from_str(r#"{"delivery_capacity":4}"#).unwrap();
        assert_eq!(cfg.delivery_mode(), Delivery::Buffered(4));
    }
}
