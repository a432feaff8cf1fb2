//! Error types used by the hub and by consumer sinks.
//!
//! This module defines two enums:
//!
//! - [`HubError`] — errors raised by the hub facade itself.
//! - [`SinkError`] — errors raised while forwarding messages out-of-process.
//!
//! Slow-consumer eviction, double unregistration and broadcasting to an empty
//! hub are **not** errors and have no variant here.
//!
//! Both types provide `as_label` for logging.

use thiserror::Error;

/// # Errors produced by the hub facade.
///
/// The hub has no intrinsic fatal condition; the only failure is talking to a
/// hub whose dispatcher has stopped.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The dispatch loop has stopped (explicit shutdown or all handles dropped).
    #[error("hub is closed")]
    Closed,
}

impl HubError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use vmhub::HubError;
    ///
    /// assert_eq!(HubError::Closed.as_label(), "hub_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HubError::Closed => "hub_closed",
        }
    }
}

/// # Errors produced by a [`Sink`](crate::Sink).
///
/// Any of these ends the consumer loop; [`forward`](crate::forward) then
/// unregisters the subscriber.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing to the outbound transport failed.
    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The message could not be encoded for the transport.
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The remote side went away.
    #[error("sink {sink} closed by peer")]
    Closed {
        /// Name of the sink that was closed.
        sink: &'static str,
    },
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Io(_) => "sink_io",
            SinkError::Encode(_) => "sink_encode",
            SinkError::Closed { .. } => "sink_closed",
        }
    }

    /// Returns `true` when the error means the peer disconnected.
    pub fn is_disconnect(&self) -> bool {
        match self {
            SinkError::Closed { .. } => true,
            SinkError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
            ),
            SinkError::Encode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(HubError::Closed.as_label(), "hub_closed");
        assert_eq!(SinkError::Closed { sink: "ndjson" }.as_label(), "sink_closed");
        let io = SinkError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(io.as_label(), "sink_io");
    }

    #[test]
    fn test_disconnect_classification() {
        let pipe = SinkError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(pipe.is_disconnect());

        let other = SinkError::from(std::io::Error::other("disk on fire"));
        assert!(!other.is_disconnect());

        assert!(SinkError::Closed { sink: "ws" }.is_disconnect());
        assert_eq!(
            SinkError::Closed { sink: "ws" }.to_string(),
            "sink ws closed by peer"
        );
    }
}
