//! # Messages broadcast through the hub.
//!
//! A [`Message`] describes one status/log event produced by the daemon or by
//! a VM operation. It has no identity beyond its content: two equal messages
//! are both delivered, nothing is deduplicated.
//!
//! The hub wraps each accepted message in an `Arc`, so every subscriber shares
//! one allocation and nobody can mutate it after submission.
//!
//! ## Wire shape
//! Consumers that stream messages out-of-process use the serde form:
//! ```text
//! {"kind":"info","origin":"vm-web-1","text":"VM is now up"}
//! ```
//!
//! ## Example
//! ```rust
//! use vmhub::{Message, MessageKind};
//!
//! let msg = Message::warning("vm-web-1", "disk is 91% full");
//! assert_eq!(msg.kind, MessageKind::Warning);
//! assert_eq!(&*msg.origin, "vm-web-1");
//! assert!(MessageKind::Warning > MessageKind::Info);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Severity of a message, ordered by increasing severity.
///
/// Never changes delivery semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Trace,
    Info,
    Warning,
    Error,
}

impl MessageKind {
    /// Returns a short stable label (lowercase), same as the serde form.
    pub fn as_label(&self) -> &'static str {
        match self {
            MessageKind::Trace => "trace",
            MessageKind::Info => "info",
            MessageKind::Warning => "warning",
            MessageKind::Error => "error",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::Trace => "TRACE",
            MessageKind::Info => "INFO",
            MessageKind::Warning => "WARNING",
            MessageKind::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One status/log event.
///
/// - `kind`: severity
/// - `origin`: free-text id of the producer (VM name; empty for the daemon itself)
/// - `text`: human-readable payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Severity classification.
    pub kind: MessageKind,
    /// Producing entity.
    pub origin: Arc<str>,
    /// Payload.
    pub text: Arc<str>,
}

impl Message {
    /// Creates a message of the given kind.
    pub fn new(kind: MessageKind, origin: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            origin: origin.into(),
            text: text.into(),
        }
    }

    #[inline]
    pub fn trace(origin: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self::new(MessageKind::Trace, origin, text)
    }

    #[inline]
    pub fn info(origin: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self::new(MessageKind::Info, origin, text)
    }

    #[inline]
    pub fn warning(origin: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self::new(MessageKind::Warning, origin, text)
    }

    #[inline]
    pub fn error(origin: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self::new(MessageKind::Error, origin, text)
    }

    /// Returns `true` if this message is at least as severe as `min`.
    #[inline]
    pub fn is_at_least(&self, min: MessageKind) -> bool {
        self.kind >= min
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.origin.is_empty() {
            write!(f, "{}: {}", self.kind, self.text)
        } else {
            write!(f, "{}: [{}] {}", self.kind, self.origin, self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_ordered_by_severity() {
        assert!(MessageKind::Trace < MessageKind::Info);
        assert!(MessageKind::Info < MessageKind::Warning);
        assert!(MessageKind::Warning < MessageKind::Error);

        let msg = Message::warning("vm-1", "slow disk");
        assert!(msg.is_at_least(MessageKind::Info));
        assert!(msg.is_at_least(MessageKind::Warning));
        assert!(!msg.is_at_least(MessageKind::Error));
    }

    #[test]
    fn test_serde_shape() {
        let msg = Message::info("vm-web-1", "VM is now up");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"kind":"info","origin":"vm-web-1","text":"VM is now up"}"#);

        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_display() {
        assert_eq!(Message::error("", "libvirt gone").to_string(), "ERROR: libvirt gone");
        assert_eq!(
            Message::trace("vm-2", "step 3/7").to_string(),
            "TRACE: [vm-2] step 3/7"
        );
        assert_eq!(MessageKind::Warning.as_label(), "warning");
    }
}
