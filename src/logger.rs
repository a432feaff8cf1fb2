//! # Logger — leveled producer on top of the hub
//!
//! The daemon and every VM operation log through a [`Logger`]. Each call
//! emits a `tracing` record at the matching level (for the process's own log
//! output) and broadcasts the same text to the hub (for live observers).
//!
//! | MessageKind | tracing level |
//! |-------------|---------------|
//! | `Trace`     | `TRACE`       |
//! | `Info`      | `INFO`        |
//! | `Warning`   | `WARN`        |
//! | `Error`     | `ERROR`       |
//!
//! Broadcasting may suspend until the dispatcher accepts the message, so do
//! not hold locks across these calls. Delivery is never assumed: a closed hub
//! is ignored.
//!
//! ## Example
//! ```rust
//! use vmhub::{Hub, HubConfig, Logger};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let hub = Hub::new(HubConfig::default());
//! let log = Logger::new(hub.clone());
//! log.info("libvirt connection OK").await;
//!
//! let vm_log = log.with_origin("vm-web-1");
//! vm_log.warning("SSH public key not found").await;
//! # }
//! ```

use std::sync::Arc;

use crate::core::Hub;
use crate::messages::{Message, MessageKind};

/// Leveled logger broadcasting to a [`Hub`].
#[derive(Clone, Debug)]
pub struct Logger {
    hub: Hub,
    origin: Arc<str>,
}

impl Logger {
    /// Creates a logger for the daemon itself (empty origin).
    pub fn new(hub: Hub) -> Self {
        Self {
            hub,
            origin: Arc::from(""),
        }
    }

    /// Returns a logger on the same hub with another origin (usually a VM name).
    pub fn with_origin(&self, origin: impl Into<Arc<str>>) -> Self {
        Self {
            hub: self.hub.clone(),
            origin: origin.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Logs `text` at `kind`.
    pub async fn log(&self, kind: MessageKind, text: impl Into<Arc<str>>) {
        let text = text.into();
        let origin = &*self.origin;
        match kind {
            MessageKind::Trace => tracing::trace!(origin, "{text}"),
            MessageKind::Info => tracing::info!(origin, "{text}"),
            MessageKind::Warning => tracing::warn!(origin, "{text}"),
            MessageKind::Error => tracing::error!(origin, "{text}"),
        }

        let msg = Message::new(kind, Arc::clone(&self.origin), text);
        let _ = self.hub.broadcast(msg).await;
    }

    #[inline]
    pub async fn trace(&self, text: impl Into<Arc<str>>) {
        self.log(MessageKind::Trace, text).await;
    }

    #[inline]
    pub async fn info(&self, text: impl Into<Arc<str>>) {
        self.log(MessageKind::Info, text).await;
    }

    #[inline]
    pub async fn warning(&self, text: impl Into<Arc<str>>) {
        self.log(MessageKind::Warning, text).await;
    }

    #[inline]
    pub async fn error(&self, text: impl Into<Arc<str>>) {
        self.log(MessageKind::Error, text).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::core::HubConfig;

    #[tokio::test]
    async fn test_levels_and_origins_reach_subscribers() {
        let hub = Hub::new(HubConfig::default().with_delivery_capacity(8));
        let mut sub = hub.register("log viewer").await.unwrap();

        let log = Logger::new(hub.clone());
        let vm = log.with_origin("vm-db-2");
        assert_eq!(vm.origin(), "vm-db-2");

        log.trace("log system available").await;
        log.info(format!("found {} VM(s) in database", 3)).await;
        vm.warning("libvirt UUID mismatch").await;
        vm.error("database checking failure").await;

        let mut got = Vec::new();
        for _ in 0..4 {
            got.push(timeout(Duration::from_secs(5), sub.recv()).await.unwrap().unwrap());
        }

        let kinds: Vec<MessageKind> = got.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            [
                MessageKind::Trace,
                MessageKind::Info,
                MessageKind::Warning,
                MessageKind::Error
            ]
        );
        assert_eq!(&*got[0].origin, "");
        assert_eq!(&*got[1].text, "found 3 VM(s) in database");
        assert_eq!(&*got[2].origin, "vm-db-2");
    }

    #[tokio::test]
    async fn test_logging_to_closed_hub_is_silent() {
        let hub = Hub::new(HubConfig::default());
        hub.shutdown();

        let log = Logger::new(hub);
        timeout(Duration::from_secs(5), log.error("still fine"))
            .await
            .unwrap();
    }
}
