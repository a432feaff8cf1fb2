//! # NdjsonSink — newline-delimited JSON over any async writer
//!
//! Writes each message as one JSON object per line and flushes, so a client
//! reading a live log stream sees every message as soon as it is broadcast.
//!
//! ## Example output
//! ```text
//! {"kind":"info","origin":"","text":"libvirt connection OK"}
//! {"kind":"trace","origin":"vm-web-1","text":"creating disk"}
//! {"kind":"error","origin":"vm-web-1","text":"domain failed to start"}
//! ```

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::SinkError;
use crate::messages::{Message, MessageKind};
use crate::subscribers::Sink;

/// Streams messages as NDJSON into `W`.
pub struct NdjsonSink<W> {
    writer: W,
    min_kind: MessageKind,
    buf: Vec<u8>,
}

impl<W> NdjsonSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Writes every message.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            min_kind: MessageKind::Trace,
            buf: Vec::with_capacity(256),
        }
    }

    /// Skips messages less severe than `min`.
    #[must_use]
    pub fn with_min_kind(mut self, min: MessageKind) -> Self {
        self.min_kind = min;
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> Sink for NdjsonSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, msg: &Message) -> Result<(), SinkError> {
        if !msg.is_at_least(self.min_kind) {
            return Ok(());
        }

        self.buf.clear();
        serde_json::to_writer(&mut self.buf, msg)?;
        self.buf.push(b'\n');

        self.writer.write_all(&self.buf).await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ndjson"
    }
}
