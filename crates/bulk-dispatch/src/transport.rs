//! Transport abstraction for bulk payloads.
//!
//! The coordinator only needs to hand a payload over and learn whether it
//! was accepted. [`HttpTransport`](crate::HttpTransport) talks to a real index
//! store; [`StdoutTransport`] prints payloads instead of sending them and
//! [`NoopTransport`] discards them (dry run).

use crate::error::TransportError;
use async_trait::async_trait;
use bulk_generator::BulkPayload;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// What the transport learned from a delivered payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStatus {
    /// HTTP status code, or 0 when there is no server.
    pub status: u16,
    /// Server-side processing time reported in the response.
    pub took_ms: Option<u64>,
    /// The server accepted the request but flagged item-level errors.
    pub item_errors: bool,
}

impl TransportStatus {
    /// Status of a payload that never left the process.
    pub const LOCAL: TransportStatus = TransportStatus {
        status: 0,
        took_ms: None,
        item_errors: false,
    };
}

/// Fields of a bulk response we care about.
#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    pub took: Option<u64>,
    #[serde(default)]
    pub errors: bool,
}

/// Delivers bulk payloads to the index store.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one payload.
    async fn send(&self, payload: &BulkPayload) -> Result<TransportStatus, TransportError>;

    /// Make the written documents searchable. A no-op unless the transport
    /// talks to a real store.
    async fn refresh(&self, _indices: &[String]) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Discards every payload.
#[derive(Debug, Default)]
pub struct NoopTransport {
    bytes: AtomicU64,
}

impl NoopTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes handed to this transport.
    pub fn bytes_discarded(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for NoopTransport {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn send(&self, payload: &BulkPayload) -> Result<TransportStatus, TransportError> {
        self.bytes.fetch_add(payload.len() as u64, Ordering::Relaxed);
        Ok(TransportStatus::LOCAL)
    }
}

/// Writes every payload to stdout prefixed with `Message: `.
///
/// Any other async writer can stand in for stdout via
/// [`with_writer`](Self::with_writer).
#[derive(Debug)]
pub struct StdoutTransport<W = tokio::io::Stdout> {
    out: Mutex<W>,
}

impl StdoutTransport {
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout())
    }
}

impl Default for StdoutTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StdoutTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Transport for StdoutTransport<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn send(&self, payload: &BulkPayload) -> Result<TransportStatus, TransportError> {
        // One lock per payload keeps concurrent payloads from interleaving.
        let mut out = self.out.lock().await;
        out.write_all(b"Message: ").await?;
        out.write_all(payload.as_bytes()).await?;
        out.flush().await?;
        Ok(TransportStatus::LOCAL)
    }
}
