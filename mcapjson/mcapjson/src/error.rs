//! Error types for the bag pipeline.

use crate::forward::TransportError;

/// Errors produced by [`BagReader`](crate::BagReader).
///
/// These are failures above the record boundary. Per-record decode
/// failures never surface here; they become fallback records instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error while opening or memory-mapping a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error from the underlying `mcap` crate (bad magic, CRC mismatch, ...).
    #[error(transparent)]
    Mcap(#[from] mcap::McapError),

    /// The MCAP file has no summary section.
    #[error("MCAP summary not available in {path}")]
    SummaryNotAvailable { path: String },

    /// The forwarding transport failed or was closed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An error returned by the user-supplied record callback.
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}
