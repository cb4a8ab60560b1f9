//! Chunked archive download with progress and cancellation.
//!
//! One download moves through idle → in-flight → completed, aborted, or
//! failed. While in flight, the loop pulls chunks in arrival order and
//! appends each at the running offset, so the assembled buffer is exactly
//! the concatenation of the body. When the response advertised a total
//! length, the progress callback fires after every chunk with cumulative
//! received bytes; without one, no progress is reported, since there is no
//! denominator to report against.
//!
//! Cancellation is cooperative: the caller's `CancellationToken` is
//! checked before every chunk, and a cancelled download fails with the
//! distinguished [`StoreError::Aborted`] so the caller can reset silently
//! instead of surfacing a transport error.

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use super::error::{StoreError, StoreResult};
use super::remote::ArchiveResponse;

/// Progress of one in-flight download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Cumulative bytes received so far.
    pub received_bytes: u64,
    /// Total expected bytes, from the response's advertised length.
    pub total_bytes: u64,
}

impl DownloadProgress {
    /// Progress as a ratio (0.0 to 1.0).
    pub fn ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.received_bytes as f64 / self.total_bytes as f64
        }
    }

    /// Progress as a percentage.
    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }
}

/// Progress callback for a download.
pub type ProgressCallback = Box<dyn Fn(DownloadProgress) + Send + Sync>;

/// Options for one download call.
///
/// Each call owns its options: a token cancels only the download it was
/// passed to, and each concurrent download reports through its own
/// callback.
#[derive(Default)]
pub struct DownloadOptions {
    pub(super) on_progress: Option<ProgressCallback>,
    pub(super) cancel: Option<CancellationToken>,
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress through `callback` after every received chunk.
    pub fn with_progress(
        mut self,
        callback: impl Fn(DownloadProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Cancel the download when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Drain a streaming response into one contiguous buffer.
///
/// The loop terminates only when the stream signals completion; a chunk
/// error or cancellation fails the download instead.
pub(super) async fn collect_chunks(
    response: ArchiveResponse,
    cancel: &CancellationToken,
    on_progress: Option<&ProgressCallback>,
) -> StoreResult<Bytes> {
    let ArchiveResponse {
        total_bytes,
        mut chunks,
    } = response;

    let mut received = match total_bytes {
        Some(total) => BytesMut::with_capacity(total as usize),
        None => BytesMut::new(),
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Aborted),
            next = chunks.next() => next,
        };
        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk?;
        received.extend_from_slice(&chunk);
        if let (Some(total), Some(callback)) = (total_bytes, on_progress) {
            callback(DownloadProgress {
                received_bytes: received.len() as u64,
                total_bytes: total,
            });
        }
    }

    Ok(received.freeze())
}
