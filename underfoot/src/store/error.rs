//! Error types for the pack store.

use thiserror::Error;

use crate::kv::KvError;

/// Result type for pack store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during pack store operations.
///
/// The taxonomy follows who needs to react:
/// - Catalog fetch problems (`ManifestFetch`/`ManifestParse`) are recorded
///   on the catalog slice as observable state, never returned from
///   [`refresh`](crate::store::PackStore::refresh); they must not
///   interrupt callers working against local data.
/// - Resolution problems (`PackNotFound`, `NoRemoteArchive`,
///   `DownloadInProgress`) are returned, because the caller named a
///   specific pack and must know the request failed.
/// - `Aborted` is the distinguished cancellation outcome; callers reset
///   silently instead of surfacing it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to fetch the catalog manifest.
    #[error("failed to fetch manifest from {url}: {reason}")]
    ManifestFetch { url: String, reason: String },

    /// The catalog manifest did not match the expected schema.
    #[error("failed to parse manifest from {url}: {reason}")]
    ManifestParse { url: String, reason: String },

    /// No pack with the requested id exists locally or in the catalog.
    #[error("pack not found: {id}")]
    PackNotFound { id: String },

    /// The pack exists but the catalog lists no archive for it.
    #[error("pack {id} has no remote archive")]
    NoRemoteArchive { id: String },

    /// Another download of the same pack is already in flight.
    #[error("download of pack {id} is already in progress")]
    DownloadInProgress { id: String },

    /// Failed to download a pack archive.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Network timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The download was cancelled by its caller.
    #[error("download aborted")]
    Aborted,

    /// Failed to build the HTTP client.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Persistent store failure.
    #[error("persistent store error: {0}")]
    Store(#[from] KvError),

    /// A persisted pack record could not be decoded.
    #[error("failed to decode stored pack {id}: {reason}")]
    StoredPack { id: String, reason: String },
}

impl StoreError {
    /// Whether this failure is a cooperative cancellation.
    ///
    /// Cancellation must be handled distinctly from transport failure: the
    /// UI resets silently instead of showing an error. The `Display` text
    /// also matches "aborted" for callers classifying by message.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
