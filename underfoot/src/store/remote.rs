//! Network access to the remote catalog.
//!
//! The `RemoteCatalog` trait is the store's seam to the network. It keeps
//! HTTP concerns (status codes, timeouts, content length, body streaming)
//! out of the orchestration logic and lets tests drive the store with
//! scripted manifests and chunk streams instead of a live server.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use futures_util::TryStreamExt;

use crate::kv::BoxFuture;
use crate::pack::{Manifest, RemoteManifest};

use super::config::{StoreConfig, MANIFEST_FILE};
use super::error::{StoreError, StoreResult};

/// Stream of archive chunks in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = StoreResult<Bytes>> + Send>>;

/// A streaming response for one pack archive.
pub struct ArchiveResponse {
    /// Total expected bytes, when the server advertised a content length.
    /// Progress can only be reported as a fraction when this is known.
    pub total_bytes: Option<u64>,
    /// The body, chunk by chunk.
    pub chunks: ChunkStream,
}

/// Remote side of the pack store: the catalog document and pack archives.
///
/// # Dyn Compatibility
///
/// Async methods return `Pin<Box<dyn Future>>` so the store can hold an
/// `Arc<dyn RemoteCatalog>` and swap in a scripted implementation in tests.
pub trait RemoteCatalog: Send + Sync {
    /// Fetch and validate the catalog manifest.
    ///
    /// Implementations perform schema validation at this boundary; a
    /// malformed document is an error here, never a half-parsed manifest.
    fn fetch_manifest(&self) -> BoxFuture<'_, StoreResult<Manifest>>;

    /// Open a streaming download of the archive at `path` (relative to
    /// the catalog base URL).
    fn fetch_archive(&self, path: &str) -> BoxFuture<'_, StoreResult<ArchiveResponse>>;
}

/// HTTP implementation of [`RemoteCatalog`] using reqwest.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalog {
    /// Create a catalog client from store configuration.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            StoreError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl RemoteCatalog for HttpCatalog {
    fn fetch_manifest(&self) -> BoxFuture<'_, StoreResult<Manifest>> {
        let url = self.url_for(MANIFEST_FILE);
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| StoreError::ManifestFetch {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(StoreError::ManifestFetch {
                    url,
                    reason: format!("GET request failed with status {}", status),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| StoreError::ManifestFetch {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            let wire: RemoteManifest =
                serde_json::from_slice(&body).map_err(|e| StoreError::ManifestParse {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            Manifest::from_wire(wire).map_err(|e| StoreError::ManifestParse {
                url,
                reason: format!("bad updated_at timestamp: {}", e),
            })
        })
    }

    fn fetch_archive(&self, path: &str) -> BoxFuture<'_, StoreResult<ArchiveResponse>> {
        let url = self.url_for(path);
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| self.map_send_error(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(StoreError::DownloadFailed {
                    url,
                    reason: format!("GET request failed with status {}", status),
                });
            }

            let total_bytes = response.content_length();
            let chunk_url = url.clone();
            let chunks = response
                .bytes_stream()
                .map_err(move |e| StoreError::DownloadFailed {
                    url: chunk_url.clone(),
                    reason: format!("read error: {}", e),
                });

            Ok(ArchiveResponse {
                total_bytes,
                chunks: Box::pin(chunks),
            })
        })
    }
}
