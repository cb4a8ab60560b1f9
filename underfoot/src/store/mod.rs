//! The pack store: single source of truth for pack discovery, download,
//! persistence, and selection.
//!
//! The store reconciles two sources, the remote catalog manifest and the
//! local persistent stores, and hands out [`Pack`] objects to consumers:
//!
//! ```text
//! RemoteCatalog ──fetch──► PackStore ◄──get/set── KeyValueStore ("packStore")
//!                              │                  KeyValueStore ("prefStore")
//!                              ▼
//!                       Pack ──unzipped_data()──► UnzippedPackData
//! ```
//!
//! Catalog fetch failures are captured as observable state on the catalog
//! slice, never thrown: a dead network must not interrupt callers working
//! against already-downloaded packs. Requests for a specific pack id fail
//! loudly instead, because the caller has a specific expectation to react
//! to.

mod config;
mod download;
mod error;
mod remote;
mod signals;

pub use config::{StoreConfig, DEFAULT_BASE_URL, MANIFEST_FILE};
pub use download::{DownloadOptions, DownloadProgress, ProgressCallback};
pub use error::{StoreError, StoreResult};
pub use remote::{ArchiveResponse, ChunkStream, HttpCatalog, RemoteCatalog};
pub use signals::{CatalogState, FetchStatus};

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::kv::{DiskStore, KeyValueStore};
use crate::pack::{Pack, PackMetadata};

use signals::StoreSignals;

/// Preference key holding the current pack id.
const CURRENT_PACK_KEY: &str = "currentPackId";

/// Persisted shape of a downloaded pack: full metadata plus the archive.
///
/// The record is only ever an interchange shape: reading one back goes
/// through [`Pack::new`] so the result is a fully-capable entity, never a
/// bag of raw fields.
#[derive(Serialize, Deserialize)]
struct StoredPack {
    metadata: PackMetadata,
    data: Vec<u8>,
}

/// Removes a pack id from the in-flight registry when a download ends,
/// however it ends.
struct InFlightGuard<'a> {
    registry: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

/// Orchestrates pack discovery, download, persistence, and selection.
pub struct PackStore {
    remote: Arc<dyn RemoteCatalog>,
    packs: Arc<dyn KeyValueStore>,
    prefs: Arc<dyn KeyValueStore>,
    signals: StoreSignals,
    in_flight: Mutex<HashSet<String>>,
}

impl PackStore {
    /// Create a store from explicit collaborators.
    ///
    /// Loads the persisted current-pack id into the observable slice
    /// before returning, so subscribers see the last session's selection
    /// immediately.
    pub async fn new(
        remote: Arc<dyn RemoteCatalog>,
        packs: Arc<dyn KeyValueStore>,
        prefs: Arc<dyn KeyValueStore>,
    ) -> StoreResult<Self> {
        let current = read_current_pack_id(prefs.as_ref()).await?;
        Ok(Self {
            remote,
            packs,
            prefs,
            signals: StoreSignals::new(current),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// Open a store with the production collaborators: an HTTP catalog
    /// client and disk-backed `packStore`/`prefStore` namespaces under the
    /// configured data directory.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        let remote = Arc::new(HttpCatalog::new(&config)?);
        let packs = Arc::new(DiskStore::open(config.pack_store_dir()).await?);
        let prefs = Arc::new(DiskStore::open(config.pref_store_dir()).await?);
        Self::new(remote, packs, prefs).await
    }

    /// Fetch the catalog manifest, replacing the previous view wholesale.
    ///
    /// Fetch failure is not an error from the caller's point of view: it
    /// is recorded on the catalog slice (status, message) and the previous
    /// manifest, if any, is kept. Returns the catalog state after the
    /// attempt.
    pub async fn refresh(&self) -> CatalogState {
        match self.remote.fetch_manifest().await {
            Ok(manifest) => {
                debug!(packs = manifest.packs().len(), "fetched manifest");
                self.signals.set_manifest(manifest);
            }
            Err(e) => {
                warn!(error = %e, "manifest fetch failed");
                self.signals.record_fetch_failure(e.to_string());
            }
        }
        self.signals.catalog()
    }

    /// The catalog slice: latest manifest plus fetch status and last error.
    pub fn catalog(&self) -> CatalogState {
        self.signals.catalog()
    }

    /// Subscribe to catalog changes. Selection changes do not wake these
    /// subscribers.
    pub fn watch_catalog(&self) -> watch::Receiver<CatalogState> {
        self.signals.watch_catalog()
    }

    /// Subscribe to current-pack selection changes. Catalog changes do not
    /// wake these subscribers.
    pub fn watch_current_pack_id(&self) -> watch::Receiver<Option<String>> {
        self.signals.watch_current_pack_id()
    }

    /// Read the persisted current-pack id. No side effects.
    pub async fn current_pack_id(&self) -> StoreResult<Option<String>> {
        read_current_pack_id(self.prefs.as_ref()).await
    }

    /// Resolve a pack by id.
    ///
    /// The local store wins: a downloaded pack is rehydrated into a full
    /// entity (archive decomposition available). Otherwise the most
    /// recently fetched manifest is searched. Absent from both sources is
    /// `Ok(None)`; the store never fabricates a pack.
    pub async fn get(&self, pack_id: &str) -> StoreResult<Option<Pack>> {
        if let Some(raw) = self.packs.get(pack_id).await? {
            let record: StoredPack =
                bincode::deserialize(&raw).map_err(|e| StoreError::StoredPack {
                    id: pack_id.to_string(),
                    reason: e.to_string(),
                })?;
            // Rehydrate through the constructor so the result is a full
            // entity, not just the stored fields.
            return Ok(Some(Pack::new(
                record.metadata,
                Some(Bytes::from(record.data)),
            )));
        }

        let manifest = self.signals.manifest();
        Ok(manifest.and_then(|m| m.find(pack_id).cloned()))
    }

    /// List the catalog packs that can be downloaded, falling back to the
    /// local listing when that yields nothing.
    ///
    /// Online, this is every manifest pack with a remote archive path,
    /// each resolved through [`get`](Self::get) so downloaded packs carry
    /// their data. When the catalog view is empty (never fetched, fetch
    /// failed, or genuinely without packs) the result degrades to
    /// [`list_local`](Self::list_local): offline users still see what is
    /// on the device. Consumers that need to distinguish "empty catalog"
    /// from "fetch failed" read [`catalog`](Self::catalog).
    pub async fn list(&self) -> StoreResult<Vec<Pack>> {
        let mut packs = Vec::new();
        if let Some(manifest) = self.signals.manifest() {
            for entry in manifest.packs() {
                if entry.pmtiles_path.is_none() {
                    continue;
                }
                if let Some(pack) = self.get(&entry.id).await? {
                    packs.push(pack);
                }
            }
        }
        if packs.is_empty() {
            packs = self.list_local().await?;
        }
        Ok(packs)
    }

    /// List every pack present in the local store.
    pub async fn list_local(&self) -> StoreResult<Vec<Pack>> {
        let mut packs = Vec::new();
        for pack_id in self.packs.keys().await? {
            if let Some(pack) = self.get(&pack_id).await? {
                packs.push(pack);
            }
        }
        Ok(packs)
    }

    /// Download a pack's archive and persist it locally.
    ///
    /// The archive streams chunk by chunk; see [`DownloadOptions`] for
    /// progress reporting and cancellation. On success the pack is
    /// persisted under its id and, if no pack was current yet, becomes the
    /// current pack.
    ///
    /// # Errors
    ///
    /// - [`StoreError::PackNotFound`] if the id is unknown to both sources
    /// - [`StoreError::NoRemoteArchive`] if the catalog lists no archive
    /// - [`StoreError::DownloadInProgress`] if this id is already being
    ///   downloaded (downloads of different ids proceed independently)
    /// - [`StoreError::Aborted`] if the caller's token was cancelled;
    ///   nothing is persisted and the selection is untouched
    /// - transport failures propagate; retry policy is the caller's
    pub async fn download(&self, pack_id: &str, options: DownloadOptions) -> StoreResult<()> {
        let pack = self
            .get(pack_id)
            .await?
            .ok_or_else(|| StoreError::PackNotFound {
                id: pack_id.to_string(),
            })?;
        let remote_path =
            pack.pmtiles_path
                .clone()
                .ok_or_else(|| StoreError::NoRemoteArchive {
                    id: pack_id.to_string(),
                })?;

        let _guard = self.claim_download(pack_id)?;
        let cancel = options.cancel.clone().unwrap_or_default();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Aborted),
            response = self.remote.fetch_archive(&remote_path) => response?,
        };
        let data =
            download::collect_chunks(response, &cancel, options.on_progress.as_ref()).await?;
        debug!(pack_id, bytes = data.len(), "downloaded pack archive");

        let record = StoredPack {
            metadata: pack.metadata().clone(),
            data: data.to_vec(),
        };
        let encoded = bincode::serialize(&record).map_err(|e| StoreError::StoredPack {
            id: pack_id.to_string(),
            reason: e.to_string(),
        })?;
        self.packs.set(pack_id, encoded).await?;

        if self.signals.current_pack_id().is_none() {
            self.set_current(Some(pack_id)).await?;
        }
        Ok(())
    }

    /// Delete a pack's persisted archive.
    ///
    /// If the removed pack was current, the selection is cleared, in
    /// memory and in the preference store.
    pub async fn remove(&self, pack_id: &str) -> StoreResult<()> {
        self.packs.remove(pack_id).await?;
        if self.signals.current_pack_id().as_deref() == Some(pack_id) {
            self.set_current(None).await?;
        }
        Ok(())
    }

    /// Change the current pack selection.
    ///
    /// `None` clears the selection by removing the persisted key; a null
    /// is never stored. Persistence happens before the in-memory slice is
    /// updated, so the published value never runs ahead of durable state.
    pub async fn set_current(&self, pack_id: Option<&str>) -> StoreResult<()> {
        match pack_id {
            Some(id) => {
                self.prefs
                    .set(CURRENT_PACK_KEY, id.as_bytes().to_vec())
                    .await?;
            }
            None => {
                self.prefs.remove(CURRENT_PACK_KEY).await?;
            }
        }
        self.signals
            .set_current_pack_id(pack_id.map(str::to_string));
        Ok(())
    }

    /// Register `pack_id` as in flight, rejecting a duplicate download.
    fn claim_download(&self, pack_id: &str) -> StoreResult<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(pack_id.to_string()) {
            return Err(StoreError::DownloadInProgress {
                id: pack_id.to_string(),
            });
        }
        Ok(InFlightGuard {
            registry: &self.in_flight,
            id: pack_id.to_string(),
        })
    }
}

/// Read and decode the persisted current-pack id.
async fn read_current_pack_id(prefs: &dyn KeyValueStore) -> StoreResult<Option<String>> {
    let Some(raw) = prefs.get(CURRENT_PACK_KEY).await? else {
        return Ok(None);
    };
    match String::from_utf8(raw) {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            warn!("persisted current pack id is not valid UTF-8, ignoring");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use futures::stream;
    use futures::StreamExt;
    use tokio_util::sync::CancellationToken;

    use crate::kv::{BoxFuture, MemoryStore};
    use crate::pack::{BoundingBox, Manifest, RemoteManifest};

    use super::*;

    fn sample_metadata(id: &str) -> PackMetadata {
        PackMetadata {
            admin1: "California".to_string(),
            admin2: "Alameda".to_string(),
            bbox: BoundingBox {
                top: 37.9,
                bottom: 37.6,
                left: -122.4,
                right: -122.0,
            },
            description: "East Bay geology".to_string(),
            id: id.to_string(),
            name: "Oakland".to_string(),
            path: None,
            pmtiles_path: Some(format!("packs/{}.zip", id)),
            updated_at: "2024-05-01T00:00:00Z".to_string(),
        }
    }

    fn manifest_of(metadata: Vec<PackMetadata>) -> Manifest {
        Manifest::from_wire(RemoteManifest {
            packs: metadata,
            updated_at: "2024-05-02T08:30:00Z".to_string(),
        })
        .unwrap()
    }

    /// Scripted archive served by [`ScriptedCatalog`].
    #[derive(Clone)]
    struct ScriptedArchive {
        chunks: Vec<Bytes>,
        advertise_total: bool,
        /// Cancel this token instead of producing a chunk after the
        /// scripted ones, then stall. Exercises mid-stream cancellation.
        cancel_after_chunks: Option<CancellationToken>,
        /// Never end the stream after the scripted chunks.
        stall: bool,
    }

    impl ScriptedArchive {
        fn of_sizes(sizes: &[usize]) -> Self {
            Self {
                chunks: sizes.iter().map(|&n| Bytes::from(vec![7u8; n])).collect(),
                advertise_total: true,
                cancel_after_chunks: None,
                stall: false,
            }
        }
    }

    /// Scripted [`RemoteCatalog`] for driving the store without a server.
    #[derive(Default)]
    struct ScriptedCatalog {
        manifest: Option<Manifest>,
        archives: HashMap<String, ScriptedArchive>,
    }

    impl ScriptedCatalog {
        fn with_manifest(manifest: Manifest) -> Self {
            Self {
                manifest: Some(manifest),
                ..Default::default()
            }
        }

        fn serve(mut self, path: impl Into<String>, archive: ScriptedArchive) -> Self {
            self.archives.insert(path.into(), archive);
            self
        }
    }

    impl RemoteCatalog for ScriptedCatalog {
        fn fetch_manifest(&self) -> BoxFuture<'_, StoreResult<Manifest>> {
            let result = self
                .manifest
                .clone()
                .ok_or_else(|| StoreError::ManifestFetch {
                    url: "https://catalog.test/manifest.json".to_string(),
                    reason: "connection refused".to_string(),
                });
            Box::pin(async move { result })
        }

        fn fetch_archive(&self, path: &str) -> BoxFuture<'_, StoreResult<ArchiveResponse>> {
            let archive = self.archives.get(path).cloned();
            let url = format!("https://catalog.test/{}", path);
            Box::pin(async move {
                let archive = archive.ok_or(StoreError::DownloadFailed {
                    url,
                    reason: "GET request failed with status 404".to_string(),
                })?;
                let total: usize = archive.chunks.iter().map(Bytes::len).sum();
                let scripted = stream::iter(
                    archive
                        .chunks
                        .into_iter()
                        .map(StoreResult::Ok)
                        .collect::<Vec<_>>(),
                );
                let chunks: ChunkStream = if let Some(token) = archive.cancel_after_chunks {
                    Box::pin(scripted.chain(stream::once(async move {
                        token.cancel();
                        futures::future::pending::<StoreResult<Bytes>>().await
                    })))
                } else if archive.stall {
                    Box::pin(scripted.chain(stream::pending()))
                } else {
                    Box::pin(scripted)
                };
                Ok(ArchiveResponse {
                    total_bytes: archive.advertise_total.then_some(total as u64),
                    chunks,
                })
            })
        }
    }

    async fn store_with(remote: ScriptedCatalog) -> PackStore {
        PackStore::new(
            Arc::new(remote),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_unknown_is_none() {
        let store = store_with(ScriptedCatalog::default()).await;

        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_from_manifest_is_catalog_only() {
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]));
        let store = store_with(remote).await;
        store.refresh().await;

        let pack = store.get("us-ca-oakland").await.unwrap().unwrap();
        assert!(!pack.is_downloaded());
        assert_eq!(pack.name, "Oakland");
    }

    #[tokio::test]
    async fn test_download_persists_and_rehydrates() {
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve(
                    "packs/us-ca-oakland.zip",
                    ScriptedArchive::of_sizes(&[100, 250, 150]),
                );
        let store = store_with(remote).await;
        store.refresh().await;

        store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap();

        let pack = store.get("us-ca-oakland").await.unwrap().unwrap();
        assert!(pack.is_downloaded());
        assert_eq!(pack.zipped_data().unwrap().len(), 500);
        // Metadata survives the store round trip intact
        assert_eq!(pack.metadata(), &sample_metadata("us-ca-oakland"));
    }

    #[tokio::test]
    async fn test_download_reports_cumulative_progress() {
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve(
                    "packs/us-ca-oakland.zip",
                    ScriptedArchive::of_sizes(&[100, 250, 150]),
                );
        let store = store_with(remote).await;
        store.refresh().await;

        let seen: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_in_callback = Arc::clone(&seen);
        let options = DownloadOptions::new().with_progress(move |p| {
            seen_in_callback
                .lock()
                .push((p.received_bytes, p.total_bytes));
        });

        store.download("us-ca-oakland", options).await.unwrap();

        assert_eq!(*seen.lock(), vec![(100, 500), (350, 500), (500, 500)]);
    }

    #[tokio::test]
    async fn test_download_unknown_pack_fails() {
        let store = store_with(ScriptedCatalog::default()).await;

        let err = store
            .download("nope", DownloadOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PackNotFound { ref id } if id == "nope"));
    }

    #[tokio::test]
    async fn test_download_without_remote_archive_fails() {
        let mut metadata = sample_metadata("us-ca-oakland");
        metadata.pmtiles_path = None;
        let remote = ScriptedCatalog::with_manifest(manifest_of(vec![metadata]));
        let store = store_with(remote).await;
        store.refresh().await;

        let err = store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoRemoteArchive { .. }));
    }

    #[tokio::test]
    async fn test_first_download_becomes_current() {
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve("packs/us-ca-oakland.zip", ScriptedArchive::of_sizes(&[10]));
        let store = store_with(remote).await;
        store.refresh().await;

        store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap();

        assert_eq!(
            store.current_pack_id().await.unwrap().as_deref(),
            Some("us-ca-oakland")
        );
        assert_eq!(
            store.watch_current_pack_id().borrow().as_deref(),
            Some("us-ca-oakland")
        );
    }

    #[tokio::test]
    async fn test_download_keeps_existing_current() {
        let remote = ScriptedCatalog::with_manifest(manifest_of(vec![
            sample_metadata("us-ca-oakland"),
            sample_metadata("us-or-portland"),
        ]))
        .serve("packs/us-or-portland.zip", ScriptedArchive::of_sizes(&[10]));
        let store = store_with(remote).await;
        store.refresh().await;
        store.set_current(Some("us-ca-oakland")).await.unwrap();

        store
            .download("us-or-portland", DownloadOptions::new())
            .await
            .unwrap();

        assert_eq!(
            store.current_pack_id().await.unwrap().as_deref(),
            Some("us-ca-oakland")
        );
    }

    #[tokio::test]
    async fn test_cancelled_download_persists_nothing() {
        let token = CancellationToken::new();
        let archive = ScriptedArchive {
            chunks: vec![Bytes::from(vec![7u8; 100])],
            advertise_total: true,
            cancel_after_chunks: Some(token.clone()),
            stall: false,
        };
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve("packs/us-ca-oakland.zip", archive);
        let store = store_with(remote).await;
        store.refresh().await;

        let err = store
            .download(
                "us-ca-oakland",
                DownloadOptions::new().with_cancel(token),
            )
            .await
            .unwrap_err();

        assert!(err.is_aborted());
        // Nothing persisted for the aborted id
        let pack = store.get("us-ca-oakland").await.unwrap().unwrap();
        assert!(!pack.is_downloaded());
        // Selection untouched
        assert!(store.current_pack_id().await.unwrap().is_none());
        assert!(store.watch_current_pack_id().borrow().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_same_id_download_rejected() {
        let token = CancellationToken::new();
        let stalled = ScriptedArchive {
            chunks: vec![Bytes::from(vec![7u8; 10])],
            advertise_total: true,
            cancel_after_chunks: None,
            stall: true,
        };
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve("packs/us-ca-oakland.zip", stalled);
        let store = Arc::new(store_with(remote).await);
        store.refresh().await;

        // First download stalls after one chunk until its token fires.
        let first = {
            let store = Arc::clone(&store);
            let token = token.clone();
            tokio::spawn(async move {
                store
                    .download(
                        "us-ca-oakland",
                        DownloadOptions::new().with_cancel(token),
                    )
                    .await
            })
        };

        // Wait until the first call holds the in-flight claim. The stream
        // stalls, so the claim cannot be released before we observe it.
        while !store.in_flight.lock().contains("us-ca-oakland") {
            tokio::task::yield_now().await;
        }

        let err = store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DownloadInProgress { .. }));

        token.cancel();
        let first_result = first.await.unwrap();
        assert!(first_result.unwrap_err().is_aborted());
        // The claim is released once the first download ends.
        assert!(store.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_remove_clears_current_when_current() {
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve("packs/us-ca-oakland.zip", ScriptedArchive::of_sizes(&[10]));
        let store = store_with(remote).await;
        store.refresh().await;
        store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap();

        store.remove("us-ca-oakland").await.unwrap();

        assert!(store.current_pack_id().await.unwrap().is_none());
        assert!(store.watch_current_pack_id().borrow().is_none());
        let pack = store.get("us-ca-oakland").await.unwrap().unwrap();
        assert!(!pack.is_downloaded());
    }

    #[tokio::test]
    async fn test_remove_keeps_current_when_not_current() {
        let remote = ScriptedCatalog::with_manifest(manifest_of(vec![
            sample_metadata("us-ca-oakland"),
            sample_metadata("us-or-portland"),
        ]))
        .serve("packs/us-ca-oakland.zip", ScriptedArchive::of_sizes(&[10]))
        .serve("packs/us-or-portland.zip", ScriptedArchive::of_sizes(&[10]));
        let store = store_with(remote).await;
        store.refresh().await;
        store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap();
        store
            .download("us-or-portland", DownloadOptions::new())
            .await
            .unwrap();

        store.remove("us-or-portland").await.unwrap();

        assert_eq!(
            store.current_pack_id().await.unwrap().as_deref(),
            Some("us-ca-oakland")
        );
    }

    #[tokio::test]
    async fn test_set_current_none_removes_persisted_key() {
        let prefs = Arc::new(MemoryStore::new());
        let store = PackStore::new(
            Arc::new(ScriptedCatalog::default()),
            Arc::new(MemoryStore::new()),
            Arc::clone(&prefs) as Arc<dyn KeyValueStore>,
        )
        .await
        .unwrap();

        store.set_current(Some("us-ca-oakland")).await.unwrap();
        assert!(prefs.get(CURRENT_PACK_KEY).await.unwrap().is_some());

        store.set_current(None).await.unwrap();

        // The key is gone entirely, not stored as a null sentinel.
        assert!(prefs.get(CURRENT_PACK_KEY).await.unwrap().is_none());
        assert!(store.current_pack_id().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_loads_persisted_selection() {
        let prefs = Arc::new(MemoryStore::new());
        prefs
            .set(CURRENT_PACK_KEY, b"us-ca-oakland".to_vec())
            .await
            .unwrap();

        let store = PackStore::new(
            Arc::new(ScriptedCatalog::default()),
            Arc::new(MemoryStore::new()),
            prefs,
        )
        .await
        .unwrap();

        assert_eq!(
            store.watch_current_pack_id().borrow().as_deref(),
            Some("us-ca-oakland")
        );
    }

    #[tokio::test]
    async fn test_list_resolves_manifest_packs_through_local_store() {
        let remote = ScriptedCatalog::with_manifest(manifest_of(vec![
            sample_metadata("us-ca-oakland"),
            sample_metadata("us-or-portland"),
        ]))
        .serve("packs/us-ca-oakland.zip", ScriptedArchive::of_sizes(&[10]));
        let store = store_with(remote).await;
        store.refresh().await;
        store
            .download("us-ca-oakland", DownloadOptions::new())
            .await
            .unwrap();

        let packs = store.list().await.unwrap();

        assert_eq!(packs.len(), 2);
        let oakland = packs.iter().find(|p| p.id == "us-ca-oakland").unwrap();
        let portland = packs.iter().find(|p| p.id == "us-or-portland").unwrap();
        assert!(oakland.is_downloaded());
        assert!(!portland.is_downloaded());
    }

    #[tokio::test]
    async fn test_list_skips_packs_without_remote_archive() {
        let mut local_only = sample_metadata("us-wa-seattle");
        local_only.pmtiles_path = None;
        let remote = ScriptedCatalog::with_manifest(manifest_of(vec![
            sample_metadata("us-ca-oakland"),
            local_only,
        ]));
        let store = store_with(remote).await;
        store.refresh().await;

        let packs = store.list().await.unwrap();

        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].id, "us-ca-oakland");
    }

    #[tokio::test]
    async fn test_list_falls_back_to_local_when_catalog_empty() {
        // Manifest has zero packs with a remote path
        let mut no_path = sample_metadata("us-wa-seattle");
        no_path.pmtiles_path = None;
        let remote = ScriptedCatalog::with_manifest(manifest_of(vec![no_path]));
        let store = store_with(remote).await;
        store.refresh().await;

        // Seed a locally stored pack directly
        let record = StoredPack {
            metadata: sample_metadata("us-ca-oakland"),
            data: vec![1, 2, 3],
        };
        store
            .packs
            .set("us-ca-oakland", bincode::serialize(&record).unwrap())
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        let local = store.list_local().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(local.len(), 1);
        assert_eq!(listed[0].id, local[0].id);
    }

    #[tokio::test]
    async fn test_list_falls_back_when_fetch_failed() {
        let store = store_with(ScriptedCatalog::default()).await;
        store.refresh().await;

        let record = StoredPack {
            metadata: sample_metadata("us-ca-oakland"),
            data: vec![1, 2, 3],
        };
        store
            .packs
            .set("us-ca-oakland", bincode::serialize(&record).unwrap())
            .await
            .unwrap();

        let packs = store.list().await.unwrap();

        assert_eq!(packs.len(), 1);
        assert!(packs[0].is_downloaded());
    }

    #[tokio::test]
    async fn test_refresh_failure_is_observable_state() {
        let store = store_with(ScriptedCatalog::default()).await;

        let catalog = store.refresh().await;

        assert_eq!(catalog.status, FetchStatus::Failed);
        assert!(catalog.is_degraded());
        assert!(catalog.error.unwrap().contains("connection refused"));
        // Local operations keep working against the degraded catalog
        assert!(store.list_local().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_success_replaces_catalog() {
        let remote =
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]));
        let store = store_with(remote).await;

        let catalog = store.refresh().await;

        assert_eq!(catalog.status, FetchStatus::Fetched);
        assert!(catalog.error.is_none());
        assert_eq!(catalog.manifest.unwrap().packs().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_stored_record_is_an_error() {
        let store = store_with(ScriptedCatalog::default()).await;
        store
            .packs
            .set("us-ca-oakland", vec![0xde, 0xad])
            .await
            .unwrap();

        let err = store.get("us-ca-oakland").await.unwrap_err();
        assert!(matches!(err, StoreError::StoredPack { .. }));
    }

    #[tokio::test]
    async fn test_store_reload_preserves_downloaded_pack() {
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let config = StoreConfig::new(temp.path());
        let remote = || {
            ScriptedCatalog::with_manifest(manifest_of(vec![sample_metadata("us-ca-oakland")]))
                .serve("packs/us-ca-oakland.zip", ScriptedArchive::of_sizes(&[64]))
        };

        {
            let store = PackStore::new(
                Arc::new(remote()),
                Arc::new(DiskStore::open(config.pack_store_dir()).await.unwrap()),
                Arc::new(DiskStore::open(config.pref_store_dir()).await.unwrap()),
            )
            .await
            .unwrap();
            store.refresh().await;
            store
                .download("us-ca-oakland", DownloadOptions::new())
                .await
                .unwrap();
        }

        // Simulated restart: fresh store over the same directories, no
        // manifest fetched.
        let store = PackStore::new(
            Arc::new(ScriptedCatalog::default()),
            Arc::new(DiskStore::open(config.pack_store_dir()).await.unwrap()),
            Arc::new(DiskStore::open(config.pref_store_dir()).await.unwrap()),
        )
        .await
        .unwrap();

        let pack = store.get("us-ca-oakland").await.unwrap().unwrap();
        assert!(pack.is_downloaded());
        assert_eq!(pack.zipped_data().unwrap().len(), 64);
        assert_eq!(
            store.watch_current_pack_id().borrow().as_deref(),
            Some("us-ca-oakland")
        );
    }
}
