//! Observable store state, sliced per concern.
//!
//! Consumers subscribe to the slice they render (the current pack id, or
//! the catalog) and are only woken when that slice changes. Mutating one
//! slice never notifies the other slice's subscribers, so a pack-selection
//! change cannot force catalog consumers to recompute and vice versa.
//!
//! Each slice is a `tokio::sync::watch` channel: reads are cheap borrows,
//! subscribers get the latest value plus change notification, and sending
//! does not require any receiver to exist.

use std::sync::Arc;

use tokio::sync::watch;

use crate::pack::Manifest;

/// Outcome of the most recent manifest fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No fetch has been attempted yet.
    #[default]
    NotFetched,
    /// The last fetch attempt succeeded.
    Fetched,
    /// The last fetch attempt failed; see [`CatalogState::error`].
    Failed,
}

/// The catalog slice: the manifest plus the health of its last fetch.
///
/// A failed fetch keeps any previously fetched manifest so consumers can
/// keep rendering stale-but-real catalog data, and records the failure so
/// offline-specific messaging is possible. "Catalog is genuinely empty"
/// and "catalog fetch failed" are distinguishable via [`FetchStatus`].
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    /// The most recently fetched manifest, if any fetch has succeeded.
    pub manifest: Option<Arc<Manifest>>,
    /// Outcome of the most recent fetch attempt.
    pub status: FetchStatus,
    /// Message of the most recent fetch error, cleared on success.
    pub error: Option<String>,
}

impl CatalogState {
    /// Whether the last fetch attempt failed.
    pub fn is_degraded(&self) -> bool {
        self.status == FetchStatus::Failed
    }
}

/// The pack store's observable slices.
#[derive(Debug)]
pub(super) struct StoreSignals {
    current: watch::Sender<Option<String>>,
    catalog: watch::Sender<CatalogState>,
}

impl StoreSignals {
    pub(super) fn new(current_pack_id: Option<String>) -> Self {
        Self {
            current: watch::Sender::new(current_pack_id),
            catalog: watch::Sender::new(CatalogState::default()),
        }
    }

    /// Read the current pack id without subscribing.
    pub(super) fn current_pack_id(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub(super) fn set_current_pack_id(&self, pack_id: Option<String>) {
        self.current.send_replace(pack_id);
    }

    /// Read the catalog slice without subscribing.
    pub(super) fn catalog(&self) -> CatalogState {
        self.catalog.borrow().clone()
    }

    /// Replace the catalog wholesale after a successful fetch.
    pub(super) fn set_manifest(&self, manifest: Manifest) {
        self.catalog.send_replace(CatalogState {
            manifest: Some(Arc::new(manifest)),
            status: FetchStatus::Fetched,
            error: None,
        });
    }

    /// Record a failed fetch attempt, keeping any previous manifest.
    pub(super) fn record_fetch_failure(&self, message: String) {
        self.catalog.send_modify(|state| {
            state.status = FetchStatus::Failed;
            state.error = Some(message);
        });
    }

    /// The manifest from the most recent successful fetch, if any.
    pub(super) fn manifest(&self) -> Option<Arc<Manifest>> {
        self.catalog.borrow().manifest.clone()
    }

    pub(super) fn watch_current_pack_id(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    pub(super) fn watch_catalog(&self) -> watch::Receiver<CatalogState> {
        self.catalog.subscribe()
    }
}
