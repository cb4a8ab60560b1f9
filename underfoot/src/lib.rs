//! Underfoot - offline-first cache of regional geologic map packs.
//!
//! This library manages discovery, chunked download, persistent storage,
//! and decomposition of "packs": bundled regional map datasets (vector
//! tile sets plus attribute and citation tables) that let a map viewer
//! render without a live network connection.
//!
//! # Architecture
//!
//! ```text
//! remote catalog (manifest.json + archives)
//!         │
//!         ▼
//!     PackStore ───── persists ────► packStore / prefStore (key-value)
//!         │
//!         ▼
//!       Pack ── unzipped_data() ──► UnzippedPackData ──► renderer
//! ```
//!
//! The [`store::PackStore`] is the single source of truth reconciling the
//! remote catalog with local persistence. Consumers resolve [`pack::Pack`]
//! objects from it and decompose a downloaded pack's compound archive into
//! the typed blobs a renderer consumes.
//!
//! # Example
//!
//! ```ignore
//! use underfoot::store::{DownloadOptions, PackStore, StoreConfig};
//!
//! let store = PackStore::open(StoreConfig::new("/var/lib/underfoot")).await?;
//! store.refresh().await;
//!
//! store.download("us-ca-oakland", DownloadOptions::new()).await?;
//! let pack = store.get("us-ca-oakland").await?.expect("just downloaded");
//! let data = pack.unzipped_data().await?;
//! ```

pub mod kv;
pub mod pack;
pub mod store;
pub mod telemetry;

pub use kv::{KeyValueStore, KvError};
pub use pack::{
    ArchiveError, BoundingBox, Manifest, MapMode, ModeData, Pack, PackMetadata, UnzippedPackData,
};
pub use store::{
    CatalogState, DownloadOptions, DownloadProgress, FetchStatus, PackStore, StoreConfig,
    StoreError,
};

/// Library version, for CLI banners and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
