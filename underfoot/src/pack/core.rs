//! Pack metadata and the pack entity.
//!
//! [`PackMetadata`] is the immutable record a pack is known by, whether it
//! came from the remote manifest or was reconstructed from the local store.
//! [`Pack`] extends it with the optional downloaded archive using
//! composition.

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::archive::{self, ArchiveError, UnzippedPackData};

/// Geographic bounding box of a pack, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Immutable pack metadata.
///
/// Field names double as the manifest wire format and the persisted record
/// shape, so the same struct deserializes at both boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackMetadata {
    /// First-level administrative region (e.g. a state).
    pub admin1: String,
    /// Second-level administrative region (e.g. a county).
    pub admin2: String,
    pub bbox: BoundingBox,
    pub description: String,
    /// Stable unique id. Two packs with the same id are the same logical
    /// pack regardless of whether either carries archive data.
    pub id: String,
    pub name: String,
    // No skip_serializing_if here: persisted records round-trip through
    // bincode, which cannot tolerate skipped fields.
    #[serde(default)]
    pub path: Option<String>,
    /// Path of the pack's compound archive relative to the catalog base
    /// URL. Packs without one cannot be downloaded.
    #[serde(default)]
    pub pmtiles_path: Option<String>,
    /// Last-updated timestamp as published by the catalog.
    pub updated_at: String,
}

/// One region's dataset: metadata plus the optional downloaded archive.
///
/// Uses composition to extend [`PackMetadata`]: the [`Deref`]
/// implementation allows transparent access to metadata fields
/// (`pack.id` instead of `pack.metadata().id`).
///
/// A pack holding `zipped_data` is downloaded/local; without it the pack is
/// catalog-only: known, but not fetched. Rebuilding a pack from the
/// persistent store must go through [`Pack::new`] so the archive
/// decomposition capability is always available on the result.
#[derive(Clone, PartialEq)]
pub struct Pack {
    metadata: PackMetadata,
    zipped_data: Option<Bytes>,
}

impl Pack {
    /// Create a pack from metadata and an optional downloaded archive.
    pub fn new(metadata: PackMetadata, zipped_data: Option<Bytes>) -> Self {
        Self {
            metadata,
            zipped_data,
        }
    }

    /// Create a catalog-only pack with no archive data.
    pub fn from_metadata(metadata: PackMetadata) -> Self {
        Self::new(metadata, None)
    }

    /// The pack's metadata.
    pub fn metadata(&self) -> &PackMetadata {
        &self.metadata
    }

    /// Consume the pack, returning its metadata.
    pub fn into_metadata(self) -> PackMetadata {
        self.metadata
    }

    /// The raw compound archive, if this pack has been downloaded.
    pub fn zipped_data(&self) -> Option<&Bytes> {
        self.zipped_data.as_ref()
    }

    /// Whether this pack carries downloaded archive data.
    pub fn is_downloaded(&self) -> bool {
        self.zipped_data.is_some()
    }

    /// Decompose the pack's compound archive into typed named blobs.
    ///
    /// Entries are classified by exact base-filename match; unrecognized
    /// names are ignored. A corrupt archive degrades to an empty result
    /// with a diagnostic rather than failing, so callers must check that the
    /// datasets they need are present (see
    /// [`UnzippedPackData::mode_data`](super::UnzippedPackData::mode_data)).
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NoArchive`] if the pack was never
    /// downloaded; that is a caller state error, not an archive problem.
    pub async fn unzipped_data(&self) -> Result<UnzippedPackData, ArchiveError> {
        let Some(data) = &self.zipped_data else {
            return Err(ArchiveError::NoArchive {
                id: self.metadata.id.clone(),
            });
        };
        Ok(archive::decompose(&self.metadata.id, data.clone()).await)
    }
}

/// Deref to metadata for convenient access to base fields.
impl Deref for Pack {
    type Target = PackMetadata;

    fn deref(&self) -> &Self::Target {
        &self.metadata
    }
}

impl AsRef<PackMetadata> for Pack {
    fn as_ref(&self) -> &PackMetadata {
        &self.metadata
    }
}

impl From<PackMetadata> for Pack {
    fn from(metadata: PackMetadata) -> Self {
        Self::from_metadata(metadata)
    }
}

// Hand-rolled so a multi-megabyte archive prints as its length.
impl fmt::Debug for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pack")
            .field("metadata", &self.metadata)
            .field(
                "zipped_data",
                &self.zipped_data.as_ref().map(|d| format!("{} bytes", d.len())),
            )
            .finish()
    }
}
