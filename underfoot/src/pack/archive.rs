//! Compound archive decomposition.
//!
//! A pack's archive is a zip container of flat-named files. Decomposition
//! enumerates every entry, reads the file entries concurrently from the
//! shared in-memory buffer, and classifies each by exact base-filename
//! match into [`UnzippedPackData`]. Unknown entry names are ignored so the
//! archive format may grow new members without breaking old readers.
//!
//! Failure handling is deliberately lopsided:
//! - a container that cannot be opened at all degrades to an empty result
//!   with a diagnostic, and
//! - a single unreadable entry is skipped so it cannot hide the others.
//!
//! Missing-dataset errors are raised by callers inspecting the result (see
//! [`UnzippedPackData::mode_data`]), never by decomposition itself.

use std::io::{Cursor, Read};

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::warn;

use super::mode::MapMode;

/// Upper bound on concurrent entry reads within one archive.
const MAX_CONCURRENT_ENTRY_READS: usize = 4;

/// Errors surfaced by archive access and dataset validation.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The pack has never been downloaded, so there is nothing to open.
    #[error("pack {id} has no archive data")]
    NoArchive { id: String },

    /// The archive lacked the base ways tile set every mode renders.
    #[error("pack did not have ways data")]
    MissingWays,

    /// The archive lacked the tile set for the requested mode.
    #[error("pack did not have {mode} data")]
    MissingTiles { mode: MapMode },

    /// The archive lacked the citation table for the requested mode.
    #[error("pack did not have {mode} citations")]
    MissingCitations { mode: MapMode },
}

/// The typed named blobs extracted from a pack's compound archive.
///
/// Every field is optional: which members an archive carries depends on
/// the region and on the catalog version that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnzippedPackData {
    /// Context tiles (basemap labels and boundaries).
    pub context_pmtiles: Option<Bytes>,
    /// Elevation contour tiles.
    pub contours_pmtiles: Option<Bytes>,
    /// Rock unit tiles.
    pub rocks_pmtiles: Option<Bytes>,
    /// Rock source citation table.
    pub rocks_citations_csv: Option<Bytes>,
    /// Rock unit attribute table.
    pub rocks_units_csv: Option<Bytes>,
    /// Water feature tiles.
    pub water_pmtiles: Option<Bytes>,
    /// Water source citation table.
    pub water_citations_csv: Option<Bytes>,
    /// Waterway network metadata table.
    pub water_waterways_network_csv: Option<Bytes>,
    /// Road and path tiles.
    pub ways_pmtiles: Option<Bytes>,
}

impl UnzippedPackData {
    /// Whether no entry was classified.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Classify one archive entry by its base filename.
    ///
    /// Returns `false` when the name is not part of the fixed vocabulary,
    /// in which case the entry is ignored.
    fn classify(&mut self, base_name: &str, data: Bytes) -> bool {
        let slot = match base_name {
            "context.pmtiles" => &mut self.context_pmtiles,
            "contours.pmtiles" => &mut self.contours_pmtiles,
            "rocks.pmtiles" => &mut self.rocks_pmtiles,
            "rocks-citations.csv" => &mut self.rocks_citations_csv,
            "rocks-rock_units_attrs.csv" => &mut self.rocks_units_csv,
            "water.pmtiles" => &mut self.water_pmtiles,
            "water-citations.csv" => &mut self.water_citations_csv,
            "water-waterways-network.csv" => &mut self.water_waterways_network_csv,
            "ways.pmtiles" => &mut self.ways_pmtiles,
            _ => return false,
        };
        *slot = Some(data);
        true
    }
}

/// A file entry found in the archive's directory.
struct ArchiveEntry {
    index: usize,
    name: String,
}

/// Decompose an archive held in memory into typed named blobs.
///
/// Entry reads fan out concurrently (the buffer is shared zero-copy) and
/// are joined before returning: the result is complete only once every
/// entry has been classified or skipped.
pub(super) async fn decompose(pack_id: &str, data: Bytes) -> UnzippedPackData {
    let entries = match list_entries(data.clone()).await {
        Ok(entries) => entries,
        Err(reason) => {
            warn!(pack_id, %reason, "failed to open pack archive");
            return UnzippedPackData::default();
        }
    };

    let reads = stream::iter(entries)
        .map(|entry| read_entry(data.clone(), pack_id, entry))
        .buffer_unordered(MAX_CONCURRENT_ENTRY_READS)
        .collect::<Vec<_>>()
        .await;

    let mut unzipped = UnzippedPackData::default();
    for (name, bytes) in reads.into_iter().flatten() {
        let base_name = name.rsplit('/').next().unwrap_or(&name);
        unzipped.classify(base_name, bytes);
    }
    unzipped
}

/// Enumerate the archive's file entries, skipping directories.
async fn list_entries(data: Bytes) -> Result<Vec<ArchiveEntry>, String> {
    let listing = tokio::task::spawn_blocking(
        move || -> Result<Vec<ArchiveEntry>, zip::result::ZipError> {
            let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
            let mut entries = Vec::with_capacity(archive.len());
            for index in 0..archive.len() {
                let entry = archive.by_index(index)?;
                if entry.is_dir() {
                    continue;
                }
                entries.push(ArchiveEntry {
                    index,
                    name: entry.name().to_string(),
                });
            }
            Ok(entries)
        },
    )
    .await;

    match listing {
        Ok(Ok(entries)) => Ok(entries),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Read one entry's bytes, or skip it with a diagnostic on failure.
///
/// Each read reopens the archive over the shared buffer; the central
/// directory was already validated by [`list_entries`], so reads of
/// different entries are independent.
async fn read_entry(data: Bytes, pack_id: &str, entry: ArchiveEntry) -> Option<(String, Bytes)> {
    let index = entry.index;
    let read = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, zip::result::ZipError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
        let mut file = archive.by_index(index)?;
        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)?;
        Ok(contents)
    })
    .await;

    match read {
        Ok(Ok(contents)) => Some((entry.name, Bytes::from(contents))),
        Ok(Err(e)) => {
            warn!(pack_id, entry = %entry.name, error = %e, "skipping unreadable archive entry");
            None
        }
        Err(e) => {
            warn!(pack_id, entry = %entry.name, error = %e, "archive entry read task failed");
            None
        }
    }
}
