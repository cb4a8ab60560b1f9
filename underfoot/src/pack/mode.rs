//! Per-mode dataset requirements.
//!
//! The map viewer renders one mode at a time, and each mode needs a
//! specific subset of a pack's datasets. Carrying that contract here keeps
//! "which blobs does rocks mode need" out of every consumer and gives
//! missing datasets their user-facing names.

use std::fmt;

use bytes::Bytes;

use super::archive::{ArchiveError, UnzippedPackData};

/// Display mode of the map viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// Geologic rock units.
    Rocks,
    /// Waterways, waterbodies, and watersheds.
    Water,
}

impl MapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rocks => "rocks",
            Self::Water => "water",
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The datasets a renderer needs for one mode.
#[derive(Debug, Clone)]
pub struct ModeData {
    /// Road and path tiles, rendered under every mode.
    pub ways: Bytes,
    /// The mode's own tile set.
    pub tiles: Bytes,
    /// The mode's source citation table.
    pub citations: Bytes,
    /// Feature attribute table. Present for rocks; water features carry
    /// their attributes in the tiles themselves.
    pub attributes: Option<Bytes>,
}

impl UnzippedPackData {
    /// Validate and collect the datasets required to render `mode`.
    ///
    /// # Errors
    ///
    /// Named, mode-specific errors when a required dataset is absent:
    /// [`ArchiveError::MissingWays`], [`ArchiveError::MissingTiles`], or
    /// [`ArchiveError::MissingCitations`]. Decomposition itself never
    /// raises these: an archive that failed to open simply yields an
    /// empty result, and this is where that absence becomes an error.
    pub fn mode_data(&self, mode: MapMode) -> Result<ModeData, ArchiveError> {
        let ways = self.ways_pmtiles.clone().ok_or(ArchiveError::MissingWays)?;
        let (tiles, citations, attributes) = match mode {
            MapMode::Rocks => (
                self.rocks_pmtiles.clone(),
                self.rocks_citations_csv.clone(),
                self.rocks_units_csv.clone(),
            ),
            MapMode::Water => (
                self.water_pmtiles.clone(),
                self.water_citations_csv.clone(),
                None,
            ),
        };
        let tiles = tiles.ok_or(ArchiveError::MissingTiles { mode })?;
        let citations = citations.ok_or(ArchiveError::MissingCitations { mode })?;
        Ok(ModeData {
            ways,
            tiles,
            citations,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_pack_data() -> UnzippedPackData {
        UnzippedPackData {
            ways_pmtiles: Some(Bytes::from_static(b"ways")),
            rocks_pmtiles: Some(Bytes::from_static(b"rocks")),
            rocks_citations_csv: Some(Bytes::from_static(b"rc")),
            rocks_units_csv: Some(Bytes::from_static(b"ru")),
            water_pmtiles: Some(Bytes::from_static(b"water")),
            water_citations_csv: Some(Bytes::from_static(b"wc")),
            ..Default::default()
        }
    }

    #[test]
    fn test_map_mode_display() {
        assert_eq!(MapMode::Rocks.to_string(), "rocks");
        assert_eq!(MapMode::Water.to_string(), "water");
    }

    #[test]
    fn test_mode_data_rocks() {
        let data = full_pack_data().mode_data(MapMode::Rocks).unwrap();

        assert_eq!(data.ways, Bytes::from_static(b"ways"));
        assert_eq!(data.tiles, Bytes::from_static(b"rocks"));
        assert_eq!(data.citations, Bytes::from_static(b"rc"));
        assert_eq!(data.attributes, Some(Bytes::from_static(b"ru")));
    }

    #[test]
    fn test_mode_data_water_has_no_attributes() {
        let data = full_pack_data().mode_data(MapMode::Water).unwrap();

        assert_eq!(data.tiles, Bytes::from_static(b"water"));
        assert_eq!(data.citations, Bytes::from_static(b"wc"));
        assert!(data.attributes.is_none());
    }

    #[test]
    fn test_mode_data_requires_ways() {
        let mut unzipped = full_pack_data();
        unzipped.ways_pmtiles = None;

        let err = unzipped.mode_data(MapMode::Rocks).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingWays));
    }

    #[test]
    fn test_mode_data_requires_mode_tiles() {
        let mut unzipped = full_pack_data();
        unzipped.water_pmtiles = None;

        let err = unzipped.mode_data(MapMode::Water).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::MissingTiles {
                mode: MapMode::Water
            }
        ));
    }

    #[test]
    fn test_mode_data_requires_citations() {
        let mut unzipped = full_pack_data();
        unzipped.rocks_citations_csv = None;

        let err = unzipped.mode_data(MapMode::Rocks).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::MissingCitations {
                mode: MapMode::Rocks
            }
        ));
    }

    #[test]
    fn test_mode_data_on_empty_result() {
        let err = UnzippedPackData::default()
            .mode_data(MapMode::Rocks)
            .unwrap_err();
        assert!(matches!(err, ArchiveError::MissingWays));
    }
}
