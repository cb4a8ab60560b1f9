//! Pack domain types: metadata, the pack entity, the remote manifest, and
//! compound archive decomposition.
//!
//! A pack is one region's bundled offline dataset (vector tile sets plus
//! attribute and citation tables) identified by a stable id. The catalog
//! of available packs arrives as a [`Manifest`]; a downloaded pack carries
//! its compound archive, which [`Pack::unzipped_data`] decomposes into
//! typed named blobs for the rendering layer.

mod archive;
mod core;
mod manifest;
mod mode;

pub use archive::{ArchiveError, UnzippedPackData};
pub use core::{BoundingBox, Pack, PackMetadata};
pub use manifest::{Manifest, RemoteManifest};
pub use mode::{MapMode, ModeData};
