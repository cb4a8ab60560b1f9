//! The remote pack catalog.
//!
//! The catalog is published as a single JSON document. Deserialization is
//! the trust boundary: a document that does not match the wire shape, or
//! whose timestamp does not parse, is rejected whole; malformed records
//! never travel further into the system. Each successful fetch replaces
//! the previous manifest wholesale; there is no merge.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::core::{Pack, PackMetadata};

/// Wire shape of the published catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteManifest {
    pub packs: Vec<PackMetadata>,
    pub updated_at: String,
}

/// The validated, immutable catalog of available packs.
#[derive(Debug, Clone)]
pub struct Manifest {
    packs: Vec<Pack>,
    updated_at: DateTime<Utc>,
}

impl Manifest {
    /// Validate a wire document into a manifest.
    ///
    /// # Errors
    ///
    /// Returns the timestamp parse error if `updated_at` is not a valid
    /// RFC 3339 instant.
    pub fn from_wire(wire: RemoteManifest) -> Result<Self, chrono::ParseError> {
        let updated_at = DateTime::parse_from_rfc3339(&wire.updated_at)?.with_timezone(&Utc);
        let packs = wire.packs.into_iter().map(Pack::from_metadata).collect();
        Ok(Self { packs, updated_at })
    }

    /// All catalog packs, in published order.
    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    /// When the catalog was published.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Find a catalog pack by id.
    pub fn find(&self, pack_id: &str) -> Option<&Pack> {
        self.packs.iter().find(|pack| pack.id == pack_id)
    }
}
