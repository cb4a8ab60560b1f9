//! Configuration for the pack store.

use std::path::PathBuf;
use std::time::Duration;

/// Default catalog base URL.
pub const DEFAULT_BASE_URL: &str = "https://static.underfoot.rocks";

/// Name of the catalog document under the base URL.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Configuration for the pack store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL the manifest and pack archives are fetched from.
    pub base_url: String,

    /// Directory holding the persistent stores. Two namespaces are created
    /// beneath it: `packStore` (downloaded packs) and `prefStore`
    /// (preferences).
    pub data_dir: PathBuf,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: std::env::temp_dir().join("underfoot"),
            timeout: Duration::from_secs(300),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Set the catalog base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Directory of the pack blob namespace.
    pub fn pack_store_dir(&self) -> PathBuf {
        self.data_dir.join("packStore")
    }

    /// Directory of the preference namespace.
    pub fn pref_store_dir(&self) -> PathBuf {
        self.data_dir.join("prefStore")
    }
}
