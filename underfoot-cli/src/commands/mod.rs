//! CLI commands and shared helpers.

pub mod current;
pub mod download;
pub mod inspect;
pub mod list;
pub mod remove;

use std::path::PathBuf;

use tracing::debug;
use underfoot::store::StoreConfig;
use underfoot::PackStore;

use crate::error::CliError;

/// Resolve the store configuration from CLI arguments.
///
/// The data directory defaults to `underfoot` under the platform data dir;
/// `--data-dir` overrides it.
pub fn store_config(base_url: &str, data_dir: Option<PathBuf>) -> Result<StoreConfig, CliError> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => default_data_dir().ok_or_else(|| {
            CliError::Config(
                "could not determine a data directory; pass --data-dir".to_string(),
            )
        })?,
    };
    Ok(StoreConfig::new(data_dir).with_base_url(base_url))
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("underfoot"))
}

/// Open the store over its on-disk namespaces.
pub async fn open_store(config: StoreConfig) -> Result<PackStore, CliError> {
    debug!(data_dir = %config.data_dir.display(), base_url = %config.base_url, "opening pack store");
    Ok(PackStore::open(config).await?)
}

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
