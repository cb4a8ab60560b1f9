//! Error type for CLI commands.

use thiserror::Error;
use underfoot::{ArchiveError, StoreError};

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    /// Pack store operation failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Archive inspection failed.
    #[error("{0}")]
    Archive(#[from] ArchiveError),

    /// Invalid arguments or environment.
    #[error("{0}")]
    Config(String),
}
