//! Logging setup for binaries embedding the library.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the embedding binary's call. This helper wires the standard setup:
//! stderr output with an env-filter, `RUST_LOG` taking precedence over the
//! verbosity flag.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `verbosity` is the count of `-v` flags: 0 shows warnings and errors,
/// 1 adds this crate's debug events, 2 or more enables trace everywhere.
/// A `RUST_LOG` environment variable overrides the flag entirely.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "underfoot=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
