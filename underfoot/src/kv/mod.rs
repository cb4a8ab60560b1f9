//! Persistent key-value stores for pack blobs and preferences.
//!
//! The `KeyValueStore` trait provides a domain-agnostic key-value interface.
//! The pack store uses two independent namespaces: one holding downloaded
//! pack records keyed by pack id, and one holding small preference values
//! such as the current pack id.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable for debugging, flexible for any domain
//! - **Vec<u8> values**: Raw bytes, no serialization opinions imposed
//! - **Per-key writes**: Each operation is a discrete, independently-awaited
//!   call; callers never hold a lock across an await
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support
//!
//! # Example
//!
//! ```ignore
//! use underfoot::kv::{DiskStore, KeyValueStore};
//!
//! let store = DiskStore::open("/var/lib/underfoot/packStore").await?;
//! store.set("pack-1", vec![1, 2, 3]).await?;
//! let value = store.get("pack-1").await?;
//! ```

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Debug, Error)]
pub enum KvError {
    /// I/O error during store operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored key could not be decoded back to a string.
    #[error("undecodable key: {0}")]
    BadKey(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generic asynchronous key-value storage.
///
/// Implementations back the two persistent namespaces the pack store
/// depends on. The interface is intentionally minimal: raw bytes in, raw
/// bytes out, with key enumeration so local packs can be listed without a
/// separate index.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
///
/// # Dyn Compatibility
///
/// Async methods return `Pin<Box<dyn Future>>` so the store can be held as
/// `Arc<dyn KeyValueStore>` and swapped for an in-memory implementation in
/// tests.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if an error occurs
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, KvError>>;

    /// Store a value under the given key, replacing any existing value.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), KvError>>;

    /// Delete a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the key existed and was deleted
    /// - `Ok(false)` if the key did not exist
    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, KvError>>;

    /// Enumerate every key currently present in the store.
    ///
    /// Order is unspecified.
    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, KvError>>;
}
