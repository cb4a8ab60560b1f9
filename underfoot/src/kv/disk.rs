//! Disk-backed key-value store.
//!
//! One namespace maps to one directory; one key maps to one file. Keys are
//! escaped so arbitrary ids are valid file names, and writes go through a
//! hidden temporary file followed by a rename so a crash mid-write never
//! leaves a torn value behind.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::{BoxFuture, KeyValueStore, KvError};

/// Prefix for in-progress write files. Hidden names are skipped during key
/// enumeration, so an interrupted write is invisible to readers.
const TMP_PREFIX: &str = ".tmp-";

/// Disk-backed key-value store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, KvError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The directory backing this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(encode_key(key))
    }
}

impl KeyValueStore for DiskStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, KvError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), KvError>> {
        let path = self.path_for(key);
        let tmp = self
            .root
            .join(format!("{}{}", TMP_PREFIX, encode_key(key)));
        Box::pin(async move {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(&value).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &path).await?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, KvError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match fs::remove_file(&path).await {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, KvError>> {
        Box::pin(async move {
            let mut keys = Vec::new();
            let mut entries = fs::read_dir(&self.root).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    warn!(path = %entry.path().display(), "skipping non-UTF-8 store entry");
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }
                keys.push(decode_key(name)?);
            }
            Ok(keys)
        })
    }
}

/// Escape a key into a safe file name.
///
/// Alphanumerics plus `-`, `_` and `.` pass through; everything else
/// becomes `%XX`. A leading `.` is escaped so keys never collide with
/// hidden temporary files.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        let safe = byte.is_ascii_alphanumeric()
            || byte == b'-'
            || byte == b'_'
            || (byte == b'.' && i > 0);
        if safe {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Reverse [`encode_key`].
fn decode_key(name: &str) -> Result<String, KvError> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut iter = name.bytes();
    while let Some(b) = iter.next() {
        if b == b'%' {
            let hi = iter.next();
            let lo = iter.next();
            let decoded = match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    let hex = [hi, lo];
                    std::str::from_utf8(&hex)
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok())
                }
                _ => None,
            };
            match decoded {
                Some(byte) => bytes.push(byte),
                None => return Err(KvError::BadKey(name.to_string())),
            }
        } else {
            bytes.push(b);
        }
    }
    String::from_utf8(bytes).map_err(|_| KvError::BadKey(name.to_string()))
}
