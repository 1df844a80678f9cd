//! Directory-backed bounded store.
//!
//! Each key lives in its own file named after the hex-encoded key. Writes go
//! through a temp file and a rename so a failed write never truncates the
//! previous copy.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::traits::{check_capacity, DurableStore};
use crate::error::StoreError;

const FILE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";
/// Longest file name most filesystems accept
const NAME_MAX: usize = 255;

#[derive(Debug, Default)]
struct Index {
    sizes: HashMap<String, usize>,
    used: usize,
}

/// Store persisting one file per key under a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    capacity: usize,
    index: Mutex<Index>,
}

impl FileStore {
    /// Longest key whose hex-encoded temp file name still fits in `NAME_MAX`.
    pub const MAX_KEY_BYTES: usize = (NAME_MAX - TEMP_EXTENSION.len() - 1) / 2;

    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// Existing entries are indexed so usage reflects what is already on disk.
    /// Leftover temp files from interrupted writes are removed.
    pub fn open(dir: impl AsRef<Path>, capacity: usize) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut index = Index::default();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if name.ends_with(TEMP_EXTENSION) {
                debug!("Removing stale temp file {:?}", path);
                let _ = fs::remove_file(&path);
                continue;
            }

            let Some(stem) = name.strip_suffix(&format!(".{FILE_EXTENSION}")) else {
                continue;
            };
            let Some(key) = decode_key(stem) else {
                warn!("Ignoring file with undecodable name {:?}", path);
                continue;
            };

            let size = fs::metadata(&path)?.len() as usize;
            index.used += size;
            index.sizes.insert(key, size);
        }

        debug!(
            "Opened file store at {:?}: {} entries, {} bytes",
            dir,
            index.sizes.len(),
            index.used
        );

        Ok(Self {
            dir,
            capacity,
            index: Mutex::new(index),
        })
    }

    /// Returns the directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.len() > Self::MAX_KEY_BYTES {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                max: Self::MAX_KEY_BYTES,
            });
        }
        Ok(self.dir.join(format!("{}.{}", encode_key(key), FILE_EXTENSION)))
    }

    fn lock(&self) -> MutexGuard<'_, Index> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DurableStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        let _index = self.lock();
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let mut index = self.lock();
        let old_len = index.sizes.get(key).copied().unwrap_or(0);
        check_capacity(key, index.used, old_len, bytes.len(), self.capacity)?;

        let tmp_path = path.with_extension(TEMP_EXTENSION);
        let result = fs::write(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, &path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        index.used = index.used - old_len + bytes.len();
        index.sizes.insert(key.to_string(), bytes.len());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let mut index = self.lock();
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(old_len) = index.sizes.remove(key) {
            index.used -= old_len;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.lock().sizes.keys().cloned().collect()
    }

    fn contains(&self, key: &str) -> bool {
        self.lock().sizes.contains_key(key)
    }

    fn max_key_len(&self) -> Option<usize> {
        Some(Self::MAX_KEY_BYTES)
    }

    fn usage(&self) -> usize {
        self.lock().used
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

// == Key Encoding ==
fn encode_key(key: &str) -> String {
    hex::encode(key)
}

fn decode_key(stem: &str) -> Option<String> {
    if stem.is_empty() {
        return None;
    }
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}
