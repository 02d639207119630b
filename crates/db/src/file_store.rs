//! File-backed store: one JSON file per collection.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fundbook_core::store::{CollectionKey, Store, StoreError};
use parking_lot::Mutex;
use tracing::debug;

/// A [`Store`] that writes each collection to `<data_dir>/<key>.json`.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        debug!(data_dir = %data_dir.display(), "Opened file store");
        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// The directory holding the collection files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: CollectionKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }

    fn write_atomic(&self, key: CollectionKey, value: &str) -> io::Result<()> {
        let target = self.path_for(key);
        let staging = target.with_extension("json.tmp");

        let mut file = fs::File::create(&staging)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staging, &target)
    }
}

impl Store for FileStore {
    fn get(&self, key: CollectionKey) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::backend(key, e.to_string())),
        }
    }

    fn set(&self, key: CollectionKey, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        self.write_atomic(key, value)
            .map_err(|e| StoreError::backend(key, e.to_string()))?;
        debug!(key = %key, bytes = value.len(), "Wrote collection");
        Ok(())
    }

    fn remove(&self, key: CollectionKey) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                debug!(key = %key, "Removed collection");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::backend(key, e.to_string())),
        }
    }
}
