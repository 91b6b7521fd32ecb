//! Local persistence capabilities used by the cache controller.
//!
//! The cache only needs a blob under a single key plus one boolean
//! preference, so the traits stay that small. [`FileStore`] keeps one JSON
//! file per key in a cache directory; [`MemoryStore`] backs tests and
//! short-lived sessions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;

/// Opaque blob storage keyed by string.
pub trait BlobStore: Send + Sync {
    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set_blob(&self, key: &str, value: &[u8]) -> Result<()>;
    /// Remove a blob. Removing a missing key is not an error.
    fn clear_blob(&self, key: &str) -> Result<()>;
}

/// Boolean user preferences. `None` means the user never set the flag.
pub trait PreferenceStore: Send + Sync {
    fn get_bool_pref(&self, key: &str) -> Result<Option<bool>>;
    fn set_bool_pref(&self, key: &str, value: bool) -> Result<()>;
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    prefs: Mutex<HashMap<String, bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BlobStore for MemoryStore {
    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(lock(&self.blobs).get(key).cloned())
    }

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<()> {
        lock(&self.blobs).insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn clear_blob(&self, key: &str) -> Result<()> {
        lock(&self.blobs).remove(key);
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    fn get_bool_pref(&self, key: &str) -> Result<Option<bool>> {
        Ok(lock(&self.prefs).get(key).copied())
    }

    fn set_bool_pref(&self, key: &str, value: bool) -> Result<()> {
        lock(&self.prefs).insert(key.to_string(), value);
        Ok(())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// Preferences file name in the cache directory
const PREFERENCES_FILE: &str = "preferences.json";

pub struct FileStore {
    cache_dir: PathBuf,
    // Serializes read-modify-write of the preferences file
    prefs_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            prefs_lock: Mutex::new(()),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    fn prefs_path(&self) -> PathBuf {
        self.cache_dir.join(PREFERENCES_FILE)
    }

    fn load_prefs(&self) -> Result<HashMap<String, bool>> {
        let path = self.prefs_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl BlobStore for FileStore {
    fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&path)?))
    }

    fn set_blob(&self, key: &str, value: &[u8]) -> Result<()> {
        // Write-then-rename so a crash mid-write leaves the old blob intact
        let path = self.blob_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn clear_blob(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get_bool_pref(&self, key: &str) -> Result<Option<bool>> {
        let _guard = lock(&self.prefs_lock);
        Ok(self.load_prefs()?.get(key).copied())
    }

    fn set_bool_pref(&self, key: &str, value: bool) -> Result<()> {
        let _guard = lock(&self.prefs_lock);
        let mut prefs = self.load_prefs()?;
        prefs.insert(key.to_string(), value);
        let contents = serde_json::to_string_pretty(&prefs)?;
        std::fs::write(self.prefs_path(), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_blobs() {
        let store = MemoryStore::new();
        assert!(store.get_blob("k").unwrap().is_none());
        store.set_blob("k", b"one").unwrap();
        store.set_blob("k", b"two").unwrap();
        assert_eq!(store.get_blob("k").unwrap().unwrap(), b"two");
        store.clear_blob("k").unwrap();
        store.clear_blob("k").unwrap();
        assert!(store.get_blob("k").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_prefs_three_state() {
        let store = MemoryStore::new();
        assert_eq!(store.get_bool_pref("flag").unwrap(), None);
        store.set_bool_pref("flag", false).unwrap();
        assert_eq!(store.get_bool_pref("flag").unwrap(), Some(false));
    }

    #[test]
    fn test_file_store_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested")).unwrap();
        assert!(store.get_blob("CompassDataLab").unwrap().is_none());

        store.set_blob("CompassDataLab", b"{}").unwrap();
        assert_eq!(store.get_blob("CompassDataLab").unwrap().unwrap(), b"{}");
        assert!(store.cache_dir().join("CompassDataLab.json").exists());

        store.clear_blob("CompassDataLab").unwrap();
        assert!(store.get_blob("CompassDataLab").unwrap().is_none());
        store.clear_blob("CompassDataLab").unwrap();
    }

    #[test]
    fn test_file_store_prefs_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.get_bool_pref("UseOrientationTheme").unwrap(), None);
        store.set_bool_pref("UseOrientationTheme", false).unwrap();
        store.set_bool_pref("Other", true).unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get_bool_pref("UseOrientationTheme").unwrap(), Some(false));
        assert_eq!(reopened.get_bool_pref("Other").unwrap(), Some(true));
    }
}
