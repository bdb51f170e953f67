//! In-memory store used as a test double for the disk tree.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    read_only: Mutex<Vec<PathBuf>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file directly, bypassing the write counter.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), contents.into());
        }
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(path.as_ref()).cloned()
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every write under `prefix` fail with `PermissionDenied`.
    pub fn deny_writes_under(&self, prefix: impl Into<PathBuf>) {
        if let Ok(mut read_only) = self.read_only.lock() {
            read_only.push(prefix.into());
        }
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }

    fn poisoned(path: &Path) -> StoreError {
        StoreError::io(path, io::Error::new(io::ErrorKind::Other, "store lock poisoned"))
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        let files = self.files.lock().map_err(|_| Self::poisoned(path))?;
        Ok(files.get(path).cloned())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        let denied = self
            .read_only
            .lock()
            .map_err(|_| Self::poisoned(path))?
            .iter()
            .any(|prefix| path.starts_with(prefix));
        if denied {
            return Err(StoreError::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "read-only location"),
            ));
        }

        let mut files = self.files.lock().map_err(|_| Self::poisoned(path))?;
        files.insert(path.to_path_buf(), contents.to_vec());
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<String>, StoreError> {
        let files = self.files.lock().map_err(|_| Self::poisoned(dir))?;
        // BTreeMap keys are already sorted
        Ok(files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let store = MemoryStore::new();
        store.write(Path::new("a/b.json"), b"[1]").unwrap();
        assert_eq!(store.read(Path::new("a/b.json")).unwrap(), Some(b"[1]".to_vec()));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn denied_prefix_fails_writes() {
        let store = MemoryStore::new();
        store.deny_writes_under("stocks/jse");
        assert!(store.write(Path::new("stocks/jse/NPN_price.json"), b"[]").is_err());
        assert!(store.write(Path::new("stocks/ngx/MTNN_price.json"), b"[]").is_ok());
    }

    #[test]
    fn list_is_one_level_deep() {
        let store = MemoryStore::new();
        store.insert("stocks/jse/NPN_price.json", "[]");
        store.insert("stocks/jse/deeper/X_price.json", "[]");
        store.insert("stocks/ngx/MTNN_price.json", "[]");
        assert_eq!(
            store.list(Path::new("stocks/jse")).unwrap(),
            vec!["NPN_price.json".to_string()]
        );
    }
}
