//! Memoized dataset loading.
//!
//! One [`PaperTable`] per file, keyed on canonical path and modification
//! time. A changed timestamp invalidates the entry and triggers a reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::SystemTime;

use super::loader::{LoadError, load_file};
use super::model::PaperTable;

#[derive(Debug, Clone)]
struct CacheEntry {
    modified: Option<SystemTime>,
    table: Arc<PaperTable>,
}

/// Thread-safe cache of loaded tables. Sessions that ask for the same file
/// concurrently share a single load: the lock is held while reading.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use or when the
    /// file has been modified since the last load.
    pub fn load(&self, path: &Path) -> Result<Arc<PaperTable>, LoadError> {
        let meta = std::fs::metadata(path).map_err(|e| LoadError::io(path, e))?;
        let modified = meta.modified().ok();
        let key = std::fs::canonicalize(path).map_err(|e| LoadError::io(path, e))?;

        let mut entries = self.lock();
        if let Some(entry) = entries.get(&key) {
            if entry.modified == modified {
                log::debug!("cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.table));
            }
            log::info!("{} changed on disk, reloading", key.display());
        } else {
            log::debug!("cache miss for {}", key.display());
        }

        let table = Arc::new(load_file(path)?);
        entries.insert(
            key,
            CacheEntry {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop the entry for `path`; the next [`load`](Self::load) rereads it.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.lock().remove(&key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic during a previous load leaves the map itself consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The process-wide cache; entries live until process exit or invalidation.
pub fn shared_cache() -> &'static TableCache {
    static CACHE: OnceLock<TableCache> = OnceLock::new();
    CACHE.get_or_init(TableCache::new)
}
