//! Process-wide dataset cache.
//!
//! Each source path is loaded once and then served from memory. An entry is
//! keyed by the canonical path and remembers the file's length and
//! modification time; when either changes the next lookup reloads it.
//! An entry also remembers the path it was requested through, so a source
//! that has since been deleted is still found by that path.
//! [`DatasetCache::invalidate`] and [`DatasetCache::clear`] drop entries
//! explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::SystemTime;

use super::{load_uncached, LoadedDataset};
use crate::error::{Error, Result};

/// Identity of a source file's contents, as seen through its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceStamp {
    /// Read the current stamp of `path`.
    pub fn of(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::SourceNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// What the file looked like the last time a lookup touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observed {
    Present(SourceStamp),
    Missing,
}

impl Observed {
    fn of(path: &Path) -> Self {
        SourceStamp::of(path).map_or(Observed::Missing, Observed::Present)
    }
}

struct CacheEntry {
    stamp: SourceStamp,
    loaded: Arc<LoadedDataset>,
    /// Absolute form of the path the caller asked for
    requested: PathBuf,
    /// Source state that last failed to load; not stale again until it moves
    failed: Option<Observed>,
}

type Entries = HashMap<PathBuf, CacheEntry>;

/// Write-once-per-source cache of loaded datasets.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<Entries>,
}

static GLOBAL_CACHE: OnceLock<DatasetCache> = OnceLock::new();

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static DatasetCache {
        GLOBAL_CACHE.get_or_init(DatasetCache::new)
    }

    /// Return the cached dataset for `path`, loading it if absent or stale.
    ///
    /// A failed reload keeps the previous entry and remembers the source
    /// state that failed, so [`is_stale`](Self::is_stale) stays quiet until
    /// the file changes again.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<LoadedDataset>> {
        let mut entries = self.lock();

        let key = match canonical(path) {
            Ok(key) => key,
            Err(e) => {
                if let Some(key) = lookup_key(&entries, path) {
                    mark_failed(&mut entries, &key, Observed::Missing);
                }
                return Err(e);
            }
        };
        let stamp = match SourceStamp::of(&key) {
            Ok(stamp) => stamp,
            Err(e) => {
                mark_failed(&mut entries, &key, Observed::Missing);
                return Err(e);
            }
        };

        if let Some(entry) = entries.get_mut(&key) {
            if entry.stamp == stamp {
                tracing::debug!(path = %key.display(), "Dataset cache hit");
                entry.failed = None;
                return Ok(Arc::clone(&entry.loaded));
            }
            tracing::info!(path = %key.display(), "Dataset source changed, reloading");
        }

        let loaded = match load_uncached(&key) {
            Ok(loaded) => Arc::new(loaded),
            Err(e) => {
                mark_failed(&mut entries, &key, Observed::Present(stamp));
                return Err(e);
            }
        };
        entries.insert(
            key,
            CacheEntry {
                stamp,
                loaded: Arc::clone(&loaded),
                requested: absolute(path),
                failed: None,
            },
        );
        Ok(loaded)
    }

    /// True when `path` is cached but its file has changed or disappeared
    /// since it was loaded, and that new state has not already failed.
    pub fn is_stale(&self, path: &Path) -> bool {
        let entries = self.lock();
        let Some(key) = lookup_key(&entries, path) else {
            return false;
        };
        let Some(entry) = entries.get(&key) else {
            return false;
        };
        let observed = Observed::of(&key);
        observed != Observed::Present(entry.stamp) && entry.failed != Some(observed)
    }

    /// Drop the entry for `path`. Returns true if one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        let mut entries = self.lock();
        let Some(key) = lookup_key(&entries, path) else {
            return false;
        };
        let removed = entries.remove(&key).is_some();
        if removed {
            tracing::debug!(path = %key.display(), "Dataset cache entry invalidated");
        }
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // entries are replaced whole, so a poisoned map is still consistent
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cache key for `path`: its canonical form, or, once the file is gone, the
/// key of the entry that was loaded through the same path.
fn lookup_key(entries: &Entries, path: &Path) -> Option<PathBuf> {
    if let Ok(key) = canonical(path) {
        return Some(key);
    }
    let requested = absolute(path);
    entries
        .iter()
        .find(|(_, entry)| entry.requested == requested)
        .map(|(key, _)| key.clone())
}

fn mark_failed(entries: &mut Entries, key: &Path, observed: Observed) {
    if let Some(entry) = entries.get_mut(key) {
        tracing::debug!(path = %key.display(), "Dataset reload failed, keeping previous entry");
        entry.failed = Some(observed);
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::SourceNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}
