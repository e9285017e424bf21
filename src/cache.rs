//! ### Cache
//! Keeps the last assembled result per data root so repeated loads of an
//! unchanged directory skip re-parsing every csv.
//!
//! Entries are keyed by the canonical root and validated against a
//! fingerprint of every file's path, size and modification time under it.
//! A load in progress never touches the map; the finished result replaces
//! the entry in one step.

use log::{debug, info};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::assemble::assemble;
use crate::config::PipelineConfig;
use crate::error::{LoadError, LoadResult};
use crate::model::LoadedDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

struct CacheEntry {
    config: PipelineConfig,
    fingerprint: Fingerprint,
    dataset: Arc<LoadedDataset>,
}

#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache shared by the whole process.
    pub fn global() -> &'static DatasetCache {
        static GLOBAL: OnceLock<DatasetCache> = OnceLock::new();
        GLOBAL.get_or_init(DatasetCache::new)
    }

    /// Returns the cached result for `config.root` if the files under it are
    /// unchanged, otherwise assembles and caches a fresh one.
    pub fn load(&self, config: &PipelineConfig) -> LoadResult<Arc<LoadedDataset>> {
        let key = canonical_root(&config.root)?;
        let fingerprint = fingerprint(&key)?;

        if let Some(entry) = self.lock().get(&key) {
            if entry.fingerprint == fingerprint && entry.config == *config {
                debug!("Cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        info!("Cache miss for {}, assembling", key.display());
        let dataset = Arc::new(assemble(config)?);
        self.lock().insert(
            key,
            CacheEntry {
                config: config.clone(),
                fingerprint,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drops the entry for `root`. Returns whether there was one.
    pub fn invalidate(&self, root: &Path) -> bool {
        let key = canonical_root(root).unwrap_or_else(|_| root.to_path_buf());
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

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, CacheEntry>> {
        // Entries are only ever replaced whole, so a poisoned map is still
        // consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn canonical_root(root: &Path) -> LoadResult<PathBuf> {
    root.canonicalize().map_err(|source| LoadError::Io {
        path: root.to_path_buf(),
        source,
    })
}

/// Hash of the relative path, length and mtime of every entry under `root`.
pub fn fingerprint(root: &Path) -> LoadResult<Fingerprint> {
    let mut hasher = DefaultHasher::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| LoadError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let meta = entry.metadata().map_err(|source| LoadError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        entry.path().strip_prefix(root).unwrap_or(entry.path()).hash(&mut hasher);
        meta.is_dir().hash(&mut hasher);
        meta.len().hash(&mut hasher);
        meta.modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .hash(&mut hasher);
    }
    Ok(Fingerprint(hasher.finish()))
}
