use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::LoadError;
use super::loader::{load_file, SourceEncoding};
use super::model::SalesDataset;

// ---------------------------------------------------------------------------
// Memoized load of the source table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    encoding: SourceEncoding,
    modified: Option<SystemTime>,
}

/// Holds the most recently loaded dataset, keyed by source path, encoding and
/// file modification time. Owned by the application state, not global.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(CacheKey, Arc<SalesDataset>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it if the key changed.
    ///
    /// A failed load leaves the cache empty.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        encoding: SourceEncoding,
    ) -> Result<Arc<SalesDataset>, LoadError> {
        let modified = fs::metadata(path)
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .modified()
            .ok();
        let key = CacheKey {
            path: path.to_path_buf(),
            encoding,
            modified,
        };

        if let Some((cached_key, dataset)) = &self.entry {
            if *cached_key == key {
                log::debug!("Dataset cache hit for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        log::debug!("Dataset cache miss for {}", path.display());
        self.entry = None;
        let dataset = Arc::new(load_file(path, encoding)?);
        self.entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset so the next access re-reads the source.
    pub fn invalidate(&mut self) {
        if let Some((key, _)) = self.entry.take() {
            log::debug!("Invalidated dataset cache for {}", key.path.display());
        }
    }

    /// Path of the currently cached source, if any.
    pub fn cached_path(&self) -> Option<&Path> {
        self.entry.as_ref().map(|(key, _)| key.path.as_path())
    }
}
