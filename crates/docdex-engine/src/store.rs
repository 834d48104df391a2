//! Index persistence: one JSON file per directory, replaced atomically.

use crate::config::IndexConfig;
use crate::index::Index;
use crate::IndexError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Loads, saves and clears the reserved per-directory index file.
pub struct IndexStore<'a> {
    config: &'a IndexConfig,
}

impl<'a> IndexStore<'a> {
    /// Create a store with the given conventions.
    pub fn new(config: &'a IndexConfig) -> Self {
        Self { config }
    }

    /// Path of the index file inside a directory.
    pub fn index_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.config.index_file)
    }

    /// Load the persisted index, `None` when no index exists yet.
    pub fn load(&self, dir: &Path) -> Result<Option<Index>, IndexError> {
        let path = self.index_path(dir);
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path)?;
        let index: Index = serde_json::from_str(&json)?;

        debug!(path = ?path, files = index.files.len(), "Loaded index");

        Ok(Some(index))
    }

    /// Persist an index with a whole-file atomic replace (temp + rename).
    pub fn save(&self, dir: &Path, index: &Index) -> Result<(), IndexError> {
        let path = self.index_path(dir);
        let json = serde_json::to_string_pretty(index)?;

        let temp_path = dir.join(format!("{}.tmp", self.config.index_file));
        std::fs::write(&temp_path, &json)?;
        std::fs::rename(&temp_path, &path)?;

        debug!(path = ?path, size = json.len(), "Saved index");

        Ok(())
    }

    /// Delete the index file; returns whether one existed. Idempotent.
    pub fn clear(&self, dir: &Path) -> Result<bool, IndexError> {
        let path = self.index_path(dir);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        debug!(path = ?path, "Cleared index");
        Ok(true)
    }

    /// Age of the persisted index file, `None` when absent or unreadable.
    pub fn age(&self, dir: &Path) -> Option<Duration> {
        let metadata = std::fs::metadata(self.index_path(dir)).ok()?;
        metadata.modified().ok()?.elapsed().ok()
    }

    /// Staleness guard: whether the index file is younger than the window.
    pub fn is_fresh(&self, dir: &Path, max_age: Duration) -> bool {
        match self.age(dir) {
            Some(age) => age <= max_age,
            None => false,
        }
    }
}
