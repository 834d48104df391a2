//! Directory scanner module.
//!
//! Produces the candidate set of source files and subdirectories to
//! fingerprint, applying the hidden/output-dir/extension filters.

mod walker;

pub use walker::{DirListing, Walker};

use crate::config::IndexConfig;
use crate::IndexError;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// The directory scanner.
pub struct Scanner<'a> {
    config: &'a IndexConfig,
}

impl<'a> Scanner<'a> {
    /// Create a scanner with the given conventions.
    pub fn new(config: &'a IndexConfig) -> Self {
        Self { config }
    }

    /// Scan a root directory, returning one listing per visited directory.
    pub fn scan(&self, root: &Path, recursive: bool) -> Result<Vec<DirListing>, IndexError> {
        let start = Instant::now();

        let walker = Walker::new(self.config, recursive);
        let listings = walker.walk(root)?;

        let file_count: usize = listings.iter().map(|l| l.files.len()).sum();
        debug!(
            directories = listings.len(),
            files = file_count,
            "Listings gathered"
        );
        info!(
            path = ?root,
            recursive = recursive,
            duration_ms = start.elapsed().as_millis() as u64,
            "Scan complete"
        );

        Ok(listings)
    }
}
