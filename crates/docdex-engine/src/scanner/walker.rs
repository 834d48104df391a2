//! Directory walker producing per-directory listings.

use crate::config::IndexConfig;
use crate::IndexError;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One visited directory with its filtered contents.
#[derive(Debug, Clone)]
pub struct DirListing {
    /// Absolute path of the directory
    pub path: PathBuf,
    /// Names of immediate subdirectories (hidden and output dir excluded)
    pub subdirs: Vec<String>,
    /// Names of relevant files (hidden and non-allow-listed excluded)
    pub files: Vec<String>,
}

impl DirListing {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            subdirs: Vec::new(),
            files: Vec::new(),
        }
    }
}

/// Walks a root directory, filtering out hidden entries, the extraction
/// output subdirectory, and files outside the extension allow-list.
pub struct Walker<'a> {
    config: &'a IndexConfig,
    recursive: bool,
}

impl<'a> Walker<'a> {
    /// Create a walker for the given conventions.
    pub fn new(config: &'a IndexConfig, recursive: bool) -> Self {
        Self { config, recursive }
    }

    /// Walk the tree and return one listing per visited directory,
    /// sorted by path (just the root when non-recursive).
    pub fn walk(&self, root: &Path) -> Result<Vec<DirListing>, IndexError> {
        let root = root
            .canonicalize()
            .map_err(|_| IndexError::NotFound(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(IndexError::NotADirectory(root));
        }

        // An unlistable root is fatal; errors deeper in the tree are not.
        std::fs::read_dir(&root).map_err(|e| IndexError::Walk {
            path: root.clone(),
            message: e.to_string(),
        })?;

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .hidden(true)
            .follow_links(false);
        if !self.recursive {
            builder.max_depth(Some(1));
        }

        let output_dir = self.config.output_dir.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            !(entry.depth() > 0 && is_dir && entry.file_name().to_str() == Some(output_dir.as_str()))
        });

        let mut listings: BTreeMap<PathBuf, DirListing> = BTreeMap::new();
        listings.insert(root.clone(), DirListing::new(root.clone()));

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Walk error");
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => {
                    warn!(path = ?entry.path(), "Skipping non-UTF-8 entry name");
                    continue;
                }
            };
            let parent = match entry.path().parent() {
                Some(parent) => parent.to_path_buf(),
                None => continue,
            };

            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                if let Some(listing) = listings.get_mut(&parent) {
                    listing.subdirs.push(name);
                }
                if self.recursive {
                    listings.insert(
                        entry.path().to_path_buf(),
                        DirListing::new(entry.path().to_path_buf()),
                    );
                }
            } else if self.config.is_relevant_file(&name) {
                if let Some(listing) = listings.get_mut(&parent) {
                    listing.files.push(name);
                }
            }
        }

        let mut result: Vec<DirListing> = listings.into_values().collect();
        for listing in &mut result {
            listing.subdirs.sort();
            listing.files.sort();
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn config() -> IndexConfig {
        IndexConfig::default()
    }

    #[test]
    fn test_walk_missing_root() {
        let cfg = config();
        let walker = Walker::new(&cfg, false);
        let result = walker.walk(Path::new("/nonexistent/docdex/root"));
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[test]
    fn test_walk_filters_extensions_and_hidden() {
        let temp_dir = tempdir().unwrap();
        File::create(temp_dir.path().join("a.pdf")).unwrap();
        File::create(temp_dir.path().join("b.docx")).unwrap();
        File::create(temp_dir.path().join("script.py")).unwrap();
        File::create(temp_dir.path().join(".hidden.pdf")).unwrap();
        File::create(temp_dir.path().join(".docdex_index.json")).unwrap();

        let cfg = config();
        let walker = Walker::new(&cfg, false);
        let listings = walker.walk(temp_dir.path()).unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].files, vec!["a.pdf", "b.docx"]);
    }

    #[test]
    fn test_walk_excludes_output_dir() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("md")).unwrap();
        File::create(temp_dir.path().join("md/a.md")).unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();

        let cfg = config();
        let walker = Walker::new(&cfg, true);
        let listings = walker.walk(temp_dir.path()).unwrap();

        assert_eq!(listings[0].subdirs, vec!["sub"]);
        // No listing was produced for the output dir or hidden dirs.
        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(|l| !l.path.ends_with("md")));
    }

    #[test]
    fn test_walk_non_recursive_lists_subdirs_without_descending() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        File::create(temp_dir.path().join("sub/inner.pdf")).unwrap();
        File::create(temp_dir.path().join("top.pdf")).unwrap();

        let cfg = config();
        let walker = Walker::new(&cfg, false);
        let listings = walker.walk(temp_dir.path()).unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].subdirs, vec!["sub"]);
        assert_eq!(listings[0].files, vec!["top.pdf"]);
    }

    #[test]
    fn test_walk_recursive_visits_subdirs() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();
        File::create(temp_dir.path().join("a/doc.pdf")).unwrap();
        File::create(temp_dir.path().join("a/b/deep.pdf")).unwrap();

        let cfg = config();
        let walker = Walker::new(&cfg, true);
        let listings = walker.walk(temp_dir.path()).unwrap();

        assert_eq!(listings.len(), 3);
        assert_eq!(listings[1].files, vec!["doc.pdf"]);
        assert_eq!(listings[1].subdirs, vec!["b"]);
        assert_eq!(listings[2].files, vec!["deep.pdf"]);
    }

    #[test]
    fn test_walk_results_are_sorted() {
        let temp_dir = tempdir().unwrap();
        File::create(temp_dir.path().join("c.pdf")).unwrap();
        File::create(temp_dir.path().join("a.pdf")).unwrap();
        File::create(temp_dir.path().join("b.pdf")).unwrap();

        let cfg = config();
        let walker = Walker::new(&cfg, false);
        let listings = walker.walk(temp_dir.path()).unwrap();

        assert_eq!(listings[0].files, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }
}
