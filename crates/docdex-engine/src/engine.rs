//! Engine orchestration: scan, fingerprint, diff, report, persist.

use crate::config::IndexConfig;
use crate::diff::diff;
use crate::fingerprint::FingerprintGenerator;
use crate::index::{FileEntry, Index};
use crate::scanner::Scanner;
use crate::store::IndexStore;
use crate::IndexError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Options shared by the scan-based operations.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Descend into subdirectories (each gets its own index)
    pub recursive: bool,
    /// Dry run: report changes but never persist
    pub test_mode: bool,
    /// Staleness window override for `update`; defaults to the config value
    pub max_age: Option<Duration>,
}

/// Outcome of processing one directory.
#[derive(Debug, Clone)]
pub struct DirReport {
    /// Directory the index describes
    pub path: PathBuf,
    /// Change lines, empty when nothing changed
    pub lines: Vec<String>,
    /// Regeneration was skipped by the staleness guard
    pub skipped_fresh: bool,
}

/// Aggregate counters for the `stats` report.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub files: usize,
    pub parsed: usize,
    pub unparsed: usize,
    pub uncategorized: usize,
    pub directories: usize,
    pub total_bytes: u64,
    /// File counts keyed by default parser
    pub by_parser: BTreeMap<String, usize>,
}

/// Ties the scanner, fingerprint generator and diff/persistence stages
/// together. All conventions come from the injected config.
pub struct IndexEngine {
    config: IndexConfig,
}

impl IndexEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Scan and persist indexes unconditionally.
    pub fn create(&self, root: &Path, opts: &ScanOptions) -> Result<Vec<DirReport>, IndexError> {
        self.run(root, opts, false)
    }

    /// Like `create`, but a directory whose index file is younger than the
    /// staleness window is skipped without re-fingerprinting.
    pub fn update(&self, root: &Path, opts: &ScanOptions) -> Result<Vec<DirReport>, IndexError> {
        self.run(root, opts, true)
    }

    fn run(
        &self,
        root: &Path,
        opts: &ScanOptions,
        staleness_guard: bool,
    ) -> Result<Vec<DirReport>, IndexError> {
        let scanner = Scanner::new(&self.config);
        let generator = FingerprintGenerator::new(&self.config);
        let store = IndexStore::new(&self.config);
        let max_age = opts
            .max_age
            .unwrap_or(Duration::from_secs(self.config.freshness_secs));

        let listings = scanner.scan(root, opts.recursive)?;
        let mut reports = Vec::with_capacity(listings.len());

        for listing in &listings {
            if staleness_guard && store.is_fresh(&listing.path, max_age) {
                println!("Index up to date: {}", listing.path.display());
                reports.push(DirReport {
                    path: listing.path.clone(),
                    lines: Vec::new(),
                    skipped_fresh: true,
                });
                continue;
            }

            let old = store.load(&listing.path)?;
            let new = generator.generate(listing, old.as_ref());
            let lines = diff(old.as_ref(), &new);

            if !lines.is_empty() {
                println!("Updating index: {}", listing.path.display());
                for line in &lines {
                    println!("  {line}");
                }
            } else if opts.test_mode {
                println!("[TEST MODE] No changes detected: {}", listing.path.display());
            }

            if !opts.test_mode {
                store.save(&listing.path, &new)?;
            }

            reports.push(DirReport {
                path: listing.path.clone(),
                lines,
                skipped_fresh: false,
            });
        }

        Ok(reports)
    }

    /// Delete index files under the root; returns the directories that had one.
    pub fn clear(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>, IndexError> {
        let scanner = Scanner::new(&self.config);
        let store = IndexStore::new(&self.config);

        let mut cleared = Vec::new();
        for listing in scanner.scan(root, recursive)? {
            if store.clear(&listing.path)? {
                println!("Cleared index: {}", listing.path.display());
                cleared.push(listing.path);
            }
        }

        info!(count = cleared.len(), "Indexes cleared");
        Ok(cleared)
    }

    /// Aggregate statistics over a fresh fingerprint of the tree.
    pub fn stats(&self, root: &Path, recursive: bool) -> Result<IndexStats, IndexError> {
        let mut stats = IndexStats::default();
        self.visit_indexes(root, recursive, |_, index| {
            stats.directories += index.directories.len();
            for entry in &index.files {
                stats.files += 1;
                stats.total_bytes += entry.size;
                if entry.parsers.detected.is_empty() {
                    stats.unparsed += 1;
                } else {
                    stats.parsed += 1;
                    *stats
                        .by_parser
                        .entry(entry.parsers.default.clone())
                        .or_insert(0) += 1;
                }
                if !has_category(entry, &self.config.category_key) {
                    stats.uncategorized += 1;
                }
            }
        })?;
        Ok(stats)
    }

    /// Files with no detected parser output, as full paths.
    pub fn unparsed(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>, IndexError> {
        let mut paths = Vec::new();
        self.visit_indexes(root, recursive, |dir, index| {
            for entry in &index.files {
                if entry.parsers.detected.is_empty() {
                    paths.push(dir.join(&entry.name));
                }
            }
        })?;
        Ok(paths)
    }

    /// Files whose annotation metadata lacks a category, as full paths.
    pub fn uncategorized(&self, root: &Path, recursive: bool) -> Result<Vec<PathBuf>, IndexError> {
        let mut paths = Vec::new();
        self.visit_indexes(root, recursive, |dir, index| {
            for entry in &index.files {
                if !has_category(entry, &self.config.category_key) {
                    paths.push(dir.join(&entry.name));
                }
            }
        })?;
        Ok(paths)
    }

    /// Walk the tree with full index semantics (fresh fingerprints plus
    /// carry-forward, never persisted) and visit each directory's index.
    fn visit_indexes<F>(&self, root: &Path, recursive: bool, mut visit: F) -> Result<(), IndexError>
    where
        F: FnMut(&Path, &Index),
    {
        let scanner = Scanner::new(&self.config);
        let generator = FingerprintGenerator::new(&self.config);
        let store = IndexStore::new(&self.config);

        for listing in scanner.scan(root, recursive)? {
            let old = store.load(&listing.path)?;
            let index = generator.generate(&listing, old.as_ref());
            visit(&listing.path, &index);
        }
        Ok(())
    }
}

/// Whether the entry's annotation metadata carries a non-empty category.
/// This is the single meta key the reports are allowed to look at; the
/// carry-forward path never inspects any.
fn has_category(entry: &FileEntry, key: &str) -> bool {
    match entry.meta.get(key) {
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Null) | None => false,
        Some(_) => true,
    }
}
