//! Fingerprint generation: turns one directory listing into a fresh `Index`.

use crate::config::IndexConfig;
use crate::index::{DirEntry, FileEntry, Index, ParserInfo};
use crate::parsers::{detect_parsers, select_default};
use crate::scanner::DirListing;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, warn};

/// Builds fresh index entries for one directory's filtered contents.
pub struct FingerprintGenerator<'a> {
    config: &'a IndexConfig,
}

impl<'a> FingerprintGenerator<'a> {
    /// Create a generator with the given conventions.
    pub fn new(config: &'a IndexConfig) -> Self {
        Self { config }
    }

    /// Produce a complete `Index` for the listing, carrying forward `meta`
    /// and `parsers.status` by name from the old index when supplied.
    ///
    /// Per-entry failures (a file or subdirectory vanishing mid-scan) degrade
    /// or skip that entry with a warning instead of aborting.
    pub fn generate(&self, listing: &DirListing, old: Option<&Index>) -> Index {
        let output_path = listing.path.join(&self.config.output_dir);
        let output_listing = read_names(&output_path);

        let mut files = Vec::with_capacity(listing.files.len());
        for name in &listing.files {
            let path = listing.path.join(name);
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to read file, skipping");
                    continue;
                }
            };

            // The allow-list guarantees an extension, but fall back to the
            // whole name rather than panic on odd inputs.
            let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
            let nested_listing = read_names(&output_path.join(stem));
            let detected = detect_parsers(
                stem,
                &self.config.primary_parser,
                &output_listing,
                &nested_listing,
            );
            let default = select_default(&self.config.parser_priority, &detected);

            let previous = old.and_then(|index| index.file(name));
            let meta = previous.map(|p| p.meta.clone()).unwrap_or_default();
            let status = previous.map(|p| p.parsers.status.clone()).unwrap_or_default();

            files.push(FileEntry {
                name: name.clone(),
                size: bytes.len() as u64,
                content_hash: hash_bytes(&bytes),
                parsers: ParserInfo {
                    detected,
                    default,
                    status,
                },
                meta,
            });
        }

        let mut directories = Vec::with_capacity(listing.subdirs.len());
        for name in &listing.subdirs {
            let (size, content_hash) = fingerprint_dir(&listing.path.join(name));
            directories.push(DirEntry {
                name: name.clone(),
                size,
                content_hash,
                parser: String::new(),
            });
        }

        debug!(
            path = ?listing.path,
            files = files.len(),
            directories = directories.len(),
            "Fingerprinted directory"
        );

        Index {
            files,
            directories,
            timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// SHA-256 hex digest of a byte slice.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Aggregate fingerprint of a subdirectory: sum of immediate child file
/// sizes and a digest over the sorted child-name listing. Hidden children
/// are excluded, matching the scanner's filter; the subdirectory's own
/// index file lives there and must not feed its parent's fingerprint.
/// A listing failure (directory vanished, permissions) degrades to `(0, "")`.
fn fingerprint_dir(path: &Path) -> (u64, String) {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = ?path, error = %e, "Failed to list subdirectory, degrading fingerprint");
            return (0, String::new());
        }
    };

    let mut names = Vec::new();
    let mut size = 0u64;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
        if let Ok(metadata) = entry.metadata() {
            if metadata.is_file() {
                size += metadata.len();
            }
        }
    }

    names.sort();
    (size, hash_bytes(names.join("\n").as_bytes()))
}

/// Entry names of a directory, empty when it cannot be listed.
fn read_names(path: &Path) -> Vec<String> {
    match std::fs::read_dir(path) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}
