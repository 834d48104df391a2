//! Index data model.
//!
//! One `Index` is persisted per directory as a JSON document with top-level
//! keys `files`, `directories` and `timestamp`. Entries hold fingerprints
//! plus two carry-forward fields (`meta` and `parsers.status`) that are owned
//! by external tooling and must survive re-scans untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque annotation metadata attached to a file entry by external tools.
/// The engine carries it verbatim and never inspects individual keys
/// (except the single configured key used by the uncategorized report).
pub type Meta = BTreeMap<String, serde_json::Value>;

/// Parser detection state for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserInfo {
    /// Parser ids with an output artifact present, sorted and de-duplicated
    #[serde(default)]
    pub detected: Vec<String>,

    /// Parser chosen by priority order; empty iff `detected` is empty
    #[serde(default)]
    pub default: String,

    /// Free-form status, never computed here; preserved across re-scans
    #[serde(default)]
    pub status: String,
}

/// Fingerprint record for one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name, unique within the directory's index
    pub name: String,

    /// Byte length at scan time
    pub size: u64,

    /// SHA-256 hex digest of the file bytes (change-detection heuristic)
    pub content_hash: String,

    /// Parser detection state
    #[serde(default)]
    pub parsers: ParserInfo,

    /// Annotation metadata, carried forward by name across re-scans.
    /// Older index files may omit the key entirely.
    #[serde(default)]
    pub meta: Meta,
}

/// Fingerprint record for one immediate subdirectory.
///
/// Deliberately loose: the hash covers the sorted listing of immediate
/// children, so it catches additions, removals and renames but not a
/// same-named child's content changing. Real fidelity comes from the
/// per-file hashes in that subdirectory's own index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Subdirectory name
    pub name: String,

    /// Sum of immediate child file sizes; best-effort, 0 on read failure
    pub size: u64,

    /// SHA-256 over the newline-joined sorted listing; empty on read failure
    pub content_hash: String,

    /// Reserved, always empty at scan time
    #[serde(default)]
    pub parser: String,
}

/// The persisted per-directory index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// File entries, sorted by name
    #[serde(default)]
    pub files: Vec<FileEntry>,

    /// Subdirectory entries, sorted by name
    #[serde(default)]
    pub directories: Vec<DirEntry>,

    /// Seconds since epoch of the last successful scan
    #[serde(default)]
    pub timestamp: f64,
}

impl Index {
    /// Look up a file entry by name.
    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Whether the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}
