//! Engine configuration.
//!
//! All directory and filename conventions live here and are passed
//! explicitly into the scanner, fingerprint generator and diff engine.
//! There is no ambient global settings object.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::IndexError;

/// Conventions and tunables for the index engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Name of the extraction-output subdirectory (never indexed itself)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Reserved per-directory index filename (hidden, so never scanned)
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Parser whose output convention is a nested per-file folder
    #[serde(default = "default_primary_parser")]
    pub primary_parser: String,

    /// Default-parser priority order, highest first
    #[serde(default = "default_parser_priority")]
    pub parser_priority: Vec<String>,

    /// File extensions considered relevant, lowercase, without dots
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Staleness window for `update` in seconds
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// Annotation-metadata key checked by the uncategorized report
    #[serde(default = "default_category_key")]
    pub category_key: String,
}

fn default_output_dir() -> String {
    "md".to_string()
}

fn default_index_file() -> String {
    ".docdex_index.json".to_string()
}

fn default_primary_parser() -> String {
    "docling".to_string()
}

fn default_parser_priority() -> Vec<String> {
    ["docling", "marker", "easyocr", "md"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "html", "htm", "epub", "txt", "png",
        "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_freshness_secs() -> u64 {
    5
}

fn default_category_key() -> String {
    "category".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            index_file: default_index_file(),
            primary_parser: default_primary_parser(),
            parser_priority: default_parser_priority(),
            extensions: default_extensions(),
            freshness_secs: default_freshness_secs(),
            category_key: default_category_key(),
        }
    }
}

impl IndexConfig {
    /// Load configuration from a YAML file.
    pub fn load_from(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Whether a file name has a relevant extension.
    pub fn is_relevant_file(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }
}
