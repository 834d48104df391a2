//! Docdex Engine
//!
//! This crate maintains per-directory extraction indexes, including:
//! - Directory scanning with hidden/output-dir/extension filtering
//! - File and subdirectory fingerprinting (size + SHA-256)
//! - Parser-output detection from conventional artifact names
//! - Diffing against the previously persisted index
//! - Atomic JSON persistence with annotation-metadata carry-forward

mod config;
mod diff;
mod engine;
mod error;
mod fingerprint;
mod index;
pub mod parsers;
pub mod scanner;
mod store;

pub use config::IndexConfig;
pub use diff::diff;
pub use engine::{DirReport, IndexEngine, IndexStats, ScanOptions};
pub use error::IndexError;
pub use fingerprint::FingerprintGenerator;
pub use index::{DirEntry, FileEntry, Index, Meta, ParserInfo};
pub use store::IndexStore;
