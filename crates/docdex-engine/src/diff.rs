//! Index diffing: old vs new fingerprints into ordered report lines.
//!
//! Pure over `Index` values; printing and persistence live in the engine.

use crate::index::{DirEntry, FileEntry, Index};
use std::collections::BTreeSet;

/// Compare the previous index (if any) against a freshly generated one and
/// return human-readable change lines, empty when nothing changed.
///
/// With no previous index every entry is an addition; a first scan of an
/// empty directory is called out explicitly instead of staying silent.
pub fn diff(old: Option<&Index>, new: &Index) -> Vec<String> {
    let old = match old {
        Some(old) => old,
        None => {
            if new.is_empty() {
                return vec!["(empty index)".to_string()];
            }
            let mut lines = Vec::new();
            for file in &new.files {
                lines.push(file_added(file));
            }
            for dir in &new.directories {
                lines.push(format!("+ dir {}", dir.name));
            }
            return lines;
        }
    };

    let mut lines = Vec::new();

    let old_files: Vec<&str> = old.files.iter().map(|f| f.name.as_str()).collect();
    for file in &new.files {
        if !old_files.contains(&file.name.as_str()) {
            lines.push(file_added(file));
        }
    }
    for file in &old.files {
        if new.file(&file.name).is_none() {
            lines.push(format!("- file {}", file.name));
        }
    }
    for file in &new.files {
        if let Some(previous) = old.file(&file.name) {
            file_changes(previous, file, &mut lines);
        }
    }

    for dir in &new.directories {
        if find_dir(old, &dir.name).is_none() {
            lines.push(format!("+ dir {}", dir.name));
        }
    }
    for dir in &old.directories {
        if find_dir(new, &dir.name).is_none() {
            lines.push(format!("- dir {}", dir.name));
        }
    }
    for dir in &new.directories {
        if let Some(previous) = find_dir(old, &dir.name) {
            dir_changes(previous, dir, &mut lines);
        }
    }

    lines
}

fn find_dir<'a>(index: &'a Index, name: &str) -> Option<&'a DirEntry> {
    index.directories.iter().find(|d| d.name == name)
}

fn file_added(file: &FileEntry) -> String {
    format!(
        "+ file {} ({} bytes, hash {}, parser {})",
        file.name,
        file.size,
        short(&file.content_hash),
        display_parser(&file.parsers.default),
    )
}

/// Field-by-field file modification lines. The parsers structure is
/// decomposed set-wise, so a pure reordering of `detected` reports nothing.
fn file_changes(old: &FileEntry, new: &FileEntry, lines: &mut Vec<String>) {
    if old.size != new.size {
        lines.push(format!(
            "~ file {}: size {} -> {}",
            new.name, old.size, new.size
        ));
    }
    if old.content_hash != new.content_hash {
        lines.push(format!(
            "~ file {}: hash {} -> {}",
            new.name,
            short(&old.content_hash),
            short(&new.content_hash)
        ));
    }

    if old.parsers.default != new.parsers.default {
        lines.push(format!(
            "~ file {}: default parser {} -> {}",
            new.name,
            display_parser(&old.parsers.default),
            display_parser(&new.parsers.default)
        ));
    }

    let old_set: BTreeSet<&str> = old.parsers.detected.iter().map(String::as_str).collect();
    let new_set: BTreeSet<&str> = new.parsers.detected.iter().map(String::as_str).collect();
    let added: Vec<&str> = new_set.difference(&old_set).copied().collect();
    let removed: Vec<&str> = old_set.difference(&new_set).copied().collect();
    if !added.is_empty() {
        lines.push(format!("~ file {}: parsers added {}", new.name, added.join(", ")));
    }
    if !removed.is_empty() {
        lines.push(format!(
            "~ file {}: parsers removed {}",
            new.name,
            removed.join(", ")
        ));
    }

    if old.parsers.status != new.parsers.status {
        lines.push(format!(
            "~ file {}: status {:?} -> {:?}",
            new.name, old.parsers.status, new.parsers.status
        ));
    }
}

/// Directory modification lines. Aggregate size is a best-effort sum subject
/// to filesystem timing noise, so a ±1 byte drift with an unchanged hash is
/// suppressed; hash changes always count.
fn dir_changes(old: &DirEntry, new: &DirEntry, lines: &mut Vec<String>) {
    let hash_changed = old.content_hash != new.content_hash;
    let size_changed = old.size.abs_diff(new.size) > 1;

    if !hash_changed && !size_changed {
        return;
    }

    if hash_changed {
        lines.push(format!(
            "~ dir {}: hash {} -> {}",
            new.name,
            short(&old.content_hash),
            short(&new.content_hash)
        ));
    }
    if old.size != new.size {
        lines.push(format!("~ dir {}: size {} -> {}", new.name, old.size, new.size));
    }
}

fn short(hash: &str) -> &str {
    if hash.is_empty() {
        "-"
    } else if hash.len() > 8 {
        &hash[..8]
    } else {
        hash
    }
}

fn display_parser(parser: &str) -> &str {
    if parser.is_empty() {
        "none"
    } else {
        parser
    }
}
