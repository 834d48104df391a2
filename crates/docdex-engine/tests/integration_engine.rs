//! Integration tests for the docdex index pipeline: scan, fingerprint,
//! diff, persist.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

use docdex_engine::{IndexConfig, IndexEngine, IndexStore, ScanOptions};

/// Options with the staleness guard disabled so back-to-back runs re-scan.
fn rescan_opts() -> ScanOptions {
    ScanOptions {
        max_age: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// Helper to set up a document directory with extraction output:
/// `a.pdf` with nothing parsed yet, `b.pdf` with a nested docling artifact
/// and a plain markdown artifact.
fn create_document_dir(base: &Path) -> std::path::PathBuf {
    let dir = base.join("docs");
    fs::create_dir_all(&dir).unwrap();

    fs::write(dir.join("a.pdf"), b"first document").unwrap();
    fs::write(dir.join("b.pdf"), b"second document").unwrap();

    fs::create_dir_all(dir.join("md/b")).unwrap();
    fs::write(dir.join("md/b.md"), b"# b (plain)").unwrap();
    fs::write(dir.join("md/b/b.docling.md"), b"# b (docling)").unwrap();

    dir
}

#[test]
fn test_create_update_delete_scenario() {
    let temp_dir = tempdir().unwrap();
    let dir = create_document_dir(temp_dir.path());

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());

    // First run: both files indexed, parser detection per convention.
    let reports = engine.create(&dir, &rescan_opts()).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].lines.len(), 2);

    let index = store.load(&dir).unwrap().unwrap();
    assert_eq!(index.files.len(), 2);

    let a = index.file("a.pdf").unwrap();
    assert!(a.parsers.detected.is_empty());
    assert_eq!(a.parsers.default, "");

    let b = index.file("b.pdf").unwrap();
    assert_eq!(b.parsers.detected, vec!["docling", "md"]);
    assert_eq!(b.parsers.default, "docling");

    // Second run with no filesystem changes: silent no-op.
    let reports = engine.update(&dir, &rescan_opts()).unwrap();
    assert!(reports[0].lines.is_empty());

    // Third run after deleting a.pdf and adding c.pdf.
    fs::remove_file(dir.join("a.pdf")).unwrap();
    fs::write(dir.join("c.pdf"), b"third document").unwrap();

    let reports = engine.update(&dir, &rescan_opts()).unwrap();
    let lines = &reports[0].lines;
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.starts_with("+ file c.pdf")));
    assert!(lines.iter().any(|l| l == "- file a.pdf"));

    let index = store.load(&dir).unwrap().unwrap();
    assert!(index.file("a.pdf").is_none());
    assert!(index.file("c.pdf").is_some());
}

#[test]
fn test_idempotent_persisted_bytes_modulo_timestamp() {
    let temp_dir = tempdir().unwrap();
    let dir = create_document_dir(temp_dir.path());

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());

    engine.create(&dir, &rescan_opts()).unwrap();
    let mut first = store.load(&dir).unwrap().unwrap();

    engine.update(&dir, &rescan_opts()).unwrap();
    let mut second = store.load(&dir).unwrap().unwrap();

    first.timestamp = 0.0;
    second.timestamp = 0.0;
    assert_eq!(first, second);
}

#[test]
fn test_annotation_metadata_survives_content_change() {
    let temp_dir = tempdir().unwrap();
    let dir = create_document_dir(temp_dir.path());

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());

    engine.create(&dir, &rescan_opts()).unwrap();

    // External tooling annotates a.pdf and sets a status.
    let mut index = store.load(&dir).unwrap().unwrap();
    {
        let a = index.files.iter_mut().find(|f| f.name == "a.pdf").unwrap();
        a.meta
            .insert("category".to_string(), serde_json::json!("contract"));
        a.meta
            .insert("description".to_string(), serde_json::json!("signed copy"));
        a.parsers.status = "reviewed".to_string();
    }
    store.save(&dir, &index).unwrap();

    // Content changes; annotations must be carried forward untouched.
    fs::write(dir.join("a.pdf"), b"amended first document").unwrap();
    engine.update(&dir, &rescan_opts()).unwrap();

    let index = store.load(&dir).unwrap().unwrap();
    let a = index.file("a.pdf").unwrap();
    assert_eq!(a.meta["category"], serde_json::json!("contract"));
    assert_eq!(a.meta["description"], serde_json::json!("signed copy"));
    assert_eq!(a.parsers.status, "reviewed");
    // The fingerprint itself did change.
    assert_eq!(a.size, b"amended first document".len() as u64);
}

#[test]
fn test_filter_invariants_in_persisted_index() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path().join("mixed");
    fs::create_dir_all(&dir).unwrap();

    fs::write(dir.join("doc.pdf"), b"doc").unwrap();
    fs::write(dir.join("notes.py"), b"code").unwrap();
    fs::write(dir.join(".hidden.pdf"), b"hidden").unwrap();
    fs::create_dir_all(dir.join("md")).unwrap();
    fs::create_dir_all(dir.join(".cache")).unwrap();
    fs::create_dir_all(dir.join("archive")).unwrap();

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());
    engine.create(&dir, &rescan_opts()).unwrap();

    let index = store.load(&dir).unwrap().unwrap();
    let names: Vec<&str> = index.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["doc.pdf"]);

    let dirs: Vec<&str> = index.directories.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(dirs, vec!["archive"]);
}

#[test]
fn test_default_parser_invariant_across_tree() {
    let temp_dir = tempdir().unwrap();
    let dir = create_document_dir(temp_dir.path());
    // An extra file parsed only by an unprioritized parser.
    fs::write(dir.join("x.pdf"), b"x").unwrap();
    fs::write(dir.join("md/x.zeta.md"), b"zeta output").unwrap();

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());
    engine.create(&dir, &rescan_opts()).unwrap();

    let index = store.load(&dir).unwrap().unwrap();
    for entry in &index.files {
        if entry.parsers.detected.is_empty() {
            assert_eq!(entry.parsers.default, "", "entry {}", entry.name);
        } else {
            assert!(
                entry.parsers.detected.contains(&entry.parsers.default),
                "default {} not in detected for {}",
                entry.parsers.default,
                entry.name
            );
        }
    }
    assert_eq!(index.file("x.pdf").unwrap().parsers.default, "zeta");
}

#[test]
fn test_recursive_scan_creates_one_index_per_directory() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("tree");
    fs::create_dir_all(root.join("inner")).unwrap();
    fs::write(root.join("top.pdf"), b"top").unwrap();
    fs::write(root.join("inner/leaf.pdf"), b"leaf").unwrap();

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());

    let opts = ScanOptions {
        recursive: true,
        max_age: Some(Duration::ZERO),
        ..Default::default()
    };
    let reports = engine.create(&root, &opts).unwrap();
    assert_eq!(reports.len(), 2);

    let top = store.load(&root).unwrap().unwrap();
    assert_eq!(top.files.len(), 1);
    assert_eq!(top.directories.len(), 1);
    assert_eq!(top.directories[0].name, "inner");

    let inner = store.load(&root.join("inner")).unwrap().unwrap();
    assert_eq!(inner.files[0].name, "leaf.pdf");

    // Clearing recursively removes both index files.
    let cleared = engine.clear(&root, true).unwrap();
    assert_eq!(cleared.len(), 2);
    assert!(store.load(&root).unwrap().is_none());
    assert!(store.load(&root.join("inner")).unwrap().is_none());
}

#[test]
fn test_recursive_rescan_is_silent() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("tree");
    fs::create_dir_all(root.join("inner")).unwrap();
    fs::write(root.join("top.pdf"), b"top").unwrap();
    fs::write(root.join("inner/leaf.pdf"), b"leaf").unwrap();

    let engine = IndexEngine::new(IndexConfig::default());
    let opts = ScanOptions {
        recursive: true,
        max_age: Some(Duration::ZERO),
        ..Default::default()
    };

    engine.create(&root, &opts).unwrap();

    // The first run wrote an index file into inner/; the parent's
    // fingerprint of inner/ must not see it, so an immediate second run
    // reports nothing anywhere in the tree.
    let reports = engine.update(&root, &opts).unwrap();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(
            report.lines.is_empty(),
            "unexpected changes for {}: {:?}",
            report.path.display(),
            report.lines
        );
    }
}

#[test]
fn test_uncategorized_report() {
    let temp_dir = tempdir().unwrap();
    let dir = create_document_dir(temp_dir.path());

    let engine = IndexEngine::new(IndexConfig::default());
    let store = IndexStore::new(engine.config());
    engine.create(&dir, &rescan_opts()).unwrap();

    // Categorize b.pdf externally.
    let mut index = store.load(&dir).unwrap().unwrap();
    index
        .files
        .iter_mut()
        .find(|f| f.name == "b.pdf")
        .unwrap()
        .meta
        .insert("category".to_string(), serde_json::json!("report"));
    store.save(&dir, &index).unwrap();

    let uncategorized = engine.uncategorized(&dir, false).unwrap();
    assert_eq!(uncategorized.len(), 1);
    assert!(uncategorized[0].ends_with("a.pdf"));
}

#[test]
fn test_update_missing_root_is_fatal() {
    let engine = IndexEngine::new(IndexConfig::default());
    let result = engine.update(Path::new("/nonexistent/docdex/root"), &ScanOptions::default());
    assert!(result.is_err());
}
