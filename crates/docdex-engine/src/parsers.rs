//! Parser detection from extraction-output naming conventions.
//!
//! Detection is purely string matching over an injected output-directory
//! listing, so it needs no filesystem access. The conventions probed for a
//! source file with stem `doc`:
//!
//! - `<output>/doc/doc.<primary>.md` — nested per-file folder, signals the
//!   primary parser (the only way the primary parser is counted);
//! - `<output>/doc.md` — plain markdown with no parser suffix, signals the
//!   `md` pseudo-parser;
//! - `<output>/doc.<parser>.md` — one detected parser per suffix, with the
//!   primary parser's suffix excluded to avoid double-counting.

/// Pseudo-parser id recorded for a plain `<stem>.md` artifact.
pub const PLAIN_PARSER: &str = "md";

/// Detect parser ids for one source-file stem from output-directory listings.
///
/// `output_listing` holds the names directly inside the output directory;
/// `nested_listing` holds the names inside `<output>/<stem>/` (empty when
/// that folder is absent). The result is sorted and de-duplicated so the
/// no-priority-match fallback in [`select_default`] is deterministic.
pub fn detect_parsers(
    stem: &str,
    primary_parser: &str,
    output_listing: &[String],
    nested_listing: &[String],
) -> Vec<String> {
    let mut detected = Vec::new();

    let primary_artifact = format!("{stem}.{primary_parser}.md");
    if nested_listing.iter().any(|n| *n == primary_artifact) {
        detected.push(primary_parser.to_string());
    }

    let plain = format!("{stem}.md");
    let prefix = format!("{stem}.");
    for name in output_listing {
        if *name == plain {
            detected.push(PLAIN_PARSER.to_string());
            continue;
        }
        if let Some(rest) = name.strip_prefix(&prefix) {
            if let Some(parser) = rest.strip_suffix(".md") {
                // Reject suffixes with embedded dots so a short stem never
                // claims a longer stem's artifacts (`a` vs `a.b.docling.md`).
                if !parser.is_empty() && !parser.contains('.') && parser != primary_parser {
                    detected.push(parser.to_string());
                }
            }
        }
    }

    detected.sort();
    detected.dedup();
    detected
}

/// Choose the default parser from a detected set.
///
/// First priority-list entry present in `detected` wins; otherwise the first
/// detected entry (lexicographic, since `detected` is sorted); empty when
/// nothing is detected.
pub fn select_default(priority: &[String], detected: &[String]) -> String {
    if detected.is_empty() {
        return String::new();
    }
    for candidate in priority {
        if detected.iter().any(|d| d == candidate) {
            return candidate.clone();
        }
    }
    detected[0].clone()
}
