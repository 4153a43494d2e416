//! Active-file lookups against a loaded report
//!
//! Report paths are relative to the directory jscpd ran in, using whatever
//! separator the detector's platform produced (Windows paths arrive with
//! escaped `\\`). Everything is compared in a normalized `/` form.

use std::path::Path;

use crate::report::{Report, StatsEntry};

/// Normalize a path for comparison: `/` separators, no doubled separators,
/// no leading `./` or `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        let ch = if ch == '\\' { '/' } else { ch };
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }

    let mut trimmed = out.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Path of `document` relative to `root`, normalized.
///
/// Returns `None` when the document does not live under the root.
pub fn relative_path(document: &Path, root: &Path) -> Option<String> {
    if let Ok(rel) = document.strip_prefix(root) {
        let rel = normalize(&rel.to_string_lossy());
        return if rel.is_empty() { None } else { Some(rel) };
    }

    // Fall back to textual comparison so mixed-separator inputs still match
    let doc = normalize(&document.to_string_lossy());
    let root = normalize(&root.to_string_lossy());
    let rest = doc.strip_prefix(&root)?;
    if !root.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let rel = normalize(rest);
    if rel.is_empty() { None } else { Some(rel) }
}

/// True when two paths name the same file regardless of separator style
pub fn same_path(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Source statistics for `rel`, searching every format in name order
pub fn source_stats<'a>(report: &'a Report, rel: &str) -> Option<&'a StatsEntry> {
    let wanted = normalize(rel);
    report
        .sources()
        .find(|(_, path, _)| normalize(path) == wanted)
        .map(|(_, _, entry)| entry)
}

/// True when the report lists `rel` with at least one clone
pub fn has_duplicates(report: &Report, rel: &str) -> bool {
    source_stats(report, rel).is_some_and(|entry| entry.clones > 0)
}
