//! Workspace search for the duplicate report.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::config::DupesConfig;
use crate::error::ConfigError;
use crate::matcher::normalize;

/// Compiled search settings
#[derive(Debug, Clone)]
pub struct ReportSearch {
    pattern: GlobSet,
    exclude: GlobSet,
}

impl ReportSearch {
    pub fn new(pattern: GlobSet, exclude: GlobSet) -> Self {
        Self { pattern, exclude }
    }

    pub fn from_config(config: &DupesConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.report_matcher()?, config.exclude_matcher()?))
    }

    /// Every file under `root` matching the pattern, sorted by path
    pub fn find(&self, root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let rel = workspace_relative(entry.path(), root);
                // Probe a child path so `dir/**` prunes the directory itself
                let dir_probe = format!("{}/_", rel);
                !(self.exclude.is_match(&rel)
                    || (entry.file_type().is_dir() && self.exclude.is_match(&dir_probe)))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = workspace_relative(entry.path(), root);
            if self.pattern.is_match(&rel) {
                found.push(entry.into_path());
            }
        }

        found.sort();
        found
    }
}

/// Convenience wrapper: search `root` with the settings from `config`
pub fn find_reports(root: &Path, config: &DupesConfig) -> Result<Vec<PathBuf>, ConfigError> {
    Ok(ReportSearch::from_config(config)?.find(root))
}

/// First report under `root`, if any
pub fn find_first_report(root: &Path, config: &DupesConfig) -> Result<Option<PathBuf>, ConfigError> {
    Ok(find_reports(root, config)?.into_iter().next())
}

fn workspace_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    normalize(&rel.to_string_lossy())
}
