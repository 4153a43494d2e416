//! Configuration file support for dupe-viewer.
//!
//! Loads optional `.dupe-viewer/config.toml` from the workspace root.

use std::path::Path;
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::translate::Offsets;

/// Default search pattern for the jscpd JSON reporter output
pub const DEFAULT_REPORT_GLOB: &str = "**/jscpd-report.json";

/// Delay applied to text-change triggers
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DupesConfig {
    /// Glob matched against workspace-relative paths to find the report
    pub report_glob: String,
    /// Globs pruned from the workspace walk
    pub exclude: Vec<String>,
    /// Debounce window for document-change triggers, in milliseconds
    pub debounce_ms: u64,
    /// Line/column correction applied to report locations
    pub offsets: Offsets,
}

impl Default for DupesConfig {
    fn default() -> Self {
        Self {
            report_glob: DEFAULT_REPORT_GLOB.to_string(),
            exclude: vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()],
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            offsets: Offsets::default(),
        }
    }
}

impl DupesConfig {
    /// Load config from `.dupe-viewer/config.toml` in the given root directory.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".dupe-viewer").join("config.toml");
        match Self::try_load_from_path(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific path, surfacing read and parse failures.
    /// A missing file is not an error.
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Compile `report_glob` into a matcher
    pub fn report_matcher(&self) -> Result<GlobSet, ConfigError> {
        build_globset(std::slice::from_ref(&self.report_glob))
    }

    /// Compile `exclude` into a matcher
    pub fn exclude_matcher(&self) -> Result<GlobSet, ConfigError> {
        build_globset(&self.exclude)
    }
}

/// Build a globset from user patterns, skipping blank entries.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        if pat.trim().is_empty() {
            continue;
        }
        let glob = Glob::new(pat).map_err(|source| ConfigError::Glob {
            pattern: pat.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::Glob {
        pattern: patterns.join(","),
        source,
    })
}
