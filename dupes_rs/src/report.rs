//! jscpd JSON report model
//!
//! Mirrors the output of `jscpd --reporters json`. Every numeric field
//! defaults to zero and unknown fields are ignored, so reports from older
//! and newer detector versions load alike.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Top-level `jscpd-report.json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub statistics: Statistics,
    pub duplicates: Vec<Duplicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Aggregate statistics block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statistics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_date: Option<String>,
    /// Keyed by jscpd format name (`javascript`, `typescript`, `python`, ...)
    pub formats: BTreeMap<String, FormatStats>,
    pub total: StatsEntry,
}

/// Per-format statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatStats {
    /// Keyed by source path as written by the detector
    pub sources: BTreeMap<String, StatsEntry>,
    pub total: StatsEntry,
}

/// Line/token/clone counters for one source, one format, or the whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsEntry {
    pub lines: u64,
    pub tokens: u64,
    pub sources: u64,
    pub clones: u64,
    pub duplicated_lines: u64,
    pub duplicated_tokens: u64,
    pub percentage: f64,
    pub percentage_tokens: f64,
    pub new_duplicated_lines: u64,
    pub new_clones: u64,
}

/// One clone pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Duplicate {
    pub format: String,
    pub lines: u64,
    pub fragment: String,
    pub tokens: u64,
    pub first_file: FileRef,
    pub second_file: FileRef,
}

/// One side of a clone pair
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileRef {
    pub name: String,
    /// First line of the fragment (1-based)
    pub start: u64,
    /// Last line of the fragment (1-based)
    pub end: u64,
    pub start_loc: Location,
    pub end_loc: Location,
}

/// Line/column/offset triple as reported by jscpd
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub line: u64,
    pub column: u64,
    pub position: u64,
}

impl Report {
    /// Parse a report from JSON text
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read and parse a report file
    pub async fn load(path: &Path) -> Result<Self, ReportError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ReportError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_json(&content).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Blocking variant of [`Report::load`] for the CLI
    pub fn load_blocking(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Iterate over every `(format, source path, stats)` triple
    pub fn sources(&self) -> impl Iterator<Item = (&str, &str, &StatsEntry)> {
        self.statistics.formats.iter().flat_map(|(format, stats)| {
            stats
                .sources
                .iter()
                .map(move |(path, entry)| (format.as_str(), path.as_str(), entry))
        })
    }
}
