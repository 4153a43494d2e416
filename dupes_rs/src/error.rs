use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or parsing a duplicate report
#[derive(Error, Debug)]
pub enum ReportError {
    /// No report matched the search pattern
    #[error("No duplicate report found in {root:?}. Run `jscpd --reporters json` first.")]
    NotFound { root: PathBuf },

    /// Report file exists but could not be read
    #[error("Error reading report {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report file is not valid jscpd JSON
    #[error("Error parsing report {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while loading `.dupe-viewer/config.toml`
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
