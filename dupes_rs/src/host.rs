//! Editor-facing interface.
//!
//! [`crate::viewer::DupeViewer`] only talks to the editor through [`Host`],
//! so passes can run against an LSP client, a CLI, or a test double.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::translate::Decoration;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
}

#[async_trait]
pub trait Host: Send + Sync {
    /// Root of the first workspace folder, if one is open
    async fn workspace_root(&self) -> Option<PathBuf>;

    /// Files under the workspace matching `pattern` (a glob relative to the
    /// workspace root). The first element is the one used.
    async fn find_files(&self, pattern: &str) -> Vec<PathBuf>;

    /// Absolute path of the document in the active editor
    async fn active_document(&self) -> Option<PathBuf>;

    /// Replace every highlight on `document` with `decorations`
    async fn apply_decorations(&self, document: &Path, decorations: Vec<Decoration>);

    /// Show a notice to the user
    async fn show_message(&self, level: MessageLevel, message: String);
}
