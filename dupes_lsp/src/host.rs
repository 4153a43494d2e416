//! `Host` implementation backed by an LSP client
//!
//! LSP has no notion of decorations or an active editor, so this keeps both
//! locally: decorations are published as diagnostics and cached per URI for
//! hover, and the active document is whatever the client last opened,
//! focused, or named in a command.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use dupes::config::build_globset;
use dupes::locator::ReportSearch;
use dupes::{Decoration, Host, MessageLevel};
use tokio::sync::RwLock;
use tower_lsp::Client;
use tower_lsp::lsp_types::{MessageType, Url};

use crate::diagnostics::decoration_diagnostics;

pub struct LspHost {
    client: Client,
    /// First workspace folder
    workspace_root: RwLock<Option<PathBuf>>,
    /// Document treated as the active editor
    active: RwLock<Option<Url>>,
    /// Globs pruned from the report search
    exclude: RwLock<Vec<String>>,
    /// Last applied decorations per document
    decorations: DashMap<Url, Vec<Decoration>>,
}

impl LspHost {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            workspace_root: RwLock::new(None),
            active: RwLock::new(None),
            exclude: RwLock::new(Vec::new()),
            decorations: DashMap::new(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn set_workspace_root(&self, root: Option<PathBuf>) {
        *self.workspace_root.write().await = root;
    }

    pub async fn set_exclude(&self, exclude: Vec<String>) {
        *self.exclude.write().await = exclude;
    }

    pub async fn set_active(&self, uri: Option<Url>) {
        *self.active.write().await = uri;
    }

    pub async fn active_uri(&self) -> Option<Url> {
        self.active.read().await.clone()
    }

    pub async fn is_active(&self, uri: &Url) -> bool {
        self.active.read().await.as_ref() == Some(uri)
    }

    /// Cached decorations for hover lookups
    pub fn decorations_for(&self, uri: &Url) -> Vec<Decoration> {
        self.decorations
            .get(uri)
            .map(|d| d.value().clone())
            .unwrap_or_default()
    }

    /// Forget a document's decorations and clear them in the client
    pub async fn forget(&self, uri: &Url) {
        self.decorations.remove(uri);
        self.client
            .publish_diagnostics(uri.clone(), Vec::new(), None)
            .await;
    }
}

#[async_trait]
impl Host for LspHost {
    async fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.read().await.clone()
    }

    async fn find_files(&self, pattern: &str) -> Vec<PathBuf> {
        let Some(root) = self.workspace_root().await else {
            return Vec::new();
        };

        let exclude = self.exclude.read().await.clone();
        let search = match (build_globset(&[pattern.to_string()]), build_globset(&exclude)) {
            (Ok(pattern), Ok(exclude)) => ReportSearch::new(pattern, exclude),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("{}", e);
                self.client
                    .log_message(MessageType::WARNING, e.to_string())
                    .await;
                return Vec::new();
            }
        };

        match tokio::task::spawn_blocking(move || search.find(&root)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Report search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn active_document(&self) -> Option<PathBuf> {
        self.active_uri().await?.to_file_path().ok()
    }

    async fn apply_decorations(&self, document: &Path, decorations: Vec<Decoration>) {
        let Ok(uri) = Url::from_file_path(document) else {
            tracing::warn!("Cannot build URI for {}", document.display());
            return;
        };

        let root = self.workspace_root().await;
        let diagnostics = decoration_diagnostics(&decorations, root.as_deref());
        tracing::debug!("Publishing {} duplicate ranges for {}", diagnostics.len(), uri);

        self.decorations.insert(uri.clone(), decorations);
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }

    async fn show_message(&self, level: MessageLevel, message: String) {
        let kind = match level {
            MessageLevel::Info => MessageType::INFO,
            MessageLevel::Warning => MessageType::WARNING,
        };
        self.client.show_message(kind, message).await;
    }
}
