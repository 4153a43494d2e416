//! LSP Backend implementation for dupe-viewer
//!
//! Maps editor events onto detection passes:
//! - `didOpen` and `dupeViewer/didChangeActiveEditor` switch the active
//!   document and run a pass immediately
//! - `didChange` on the active document runs a debounced pass
//! - `workspace/executeCommand` `dupe-viewer.detectDupes` runs a pass on demand

use std::path::PathBuf;
use std::sync::Arc;

use dupes::{DupeViewer, DupesConfig, Host, PassOutcome, Trigger};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::hover::hover_at;
use crate::host::LspHost;

/// Command id registered with the client
pub const DETECT_COMMAND: &str = "dupe-viewer.detectDupes";

/// Notification sent by clients when focus moves between editors
pub const ACTIVE_EDITOR_NOTIFICATION: &str = "dupeViewer/didChangeActiveEditor";

/// Params of [`ACTIVE_EDITOR_NOTIFICATION`]; `uri` is null when no editor has focus
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEditorParams {
    #[serde(default)]
    pub uri: Option<Url>,
}

/// dupe-viewer LSP backend state
pub struct Backend {
    host: Arc<LspHost>,
    viewer: Arc<DupeViewer<LspHost>>,
}

impl Backend {
    /// Create a new Backend instance
    pub fn new(client: Client) -> Self {
        let host = Arc::new(LspHost::new(client));
        let viewer = Arc::new(DupeViewer::new(Arc::clone(&host), DupesConfig::default()));
        Self { host, viewer }
    }

    /// Handler for [`ACTIVE_EDITOR_NOTIFICATION`]
    pub async fn did_change_active_editor(&self, params: ActiveEditorParams) {
        tracing::debug!("active editor: {:?}", params.uri);
        self.switch_to(params.uri).await;
    }

    async fn switch_to(&self, uri: Option<Url>) {
        let previous = self.host.active_uri().await;
        if let Some(previous) = previous {
            if uri.as_ref() != Some(&previous) {
                // Highlights never outlive a file switch
                self.host.forget(&previous).await;
            }
        }

        self.host.set_active(uri).await;
        self.viewer.trigger(Trigger::EditorChanged).await;
    }

    /// Pick up `.dupe-viewer/config.toml` once the workspace root is known
    async fn configure(&self, root: Option<PathBuf>) {
        let config = match &root {
            Some(root) => DupesConfig::load(root),
            None => DupesConfig::default(),
        };
        tracing::info!(
            "Report search: {} (debounce {}ms)",
            config.report_glob,
            config.debounce_ms
        );

        self.host.set_exclude(config.exclude.clone()).await;
        self.host.set_workspace_root(root).await;
        self.viewer.set_config(config);
    }
}

/// First workspace folder, falling back to the deprecated `rootUri`
#[allow(deprecated)]
fn workspace_root_from(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(|uri| uri.to_file_path().ok())
}

/// Optional URI argument of the detect command
fn command_target(arguments: &[Value]) -> Result<Option<Url>> {
    match arguments.first() {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Url::parse(s)
            .map(Some)
            .map_err(|e| Error::invalid_params(format!("Invalid document URI '{}': {}", s, e))),
        Some(other) => Err(Error::invalid_params(format!(
            "Expected a document URI, got {}",
            other
        ))),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root_from(&params);
        match &root {
            Some(root) => tracing::info!("Workspace root: {}", root.display()),
            None => tracing::info!("No workspace folder open"),
        }
        self.configure(root).await;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "dupes-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        ..Default::default()
                    },
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![DETECT_COMMAND.to_string()],
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("dupes-lsp server initialized");

        self.host
            .client()
            .log_message(MessageType::INFO, "dupe-viewer ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("dupes-lsp server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("did_open: {}", uri);
        self.switch_to(Some(uri)).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if !self.host.is_active(&uri).await {
            tracing::debug!("did_change on inactive document: {}", uri);
            return;
        }
        tracing::debug!("did_change: {}", uri);
        self.viewer.trigger(Trigger::DocumentChanged).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("did_close: {}", uri);

        self.host.forget(&uri).await;
        if self.host.is_active(&uri).await {
            self.host.set_active(None).await;
            // An edit pass for the closed document has nothing left to show
            self.viewer.cancel_pending();
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        tracing::debug!("hover: {} at {:?}", uri, position);

        Ok(hover_at(&self.host.decorations_for(&uri), position))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        if params.command != DETECT_COMMAND {
            return Err(Error::invalid_params(format!(
                "Unknown command: {}",
                params.command
            )));
        }

        if let Some(uri) = command_target(&params.arguments)? {
            if !self.host.is_active(&uri).await {
                if let Some(previous) = self.host.active_uri().await {
                    self.host.forget(&previous).await;
                }
                self.host.set_active(Some(uri)).await;
            }
        }

        let outcome = self.viewer.trigger(Trigger::Command).await;
        let count = match outcome {
            Some(PassOutcome::Applied { count }) => count,
            _ => 0,
        };
        tracing::debug!("{} finished: {:?}", DETECT_COMMAND, outcome);

        let document = self.host.active_document().await;
        Ok(Some(serde_json::json!({
            "document": document,
            "highlighted": count,
        })))
    }
}
