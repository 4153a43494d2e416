//! dupe-viewer Language Server Protocol implementation
//!
//! Highlights jscpd duplicates in the active document as diagnostics with
//! hover text.

use tower_lsp::{LspService, Server};

mod backend;
mod diagnostics;
mod host;
mod hover;

pub use backend::{ACTIVE_EDITOR_NOTIFICATION, ActiveEditorParams, Backend, DETECT_COMMAND};
pub use host::LspHost;

/// Run the LSP server over stdio
pub async fn run_server() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(ACTIVE_EDITOR_NOTIFICATION, Backend::did_change_active_editor)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
