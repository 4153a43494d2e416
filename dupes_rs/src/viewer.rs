//! Detection pass: locate report, filter, translate, apply.

use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::config::DupesConfig;
use crate::debounce::Debouncer;
use crate::host::{Host, MessageLevel};
use crate::matcher::{relative_path, source_stats};
use crate::report::Report;
use crate::translate::{Decoration, translate};

pub const NO_ACTIVE_EDITOR: &str = "No active editor";

/// What started a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Manual `dupe-viewer.detectDupes` command
    Command,
    /// The active editor switched to another document
    EditorChanged,
    /// The active document's text changed (debounced)
    DocumentChanged,
}

impl Trigger {
    /// Edits fire constantly; only explicit actions get notices
    fn notifies(self) -> bool {
        !matches!(self, Trigger::DocumentChanged)
    }
}

/// Result of one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    NoActiveDocument,
    NoWorkspace,
    /// Active document is not under the workspace root
    OutsideWorkspace,
    ReportNotFound,
    ReportUnreadable,
    /// Report does not list the active document
    NotInReport,
    /// Report lists the document with zero clones
    NoClones,
    Applied { count: usize },
    /// The active document changed while the pass ran; its result was dropped
    Superseded,
}

pub struct DupeViewer<H> {
    host: Arc<H>,
    config: RwLock<DupesConfig>,
    debouncer: Debouncer,
}

impl<H: Host + 'static> DupeViewer<H> {
    pub fn new(host: Arc<H>, config: DupesConfig) -> Self {
        Self {
            host,
            config: RwLock::new(config),
            debouncer: Debouncer::new(),
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn config(&self) -> DupesConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap the configuration, e.g. once the workspace root is known
    pub fn set_config(&self, config: DupesConfig) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    }

    /// Route a trigger: document changes are debounced, everything else runs
    /// now and cancels any pending debounced pass.
    ///
    /// Returns the outcome for immediate passes, `None` when deferred.
    pub async fn trigger(self: &Arc<Self>, trigger: Trigger) -> Option<PassOutcome> {
        match trigger {
            Trigger::DocumentChanged => {
                let this = Arc::clone(self);
                let delay = self.config().debounce();
                self.debouncer.schedule(delay, async move {
                    this.detect(trigger).await;
                });
                None
            }
            Trigger::Command | Trigger::EditorChanged => {
                self.debouncer.cancel();
                Some(self.detect(trigger).await)
            }
        }
    }

    /// Drop a pending debounced pass, e.g. when the active document closes
    pub fn cancel_pending(&self) -> bool {
        self.debouncer.cancel()
    }

    /// Run one full pass against the active document
    pub async fn detect(&self, trigger: Trigger) -> PassOutcome {
        let outcome = self.run_pass(trigger).await;
        tracing::info!("Detection pass ({:?}) finished: {:?}", trigger, outcome);
        outcome
    }

    async fn run_pass(&self, trigger: Trigger) -> PassOutcome {
        let config = self.config();

        let Some(document) = self.host.active_document().await else {
            tracing::debug!("No active document");
            if trigger.notifies() {
                self.host
                    .show_message(MessageLevel::Info, NO_ACTIVE_EDITOR.to_string())
                    .await;
            }
            return PassOutcome::NoActiveDocument;
        };

        let Some(root) = self.host.workspace_root().await else {
            return self.clear(&document, PassOutcome::NoWorkspace).await;
        };

        let Some(rel) = relative_path(&document, &root) else {
            tracing::debug!(
                "{} is outside workspace {}",
                document.display(),
                root.display()
            );
            return self.clear(&document, PassOutcome::OutsideWorkspace).await;
        };

        let reports = self.host.find_files(&config.report_glob).await;
        let Some(report_path) = reports.into_iter().next() else {
            tracing::debug!("No report matching {}", config.report_glob);
            if trigger.notifies() {
                self.host
                    .show_message(
                        MessageLevel::Info,
                        format!("No duplicate report matching {} found", config.report_glob),
                    )
                    .await;
            }
            return self.clear(&document, PassOutcome::ReportNotFound).await;
        };

        let report = match Report::load(&report_path).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("{}", e);
                if trigger.notifies() {
                    self.host
                        .show_message(MessageLevel::Warning, e.to_string())
                        .await;
                }
                return self.clear(&document, PassOutcome::ReportUnreadable).await;
            }
        };

        let Some(stats) = source_stats(&report, &rel) else {
            tracing::debug!("{} not listed in {}", rel, report_path.display());
            return self.clear(&document, PassOutcome::NotInReport).await;
        };

        if trigger.notifies() {
            self.host
                .show_message(
                    MessageLevel::Info,
                    format!("Highlighted {} dupes", stats.clones),
                )
                .await;
        }

        if stats.clones == 0 {
            return self.clear(&document, PassOutcome::NoClones).await;
        }

        let decorations = translate(&report, &rel, config.offsets);
        let count = decorations.len();
        tracing::debug!("{}: {} duplicate ranges", rel, count);
        self.apply(&document, decorations, PassOutcome::Applied { count })
            .await
    }

    /// Drop stale highlights so nothing survives a pass that found none
    async fn clear(&self, document: &Path, outcome: PassOutcome) -> PassOutcome {
        self.apply(document, Vec::new(), outcome).await
    }

    /// Apply only if `document` is still active; a pass that outlived a
    /// file switch must not resurrect the old file's highlights.
    async fn apply(
        &self,
        document: &Path,
        decorations: Vec<Decoration>,
        outcome: PassOutcome,
    ) -> PassOutcome {
        if self.host.active_document().await.as_deref() != Some(document) {
            tracing::debug!(
                "{} is no longer active, dropping {:?}",
                document.display(),
                outcome
            );
            return PassOutcome::Superseded;
        }
        self.host.apply_decorations(document, decorations).await;
        outcome
    }
}
