//! Detection passes driven through an in-memory host.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dupes::config::build_globset;
use dupes::locator::ReportSearch;
use dupes::{
    Decoration, DupeViewer, DupesConfig, Host, MessageLevel, PassOutcome, Position, Trigger,
};
use tempfile::TempDir;

/// Get path to test fixtures
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[derive(Default)]
struct State {
    root: Option<PathBuf>,
    active: Option<PathBuf>,
    applied: Vec<(PathBuf, Vec<Decoration>)>,
    messages: Vec<(MessageLevel, String)>,
    /// Stall the next report search, like a cold file index
    search_delay: Option<Duration>,
}

#[derive(Default)]
struct FakeHost {
    state: Mutex<State>,
}

impl FakeHost {
    fn new(root: Option<&Path>, active: Option<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                root: root.map(Path::to_path_buf),
                active,
                ..State::default()
            }),
        })
    }

    fn set_active(&self, active: Option<PathBuf>) {
        self.state.lock().unwrap().active = active;
    }

    fn slow_next_search(&self, delay: Duration) {
        self.state.lock().unwrap().search_delay = Some(delay);
    }

    fn applied(&self) -> Vec<(PathBuf, Vec<Decoration>)> {
        self.state.lock().unwrap().applied.clone()
    }

    fn messages(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn levels(&self) -> Vec<MessageLevel> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .map(|(level, _)| *level)
            .collect()
    }

    /// Decorations applied to `document` across all passes
    fn shown_on(&self, document: &Path) -> usize {
        self.applied()
            .iter()
            .filter(|(doc, _)| doc == document)
            .map(|(_, d)| d.len())
            .sum()
    }
}

#[async_trait]
impl Host for FakeHost {
    async fn workspace_root(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().root.clone()
    }

    async fn find_files(&self, pattern: &str) -> Vec<PathBuf> {
        let Some(root) = self.workspace_root().await else {
            return Vec::new();
        };
        let delay = self.state.lock().unwrap().search_delay.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let search = ReportSearch::new(
            build_globset(&[pattern.to_string()]).unwrap(),
            build_globset(&DupesConfig::default().exclude).unwrap(),
        );
        search.find(&root)
    }

    async fn active_document(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().active.clone()
    }

    async fn apply_decorations(&self, document: &Path, decorations: Vec<Decoration>) {
        self.state
            .lock()
            .unwrap()
            .applied
            .push((document.to_path_buf(), decorations));
    }

    async fn show_message(&self, level: MessageLevel, message: String) {
        self.state.lock().unwrap().messages.push((level, message));
    }
}

/// Workspace with the fixture report under `report/`
fn workspace() -> TempDir {
    let temp = TempDir::new().expect("temp dir");
    let report_dir = temp.path().join("report");
    std::fs::create_dir_all(&report_dir).expect("mkdir");
    std::fs::copy(
        fixtures_path().join("jscpd-report.json"),
        report_dir.join("jscpd-report.json"),
    )
    .expect("copy fixture");
    temp
}

fn viewer(host: &Arc<FakeHost>) -> Arc<DupeViewer<FakeHost>> {
    Arc::new(DupeViewer::new(Arc::clone(host), DupesConfig::default()))
}

mod passes {
    use super::*;

    #[tokio::test]
    async fn highlights_first_file_side() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/checkout.js")));

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::Applied { count: 1 });

        let applied = host.applied();
        assert_eq!(applied.len(), 1);
        let (doc, decorations) = &applied[0];
        assert_eq!(doc, &ws.path().join("src/checkout.js"));
        assert_eq!(decorations.len(), 1);

        let d = &decorations[0];
        assert_eq!(d.range.start, Position::new(30, 10));
        assert_eq!(d.range.end, Position::new(44, 11));
        assert_eq!(
            d.hover,
            "Duplicate code found with file:\nsrc/cart.js\nStart: 10,\nEnd: 24."
        );
        assert_eq!(host.messages(), vec!["Highlighted 1 dupes".to_string()]);
    }

    #[tokio::test]
    async fn file_on_both_sides_of_different_pairs() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));

        let outcome = viewer(&host).detect(Trigger::EditorChanged).await;
        assert_eq!(outcome, PassOutcome::Applied { count: 2 });

        let (_, decorations) = &host.applied()[0];
        assert_eq!(decorations[0].range.start, Position::new(9, 8));
        assert_eq!(decorations[0].partner.file, "src/checkout.js");
        assert_eq!(decorations[1].range.start, Position::new(59, 12));
        assert_eq!(decorations[1].partner.file, "src/util/format.js");
    }

    #[tokio::test]
    async fn windows_report_paths_match() {
        let ws = workspace();
        let host = FakeHost::new(
            Some(ws.path()),
            Some(ws.path().join("src").join("util").join("format.js")),
        );

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::Applied { count: 1 });
        let (_, decorations) = &host.applied()[0];
        assert_eq!(decorations[0].range.start, Position::new(1, 8));
    }

    #[tokio::test]
    async fn file_with_zero_clones_clears() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/clean.js")));

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::NoClones);
        assert_eq!(host.applied()[0].1.len(), 0);
        assert_eq!(host.messages(), vec!["Highlighted 0 dupes".to_string()]);
    }

    #[tokio::test]
    async fn unlisted_file_gets_no_decorations() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/other.js")));

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::NotInReport);
        assert!(host.applied().iter().all(|(_, d)| d.is_empty()));
        assert!(host.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_report_completes_quietly() {
        let ws = TempDir::new().expect("temp dir");
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));

        let outcome = viewer(&host).detect(Trigger::DocumentChanged).await;
        assert_eq!(outcome, PassOutcome::ReportNotFound);
        assert!(host.applied().iter().all(|(_, d)| d.is_empty()));
        assert!(host.messages().is_empty());
    }

    #[tokio::test]
    async fn missing_report_on_command_notifies() {
        let ws = TempDir::new().expect("temp dir");
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::ReportNotFound);
        assert_eq!(host.messages().len(), 1);
        assert!(host.messages()[0].contains("jscpd-report.json"));
    }

    #[tokio::test]
    async fn malformed_report_is_unreadable() {
        let ws = TempDir::new().expect("temp dir");
        std::fs::write(ws.path().join("jscpd-report.json"), "{ nope").expect("write");
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::ReportUnreadable);
        assert!(host.applied().iter().all(|(_, d)| d.is_empty()));
        assert_eq!(host.levels(), vec![MessageLevel::Warning]);
    }

    #[tokio::test]
    async fn no_workspace_folder() {
        let host = FakeHost::new(None, Some(PathBuf::from("/tmp/a.js")));
        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::NoWorkspace);
    }

    #[tokio::test]
    async fn document_outside_workspace() {
        let ws = workspace();
        let elsewhere = TempDir::new().expect("temp dir");
        let host = FakeHost::new(Some(ws.path()), Some(elsewhere.path().join("src/cart.js")));

        let outcome = viewer(&host).detect(Trigger::Command).await;
        assert_eq!(outcome, PassOutcome::OutsideWorkspace);
    }
}

mod active_editor {
    use super::*;

    #[tokio::test]
    async fn no_active_editor_shows_notice() {
        let ws = TempDir::new().expect("temp dir");
        let host = FakeHost::new(Some(ws.path()), None);

        let outcome = viewer(&host).trigger(Trigger::EditorChanged).await;
        assert_eq!(outcome, Some(PassOutcome::NoActiveDocument));
        assert!(host.applied().is_empty());
        assert_eq!(host.messages(), vec!["No active editor".to_string()]);
    }

    #[tokio::test]
    async fn switching_to_file_without_report_notifies() {
        let ws = TempDir::new().expect("temp dir");
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));

        let outcome = viewer(&host).trigger(Trigger::EditorChanged).await;
        assert_eq!(outcome, Some(PassOutcome::ReportNotFound));
        assert_eq!(host.levels(), vec![MessageLevel::Info]);
        assert!(host.messages()[0].contains("jscpd-report.json"));
        assert!(host.applied().iter().all(|(_, d)| d.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn pass_outliving_a_switch_is_dropped() {
        let ws = workspace();
        let cart = ws.path().join("src/cart.js");
        let other = ws.path().join("src/other.js");
        let host = FakeHost::new(Some(ws.path()), Some(cart.clone()));
        let viewer = viewer(&host);
        host.slow_next_search(Duration::from_millis(300));

        let stale = tokio::spawn({
            let viewer = Arc::clone(&viewer);
            async move { viewer.detect(Trigger::Command).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        host.set_active(Some(other.clone()));
        let outcome = viewer.trigger(Trigger::EditorChanged).await;
        assert_eq!(outcome, Some(PassOutcome::NotInReport));

        assert_eq!(stale.await.unwrap(), PassOutcome::Superseded);
        assert_eq!(host.shown_on(&cart), 0);
        assert!(host.applied().iter().all(|(doc, _)| doc == &other));
    }

    #[tokio::test]
    async fn switching_files_replaces_decorations() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));
        let viewer = viewer(&host);

        viewer.trigger(Trigger::EditorChanged).await;
        host.set_active(Some(ws.path().join("src/other.js")));
        viewer.trigger(Trigger::EditorChanged).await;

        let applied = host.applied();
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].1.len(), 2);
        assert_eq!(applied[1].0, ws.path().join("src/other.js"));
        assert!(applied[1].1.is_empty());
    }
}

mod debounced {
    use super::*;

    /// Let timers fire and detached passes finish
    async fn settle(host: &FakeHost, expected: usize) {
        for _ in 0..50 {
            if host.applied().len() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_edits_runs_one_pass() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));
        let viewer = viewer(&host);

        for _ in 0..10 {
            assert_eq!(viewer.trigger(Trigger::DocumentChanged).await, None);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(host.applied().is_empty());

        settle(&host, 1).await;
        assert_eq!(host.applied().len(), 1);
        // Edits never pop notices
        assert!(host.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_trigger_cancels_pending_edit_pass() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));
        let viewer = viewer(&host);

        viewer.trigger(Trigger::DocumentChanged).await;
        viewer.trigger(Trigger::Command).await;
        settle(&host, 2).await;

        assert_eq!(host.applied().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_pass_in_flight_during_switch_is_dropped() {
        let ws = workspace();
        let cart = ws.path().join("src/cart.js");
        let other = ws.path().join("src/other.js");
        let host = FakeHost::new(Some(ws.path()), Some(cart.clone()));
        let viewer = viewer(&host);
        host.slow_next_search(Duration::from_millis(300));

        viewer.trigger(Trigger::DocumentChanged).await;
        // Timer has fired; the pass is stuck in the report search
        tokio::time::sleep(Duration::from_millis(600)).await;

        host.set_active(Some(other.clone()));
        viewer.trigger(Trigger::EditorChanged).await;
        settle(&host, 2).await;

        assert_eq!(host.shown_on(&cart), 0);
        assert!(host.applied().iter().all(|(doc, _)| doc == &other));
    }

    #[tokio::test(start_paused = true)]
    async fn closing_editor_drops_pending_edit_pass() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));
        let viewer = viewer(&host);

        viewer.trigger(Trigger::DocumentChanged).await;
        host.set_active(None);
        assert!(viewer.cancel_pending());
        settle(&host, 1).await;

        assert!(host.applied().is_empty());
        assert!(host.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn edit_pass_without_editor_stays_quiet() {
        let ws = workspace();
        let host = FakeHost::new(Some(ws.path()), Some(ws.path().join("src/cart.js")));
        let viewer = viewer(&host);

        viewer.trigger(Trigger::DocumentChanged).await;
        host.set_active(None);
        settle(&host, 1).await;

        assert!(host.applied().is_empty());
        assert!(host.messages().is_empty());
    }
}
