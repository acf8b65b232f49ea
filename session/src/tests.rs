use crate::*;
use localwrite_autoformat::InsertOutcome;
use localwrite_document::{BlockKind, EditError, Mark, Point, Selection};
use localwrite_history::{
    failing::{FailingDirectory, FailurePolicy, Operation},
    Directory, HistoryStore, ManualClock, MemoryDirectory, SequentialIds, VersionType,
    HISTORY_DIR,
};
use std::{sync::Arc, time::Duration};

const FILE: &str = "notes.md";
const SECOND: i64 = 1000;
const INTERVAL: i64 = 600 * SECOND;

struct Fixture {
    root: MemoryDirectory,
    clock: Arc<ManualClock>,
    workspace: Workspace,
    history: HistoryStore,
}

fn fixture() -> Fixture {
    fixture_over(|root| Arc::new(root))
}

/// Content and history both live in the directory `wrap` builds around a
/// fresh memory tree. `Fixture::root` reaches the tree directly.
fn fixture_over(wrap: impl FnOnce(MemoryDirectory) -> Arc<dyn Directory>) -> Fixture {
    localwrite_log::test();
    let root = MemoryDirectory::new();
    let dir = wrap(root.clone());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let history = HistoryStore::new(dir.clone())
        .with_clock(clock.clone())
        .with_ids(Arc::new(SequentialIds::default()));
    Fixture {
        root,
        clock,
        workspace: Workspace::new(dir),
        history,
    }
}

impl Fixture {
    async fn open(&self, content: &str) -> EditorSession {
        self.open_with(content, SessionSettings::default()).await
    }

    async fn open_with(&self, content: &str, settings: SessionSettings) -> EditorSession {
        self.root.write_file(FILE, content.as_bytes()).await.unwrap();
        EditorSession::open(self.workspace.clone(), self.history.clone(), FILE, settings)
            .await
            .unwrap()
    }

    async fn file(&self) -> String {
        self.root.read_text(FILE).await.unwrap()
    }
}

#[tokio::test]
async fn opening_a_missing_file_fails() {
    let f = fixture();
    let result = EditorSession::open(
        f.workspace.clone(),
        f.history.clone(),
        "missing.md",
        SessionSettings::default(),
    )
    .await;
    assert!(matches!(result, Err(SessionError::Storage(err)) if err.is_not_found()));
}

#[tokio::test]
async fn writes_are_debounced_to_the_last_edit() {
    let f = fixture();
    let mut session = f.open("").await;

    session.insert_text("h").unwrap();
    session.insert_text("i").unwrap();
    session.poll().await.unwrap();
    assert_eq!(f.file().await, "");

    f.clock.advance(999);
    session.insert_text("!").unwrap();
    f.clock.advance(500);
    session.poll().await.unwrap();
    assert_eq!(f.file().await, "");
    assert!(session.has_pending_write());

    f.clock.advance(500);
    session.poll().await.unwrap();
    assert_eq!(f.file().await, "hi!");
    assert!(!session.has_pending_write());
}

#[tokio::test]
async fn shortcuts_fire_through_the_session() {
    let f = fixture();
    let mut session = f.open("").await;

    assert_eq!(session.insert_text("#").unwrap(), InsertOutcome::Inserted);
    assert_eq!(
        session.insert_text(" ").unwrap(),
        InsertOutcome::Transformed(BlockKind::HeadingOne)
    );
    session.insert_text("Title").unwrap();
    session.flush().await.unwrap();

    assert_eq!(f.file().await, "# Title");
}

#[tokio::test]
async fn disabled_autoformat_inserts_literally() {
    let f = fixture();
    let settings = SessionSettings {
        autoformat: false,
        ..SessionSettings::default()
    };
    let mut session = f.open_with("", settings).await;

    session.insert_text(">").unwrap();
    assert_eq!(session.insert_text(" ").unwrap(), InsertOutcome::Inserted);
    assert_eq!(session.document().blocks()[0].kind, BlockKind::Paragraph);
    assert_eq!(session.document().blocks()[0].text(), "> ");
}

#[tokio::test]
async fn auto_save_needs_a_change_and_the_interval() {
    let f = fixture();
    let mut session = f.open("a").await;

    f.clock.advance(INTERVAL);
    session.poll().await.unwrap();
    assert!(session.versions().await.is_empty());

    session.insert_text("b").unwrap();
    f.clock.advance(INTERVAL - SECOND);
    session.poll().await.unwrap();
    assert_eq!(f.file().await, "ba");
    assert!(session.versions().await.is_empty());

    f.clock.advance(SECOND);
    session.poll().await.unwrap();
    let versions = session.versions().await;
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].kind, VersionType::Auto);
    assert_eq!(versions[0].note.as_deref(), Some("Auto-save"));
    assert_eq!(
        f.history.get_version_content(&versions[0]).await.as_deref(),
        Some("ba")
    );

    f.clock.advance(INTERVAL);
    session.poll().await.unwrap();
    assert_eq!(session.versions().await.len(), 1);
}

#[tokio::test]
async fn commit_resets_the_auto_save_baseline() {
    let f = fixture();
    let mut session = f.open("a").await;

    session.insert_text("x").unwrap();
    let version = session.commit(Some("draft")).await.unwrap();
    assert_eq!(version.kind, VersionType::Manual);
    assert_eq!(version.note.as_deref(), Some("draft"));

    f.clock.advance(INTERVAL);
    session.poll().await.unwrap();
    assert_eq!(session.versions().await, vec![version]);
}

#[tokio::test]
async fn restore_replaces_document_and_file() {
    let f = fixture();
    let mut session = f.open("one").await;
    let version = session.commit(None).await.unwrap();

    f.clock.advance(SECOND);
    session.insert_text("x").unwrap();
    session.flush().await.unwrap();
    assert_eq!(f.file().await, "xone");

    session.restore(&version).await.unwrap();
    assert_eq!(session.content(), "one");
    assert_eq!(f.file().await, "one");
    assert_eq!(
        session.selection(),
        &Selection::collapsed(Point::new(vec![0, 0], 0))
    );
    assert!(!session.has_pending_write());
}

#[tokio::test]
async fn unavailable_version_leaves_document_alone() {
    let f = fixture();
    let mut session = f.open("one").await;
    let version = session.commit(None).await.unwrap();
    let history = f.root.subdirectory(HISTORY_DIR).await.unwrap();
    history.delete_entry(&version.version_file).await.unwrap();

    session.insert_text("x").unwrap();
    let result = session.restore(&version).await;
    assert!(matches!(
        result,
        Err(SessionError::VersionUnavailable { id, .. }) if id == version.id
    ));
    assert_eq!(session.content(), "xone");
}

#[tokio::test]
async fn mark_hotkeys_style_the_selection() {
    let f = fixture();
    let mut session = f.open("Hello world").await;

    session.set_selection(Selection::new(
        Point::new(vec![0, 0], 6),
        Point::new(vec![0, 0], 11),
    ));
    assert!(session.toggle_mark(Mark::Bold).unwrap());
    assert!(session.has_pending_write());
    session.flush().await.unwrap();
    assert_eq!(f.file().await, "Hello **world**");

    session.set_selection(Selection::collapsed(Point::new(vec![0, 0], 0)));
    assert!(matches!(
        session.toggle_mark(Mark::Italic),
        Err(SessionError::Edit(_))
    ));
}

#[tokio::test]
async fn failed_auto_save_is_retried_next_interval() {
    let mut failing = None;
    let f = fixture_over(|root| {
        let dir = FailingDirectory::new(root, FailurePolicy::Never);
        failing = Some(dir.clone());
        Arc::new(dir)
    });
    let failing = failing.unwrap();
    let mut session = f.open("a").await;

    failing.set_policy(FailurePolicy::Matching(
        Operation::OpenDirectory,
        HISTORY_DIR.to_string(),
    ));
    session.insert_text("b").unwrap();
    f.clock.advance(INTERVAL);
    session.poll().await.unwrap();
    assert_eq!(f.file().await, "ba");

    failing.set_policy(FailurePolicy::Never);
    assert!(session.versions().await.is_empty());

    f.clock.advance(INTERVAL);
    session.poll().await.unwrap();
    assert_eq!(session.versions().await.len(), 1);
}

#[tokio::test]
async fn failed_file_write_surfaces() {
    let mut failing = None;
    let f = fixture_over(|root| {
        let dir = FailingDirectory::new(root, FailurePolicy::Never);
        failing = Some(dir.clone());
        Arc::new(dir)
    });
    let failing = failing.unwrap();
    let mut session = f.open("a").await;

    failing.set_policy(FailurePolicy::Always(Operation::Write));
    session.insert_text("b").unwrap();
    assert!(matches!(
        session.flush().await,
        Err(SessionError::Storage(_))
    ));
}

#[tokio::test]
async fn failed_debounced_write_stays_pending() {
    let mut failing = None;
    let f = fixture_over(|root| {
        let dir = FailingDirectory::new(root, FailurePolicy::Never);
        failing = Some(dir.clone());
        Arc::new(dir)
    });
    let failing = failing.unwrap();
    let mut session = f.open("a").await;

    failing.set_policy(FailurePolicy::Always(Operation::Write));
    session.insert_text("b").unwrap();
    f.clock.advance(SECOND);
    assert!(matches!(
        session.poll().await,
        Err(SessionError::Storage(_))
    ));
    assert!(session.has_pending_write());
    assert_eq!(f.file().await, "a");

    failing.set_policy(FailurePolicy::Never);
    session.poll().await.unwrap();
    assert!(!session.has_pending_write());
    assert_eq!(f.file().await, "ba");
}

#[tokio::test]
async fn line_breaks_are_rejected_without_scheduling_a_write() {
    let f = fixture();
    let mut session = f.open("a").await;

    let err = session.insert_text("x\ny").unwrap_err();
    assert!(matches!(err, SessionError::Edit(EditError::LineBreakInText)));
    assert!(!session.has_pending_write());
    assert_eq!(session.content(), "a");
}

#[test]
fn settings_come_from_config() {
    let mut config = localwrite_config::Config::default();
    config.editor.save_debounce_ms = 250;
    config.history.recent_versions = 3;

    let settings = SessionSettings::from(&config);
    assert_eq!(settings.save_debounce, Duration::from_millis(250));
    assert_eq!(retention_policy(&config.history).recent, 3);
}
