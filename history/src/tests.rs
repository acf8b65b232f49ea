use crate::{
    failing::{FailingDirectory, FailurePolicy, Operation},
    *,
};
use std::sync::Arc;
use uuid::Uuid;

const HOUR: i64 = 60 * 60 * 1000;
const DAY: i64 = 24 * HOUR;

fn noon() -> i64 {
    "2024-01-20T12:00:00Z"
        .parse::<chrono::DateTime<chrono::Utc>>()
        .unwrap()
        .timestamp_millis()
}

struct Fixture {
    root: MemoryDirectory,
    clock: Arc<ManualClock>,
    store: HistoryStore,
}

fn fixture() -> Fixture {
    localwrite_log::test();
    let root = MemoryDirectory::new();
    let clock = Arc::new(ManualClock::new(noon()));
    let store = HistoryStore::new(Arc::new(root.clone()))
        .with_clock(clock.clone())
        .with_ids(Arc::new(SequentialIds::default()));
    Fixture { root, clock, store }
}

async fn history(root: &MemoryDirectory) -> Box<dyn Directory> {
    root.subdirectory(HISTORY_DIR).await.unwrap()
}

async fn stored_index(root: &MemoryDirectory) -> Vec<Version> {
    let bytes = history(root).await.read_file(INDEX_FILE).await.unwrap();
    parse_index(&bytes)
}

async fn snapshot_count(root: &MemoryDirectory) -> usize {
    history(root)
        .await
        .list_entries()
        .await
        .unwrap()
        .iter()
        .filter(|entry| entry.name.ends_with(".gz"))
        .count()
}

/// Write `versions` as the index, with a snapshot for each.
async fn seed(root: &MemoryDirectory, versions: &[Version]) {
    let history = root.get_or_create_subdirectory(HISTORY_DIR).await.unwrap();
    for version in versions {
        let blob = compression::compress(b"old").unwrap();
        history.write_file(&version.version_file, &blob).await.unwrap();
    }
    history
        .write_file(INDEX_FILE, &encode_index(versions).unwrap())
        .await
        .unwrap();
}

fn seeded(n: u128, file_name: &str, timestamp: i64, kind: VersionType) -> Version {
    Version {
        id: Uuid::from_u128(1_000 + n),
        file_name: file_name.to_string(),
        timestamp,
        note: None,
        version_file: format!("{file_name}-{timestamp}.gz"),
        kind,
    }
}

#[tokio::test]
async fn saved_content_can_be_read_back() {
    let f = fixture();
    let version = f
        .store
        .save_version("notes.md", "# Notes\n- [ ] task", Some("first"), VersionType::Manual)
        .await
        .unwrap();

    assert_eq!(version.file_name, "notes.md");
    assert_eq!(version.timestamp, noon());
    assert_eq!(version.version_file, format!("notes.md-{}.gz", noon()));
    assert_eq!(version.note.as_deref(), Some("first"));

    let versions = f.store.get_versions("notes.md").await;
    assert_eq!(versions, vec![version.clone()]);
    assert_eq!(
        f.store.get_version_content(&version).await.as_deref(),
        Some("# Notes\n- [ ] task")
    );
}

#[tokio::test]
async fn versions_are_listed_newest_first() {
    let f = fixture();
    for content in ["one", "two", "three"] {
        f.store
            .save_version("a.md", content, None, VersionType::Manual)
            .await
            .unwrap();
        f.clock.advance(1_000);
    }

    let versions = f.store.get_versions("a.md").await;
    let timestamps: Vec<_> = versions.iter().map(|v| v.timestamp).collect();
    assert_eq!(timestamps, vec![noon() + 2_000, noon() + 1_000, noon()]);
    assert_eq!(
        f.store.get_version_content(&versions[0]).await.as_deref(),
        Some("three")
    );
}

#[tokio::test]
async fn no_history_means_no_versions() {
    let f = fixture();
    assert!(f.store.get_versions("a.md").await.is_empty());
    assert!(!f.root.exists(HISTORY_DIR).await.unwrap());
}

#[tokio::test]
async fn auto_save_prunes_to_recent_and_daily_pools() {
    let f = fixture();
    let now = noon();
    let file = "test.md";

    let mut versions = Vec::new();
    let mut n = 0;
    let mut add = |hours_before: i64, days_before: i64, kind: VersionType| {
        n += 1;
        let timestamp = now - days_before * DAY - hours_before * HOUR;
        let mut version = seeded(n, file, timestamp, kind);
        if kind == VersionType::Manual {
            // Shares its millisecond with an auto-save.
            version.version_file = format!("{file}-{timestamp}-1.gz");
        }
        versions.push(version);
    };
    for hours in 0..15 {
        add(hours, 0, VersionType::Auto);
    }
    for hours in 0..5 {
        add(hours, 1, VersionType::Auto);
    }
    for hours in 0..5 {
        add(hours, 2, VersionType::Auto);
    }
    add(2, 2, VersionType::Manual);
    seed(&f.root, &versions).await;
    assert_eq!(snapshot_count(&f.root).await, 26);

    let new = f
        .store
        .save_version(file, "new content", Some("Auto-save"), VersionType::Auto)
        .await
        .unwrap();
    // A snapshot with the same millisecond already exists.
    assert_eq!(new.version_file, format!("{file}-{now}-1.gz"));

    let index = stored_index(&f.root).await;
    let auto: Vec<_> = index.iter().filter(|v| v.is_auto()).collect();
    let manual: Vec<_> = index.iter().filter(|v| !v.is_auto()).collect();
    assert_eq!(auto.len(), 13);
    assert_eq!(manual.len(), 1);
    assert_eq!(index[0].id, new.id);

    // Beyond the recent pool, one per day survives: the newest of each.
    let survivors: Vec<_> = auto[10..].iter().map(|v| v.timestamp).collect();
    assert_eq!(
        survivors,
        vec![now - 9 * HOUR, now - 13 * HOUR, now - 2 * DAY]
    );

    // 27 auto and manual snapshots minus 13 pruned.
    assert_eq!(snapshot_count(&f.root).await, 14);
    let history = history(&f.root).await;
    for version in &index {
        assert!(history.exists(&version.version_file).await.unwrap());
    }
}

#[tokio::test]
async fn manual_saves_are_never_pruned() {
    let f = fixture();
    let store = f.store.clone().with_policy(RetentionPolicy {
        recent: 1,
        daily_window_days: 0,
    });

    let manual = store
        .save_version("a.md", "keep me", Some("release"), VersionType::Manual)
        .await
        .unwrap();
    for i in 0..5 {
        f.clock.advance(DAY);
        store
            .save_version("a.md", &format!("draft {i}"), Some("Auto-save"), VersionType::Auto)
            .await
            .unwrap();
    }

    let versions = store.get_versions("a.md").await;
    assert_eq!(versions.len(), 2);
    assert!(versions[0].is_auto());
    assert_eq!(versions[1], manual);
    assert_eq!(
        store.get_version_content(&manual).await.as_deref(),
        Some("keep me")
    );
}

#[tokio::test]
async fn pruning_one_file_leaves_others_alone() {
    let f = fixture();
    let store = f.store.clone().with_policy(RetentionPolicy {
        recent: 1,
        daily_window_days: 0,
    });

    for _ in 0..3 {
        store.save_version("b.md", "b", None, VersionType::Auto).await;
        f.clock.advance(1_000);
    }
    assert_eq!(store.get_versions("b.md").await.len(), 1);

    seed(
        &f.root,
        &[
            seeded(1, "b.md", noon() - HOUR, VersionType::Auto),
            seeded(2, "b.md", noon() - 2 * HOUR, VersionType::Auto),
        ],
    )
    .await;
    for _ in 0..3 {
        store.save_version("a.md", "a", None, VersionType::Auto).await;
        f.clock.advance(1_000);
    }

    let a = store.get_versions("a.md").await;
    let b = store.get_versions("b.md").await;
    assert_eq!(a.len(), 1);
    assert!(a.iter().all(|v| v.file_name == "a.md"));
    assert_eq!(b.len(), 2);
    assert!(b.iter().all(|v| v.file_name == "b.md"));
}

#[tokio::test]
async fn corrupt_index_is_replaced() {
    let f = fixture();
    let history = f.root.get_or_create_subdirectory(HISTORY_DIR).await.unwrap();
    history.write_file(INDEX_FILE, b"{ not json").await.unwrap();

    assert!(f.store.get_versions("a.md").await.is_empty());
    let version = f
        .store
        .save_version("a.md", "text", None, VersionType::Auto)
        .await
        .unwrap();
    assert_eq!(stored_index(&f.root).await, vec![version]);
}

#[tokio::test]
async fn missing_snapshot_yields_no_content() {
    let f = fixture();
    let version = f
        .store
        .save_version("a.md", "text", None, VersionType::Manual)
        .await
        .unwrap();
    history(&f.root)
        .await
        .delete_entry(&version.version_file)
        .await
        .unwrap();
    assert_eq!(f.store.get_version_content(&version).await, None);
}

#[tokio::test]
async fn corrupt_snapshot_yields_no_content() {
    let f = fixture();
    let version = f
        .store
        .save_version("a.md", "text", None, VersionType::Manual)
        .await
        .unwrap();
    history(&f.root)
        .await
        .write_file(&version.version_file, b"garbage")
        .await
        .unwrap();
    assert_eq!(f.store.get_version_content(&version).await, None);
}

#[tokio::test]
async fn snapshot_write_failure_is_swallowed() {
    localwrite_log::test();
    let root = MemoryDirectory::new();
    let failing = FailingDirectory::new(
        root.clone(),
        FailurePolicy::Matching(Operation::Write, ".gz".into()),
    );
    let store = HistoryStore::new(Arc::new(failing));

    assert_eq!(
        store
            .save_version("a.md", "text", None, VersionType::Manual)
            .await,
        None
    );
    assert!(store.get_versions("a.md").await.is_empty());
    assert!(!history(&root).await.exists(INDEX_FILE).await.unwrap());
}

#[tokio::test]
async fn index_write_failure_is_swallowed() {
    localwrite_log::test();
    let root = MemoryDirectory::new();
    let failing = FailingDirectory::new(
        root.clone(),
        FailurePolicy::Matching(Operation::Write, INDEX_FILE.into()),
    );
    let store = HistoryStore::new(Arc::new(failing.clone()));

    assert_eq!(
        store
            .save_version("a.md", "text", None, VersionType::Manual)
            .await,
        None
    );

    failing.set_policy(FailurePolicy::Never);
    assert!(store.get_versions("a.md").await.is_empty());
    assert!(store
        .save_version("a.md", "again", None, VersionType::Manual)
        .await
        .is_some());
}

#[tokio::test]
async fn unavailable_history_directory_is_swallowed() {
    localwrite_log::test();
    let failing = FailingDirectory::new(
        MemoryDirectory::new(),
        FailurePolicy::Always(Operation::OpenDirectory),
    );
    let store = HistoryStore::new(Arc::new(failing));

    assert_eq!(
        store
            .save_version("a.md", "text", None, VersionType::Auto)
            .await,
        None
    );
    assert!(store.get_versions("a.md").await.is_empty());
}

#[tokio::test]
async fn failed_snapshot_deletion_does_not_fail_the_save() {
    localwrite_log::test();
    let root = MemoryDirectory::new();
    let clock = Arc::new(ManualClock::new(noon()));
    let failing = FailingDirectory::new(root.clone(), FailurePolicy::Always(Operation::Delete));
    let store = HistoryStore::new(Arc::new(failing))
        .with_clock(clock.clone())
        .with_policy(RetentionPolicy {
            recent: 1,
            daily_window_days: 0,
        });

    for _ in 0..3 {
        assert!(store
            .save_version("a.md", "text", None, VersionType::Auto)
            .await
            .is_some());
        clock.advance(1_000);
    }

    assert_eq!(stored_index(&root).await.len(), 1);
    assert_eq!(snapshot_count(&root).await, 3);
}

#[tokio::test]
async fn prune_failure_keeps_the_new_version() {
    let f = fixture();
    let broken = seeded(1, "a.md", i64::MAX, VersionType::Auto);
    let old: Vec<_> = (0..12)
        .map(|i| seeded(10 + i, "a.md", noon() - (i as i64 + 1) * DAY, VersionType::Auto))
        .collect();
    let mut versions = vec![broken];
    versions.extend(old);
    seed(&f.root, &versions).await;

    let new = f
        .store
        .save_version("a.md", "text", None, VersionType::Auto)
        .await
        .unwrap();

    let index = stored_index(&f.root).await;
    assert_eq!(index.len(), 14);
    assert_eq!(index[0].id, new.id);
    assert_eq!(snapshot_count(&f.root).await, 14);
}

#[tokio::test]
async fn local_directory_end_to_end() {
    localwrite_log::test();
    let temp = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(Arc::new(LocalDirectory::new(temp.path())));

    let version = store
        .save_version("a.md", "hello", Some("first"), VersionType::Manual)
        .await
        .unwrap();

    let history = temp.path().join(HISTORY_DIR);
    assert!(history.join(INDEX_FILE).is_file());
    let blob = std::fs::read(history.join(&version.version_file)).unwrap();
    assert_eq!(&blob[..2], &[0x1f, 0x8b]);

    assert_eq!(store.get_versions("a.md").await, vec![version.clone()]);
    assert_eq!(
        store.get_version_content(&version).await.as_deref(),
        Some("hello")
    );
}
