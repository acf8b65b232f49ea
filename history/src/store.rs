use crate::{
    clock::{Clock, IdGenerator, RandomIds, SystemClock},
    compression::{compress, decompress_text},
    directory::Directory,
    error::{
        CompressSnafu, DecompressSnafu, EncodeIndexSnafu, HistoryDirSnafu, HistoryError,
        ReadSnapshotSnafu, SnapshotNameSnafu, StorageError, WriteIndexSnafu, WriteSnapshotSnafu,
    },
    prune::{prune, RetentionPolicy},
    version::{encode_index, parse_index, Version, VersionType},
};
use snafu::ResultExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Hidden subdirectory of the content directory holding snapshots and index.
pub const HISTORY_DIR: &str = ".history";
/// The shared index of every file's versions.
pub const INDEX_FILE: &str = "history.json";

/// Version history of the files in one content directory.
///
/// Every operation is best effort. Failures are logged and surface as `None`
/// or an empty list, never as errors, so a broken history can not take the
/// editor down with it.
///
/// Callers serialize saves per file; two concurrent saves of one file may
/// race on the index.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: Arc<dyn Directory>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    policy: RetentionPolicy,
}

impl HistoryStore {
    pub fn new(dir: Arc<dyn Directory>) -> Self {
        Self {
            dir,
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIds),
            policy: RetentionPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Current time of the store's clock, in Unix milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Snapshot `content` as a new version of `file_name`.
    ///
    /// Auto-saves also prune the file's older auto-saves. Returns the new
    /// version, or `None` when it could not be stored.
    pub async fn save_version(
        &self,
        file_name: &str,
        content: &str,
        note: Option<&str>,
        kind: VersionType,
    ) -> Option<Version> {
        match self.try_save(file_name, content, note, kind).await {
            Ok(version) => {
                info!(file = file_name, id = %version.id, %kind, "saved version");
                Some(version)
            },
            Err(err) => {
                error!(file = file_name, %kind, %err, "failed to save version");
                None
            },
        }
    }

    async fn try_save(
        &self,
        file_name: &str,
        content: &str,
        note: Option<&str>,
        kind: VersionType,
    ) -> Result<Version, HistoryError> {
        let history = self
            .dir
            .get_or_create_subdirectory(HISTORY_DIR)
            .await
            .context(HistoryDirSnafu)?;

        let timestamp = self.clock.now_ms();
        let version_file = snapshot_name(history.as_ref(), file_name, timestamp)
            .await
            .context(SnapshotNameSnafu)?;
        let blob = compress(content.as_bytes()).context(CompressSnafu {
            name: &version_file,
        })?;
        history
            .write_file(&version_file, &blob)
            .await
            .context(WriteSnapshotSnafu {
                name: &version_file,
            })?;

        let mut index = load_index(history.as_ref()).await;
        let version = Version {
            id: self.ids.next_id(),
            file_name: file_name.to_string(),
            timestamp,
            note: note.map(str::to_string),
            version_file,
            kind,
        };
        index.insert(0, version.clone());

        let mut removed = Vec::new();
        if kind == VersionType::Auto {
            match prune(&index, file_name, timestamp, &self.policy) {
                Ok(pruned) => {
                    index = pruned.index;
                    removed = pruned.removed;
                },
                Err(err) => warn!(file = file_name, %err, "pruning aborted, keeping index unpruned"),
            }
        }

        let encoded = encode_index(&index).context(EncodeIndexSnafu)?;
        history
            .write_file(INDEX_FILE, &encoded)
            .await
            .context(WriteIndexSnafu)?;

        for stale in &removed {
            match history.delete_entry(&stale.version_file).await {
                Ok(()) => debug!(file = file_name, snapshot = %stale.version_file, "pruned snapshot"),
                Err(err) if err.is_not_found() => {
                    debug!(file = file_name, snapshot = %stale.version_file, "pruned snapshot was already gone");
                },
                Err(err) => {
                    warn!(file = file_name, snapshot = %stale.version_file, %err, "failed to delete pruned snapshot");
                },
            }
        }

        Ok(version)
    }

    /// Versions of `file_name`, newest first. Empty when there is no history.
    pub async fn get_versions(&self, file_name: &str) -> Vec<Version> {
        let history = match self.dir.subdirectory(HISTORY_DIR).await {
            Ok(history) => history,
            Err(err) if err.is_not_found() => return Vec::new(),
            Err(err) => {
                warn!(file = file_name, %err, "failed to open history directory");
                return Vec::new();
            },
        };

        load_index(history.as_ref())
            .await
            .into_iter()
            .filter(|version| version.file_name == file_name)
            .collect()
    }

    /// Decompressed content of `version`, or `None` when its snapshot is
    /// missing or unreadable.
    pub async fn get_version_content(&self, version: &Version) -> Option<String> {
        match self.try_load(version).await {
            Ok(content) => Some(content),
            Err(err) => {
                warn!(file = %version.file_name, id = %version.id, %err, "failed to load version content");
                None
            },
        }
    }

    async fn try_load(&self, version: &Version) -> Result<String, HistoryError> {
        let history = self
            .dir
            .subdirectory(HISTORY_DIR)
            .await
            .context(HistoryDirSnafu)?;
        let name = &version.version_file;
        let blob = history
            .read_file(name)
            .await
            .context(ReadSnapshotSnafu { name })?;
        decompress_text(&blob).context(DecompressSnafu { name })
    }
}

/// `{file_name}-{timestamp}.gz`, with `-1`, `-2`, ... appended to the stem
/// while the name is taken.
async fn snapshot_name(
    history: &dyn Directory,
    file_name: &str,
    timestamp: i64,
) -> Result<String, StorageError> {
    let stem = format!("{file_name}-{timestamp}");
    let mut name = format!("{stem}.gz");
    let mut attempt = 0u32;
    while history.exists(&name).await? {
        attempt += 1;
        name = format!("{stem}-{attempt}.gz");
    }
    Ok(name)
}

/// The index, or an empty one when it is missing or unreadable.
async fn load_index(history: &dyn Directory) -> Vec<Version> {
    match history.read_file(INDEX_FILE).await {
        Ok(bytes) => parse_index(&bytes),
        Err(err) if err.is_not_found() => Vec::new(),
        Err(err) => {
            warn!(%err, "failed to read history index, starting from an empty index");
            Vec::new()
        },
    }
}
