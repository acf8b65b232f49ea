use snafu::Snafu;
use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a [`Directory`](crate::Directory).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{name} not found")]
    NotFound { name: String },
    #[error("permission denied for {name}")]
    PermissionDenied { name: String },
    #[error("invalid entry name {name:?}")]
    InvalidName { name: String },
    #[error("i/o failure on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error raised while touching `name`.
    pub fn from_io(name: impl Into<String>, source: io::Error) -> Self {
        let name = name.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { name },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { name },
            _ => Self::Io { name, source },
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A failed stage of a history operation. These never reach callers of
/// [`HistoryStore`](crate::HistoryStore); they are logged where swallowed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HistoryError {
    #[snafu(display("failed to open history directory: {source}"))]
    HistoryDir { source: StorageError },

    #[snafu(display("failed to pick a snapshot name: {source}"))]
    SnapshotName { source: StorageError },

    #[snafu(display("failed to compress snapshot {name}: {source}"))]
    Compress { name: String, source: io::Error },

    #[snafu(display("failed to write snapshot {name}: {source}"))]
    WriteSnapshot { name: String, source: StorageError },

    #[snafu(display("failed to encode history index: {source}"))]
    EncodeIndex { source: serde_json::Error },

    #[snafu(display("failed to write history index: {source}"))]
    WriteIndex { source: StorageError },

    #[snafu(display("failed to read snapshot {name}: {source}"))]
    ReadSnapshot { name: String, source: StorageError },

    #[snafu(display("failed to decompress snapshot {name}: {source}"))]
    Decompress { name: String, source: io::Error },
}

/// Pruning could not be carried out; the index is kept unpruned.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PruneError {
    #[snafu(display("timestamp {timestamp} of version {id} has no calendar date"))]
    TimestampOutOfRange { id: Uuid, timestamp: i64 },

    #[snafu(display("current time {now} has no calendar date"))]
    NowOutOfRange { now: i64 },
}
