//! Version history for the files of a content directory.
//!
//! Each saved version is a gzip snapshot under `.history/` plus an entry in
//! the shared `.history/history.json` index. Auto-saves are pruned as they
//! are written (see [`prune`]); manual versions are kept forever.
//!
//! Storage, time and id generation are injected through [`Directory`],
//! [`Clock`] and [`IdGenerator`] so the retention rules can be tested against
//! an in-memory tree and a fixed clock.

mod clock;
pub mod compression;
mod directory;
mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod failing;
mod memory;
mod prune;
mod store;
mod version;

pub use clock::{Clock, IdGenerator, ManualClock, RandomIds, SequentialIds, SystemClock};
pub use directory::{validate_name, DirEntry, Directory, EntryKind, LocalDirectory};
pub use error::{HistoryError, PruneError, StorageError};
pub use memory::MemoryDirectory;
pub use prune::{prune, Pruned, RetentionPolicy};
pub use store::{HistoryStore, HISTORY_DIR, INDEX_FILE};
pub use version::{encode_index, parse_index, Version, VersionType};

#[cfg(test)]
mod tests;
