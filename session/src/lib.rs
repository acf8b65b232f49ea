//! Editing sessions over the markdown files of a content directory.
//!
//! [`Workspace`] lists, creates, reads and writes the files. An
//! [`EditorSession`] holds one open file, routes typing through the block
//! shortcuts, debounces writes and snapshots the content into the version
//! history.

mod error;
mod session;
mod settings;
mod workspace;

pub use error::SessionError;
pub use session::EditorSession;
pub use settings::{retention_policy, SessionSettings};
pub use workspace::Workspace;

#[cfg(test)]
mod tests;
