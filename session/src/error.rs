use localwrite_document::EditError;
use localwrite_history::StorageError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("{name} already exists")]
    AlreadyExists { name: String },

    #[error("version {id} of {file} is not available")]
    VersionUnavailable { file: String, id: Uuid },
}
