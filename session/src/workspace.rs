use crate::error::SessionError;
use localwrite_document::Document;
use localwrite_history::{validate_name, Directory};
use localwrite_markdown::{deserialize, serialize};
use std::sync::Arc;
use tracing::debug;

const EXTENSION: &str = ".md";

/// The markdown files of one content directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: Arc<dyn Directory>,
}

impl Workspace {
    pub fn new(dir: Arc<dyn Directory>) -> Self {
        Self { dir }
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.dir
    }

    /// Names of the visible `.md` files, sorted.
    pub async fn list_markdown_files(&self) -> Result<Vec<String>, SessionError> {
        let mut files: Vec<String> = self
            .dir
            .list_entries()
            .await?
            .into_iter()
            .filter(|entry| {
                entry.is_file() && entry.name.ends_with(EXTENSION) && !entry.name.starts_with('.')
            })
            .map(|entry| entry.name)
            .collect();
        files.sort();
        Ok(files)
    }

    /// Create an empty file, appending `.md` when the name lacks it.
    ///
    /// Returns the name the file was created under. An existing file is left
    /// alone and reported as [`SessionError::AlreadyExists`].
    pub async fn create_file(&self, name: &str) -> Result<String, SessionError> {
        let name = if name.ends_with(EXTENSION) {
            name.to_string()
        } else {
            format!("{name}{EXTENSION}")
        };
        validate_name(&name)?;
        if self.dir.exists(&name).await? {
            return Err(SessionError::AlreadyExists { name });
        }
        self.dir.write_file(&name, b"").await?;
        debug!(file = %name, "created file");
        Ok(name)
    }

    pub async fn read_text(&self, name: &str) -> Result<String, SessionError> {
        Ok(self.dir.read_text(name).await?)
    }

    pub async fn read_document(&self, name: &str) -> Result<Document, SessionError> {
        let text = self.read_text(name).await?;
        Ok(deserialize(&text))
    }

    pub async fn write_document(&self, name: &str, document: &Document) -> Result<(), SessionError> {
        self.write_text(name, &serialize(document)).await
    }

    pub(crate) async fn write_text(&self, name: &str, text: &str) -> Result<(), SessionError> {
        self.dir.write_file(name, text.as_bytes()).await?;
        debug!(file = name, bytes = text.len(), "wrote file");
        Ok(())
    }
}
