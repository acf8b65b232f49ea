//! Directory abstraction used for content files and history snapshots.
//!
//! A [`Directory`] is a flat handle onto one directory: entries are addressed
//! by name, never by path. [`LocalDirectory`] maps it onto the file system;
//! [`MemoryDirectory`](crate::MemoryDirectory) keeps everything in memory.

use crate::error::StorageError;
use async_trait::async_trait;
use std::{fmt::Debug, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

#[async_trait]
pub trait Directory: Debug + Send + Sync {
    /// Entries directly inside this directory, in no particular order.
    async fn list_entries(&self) -> Result<Vec<DirEntry>, StorageError>;

    /// Open an existing subdirectory.
    async fn subdirectory(&self, name: &str) -> Result<Box<dyn Directory>, StorageError>;

    /// Open a subdirectory, creating it when missing.
    async fn get_or_create_subdirectory(
        &self,
        name: &str,
    ) -> Result<Box<dyn Directory>, StorageError>;

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or truncate the file `name` and write `bytes` to it.
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove a file or a directory with everything below it.
    async fn delete_entry(&self, name: &str) -> Result<(), StorageError>;

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self
            .list_entries()
            .await?
            .iter()
            .any(|entry| entry.name == name))
    }

    async fn read_text(&self, name: &str) -> Result<String, StorageError> {
        let bytes = self.read_file(name).await?;
        String::from_utf8(bytes).map_err(|err| StorageError::Io {
            name: name.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })
    }
}

/// Reject names that would escape the directory or address nothing.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A directory on the local file system.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    path: PathBuf,
}

impl LocalDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn entry(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.path.join(name))
    }
}

#[async_trait]
impl Directory for LocalDirectory {
    async fn list_entries(&self) -> Result<Vec<DirEntry>, StorageError> {
        let display = self.path.display().to_string();
        let mut reader = tokio::fs::read_dir(&self.path)
            .await
            .map_err(|err| StorageError::from_io(&display, err))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| StorageError::from_io(&display, err))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| StorageError::from_io(&name, err))?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry { name, kind });
        }
        Ok(entries)
    }

    async fn subdirectory(&self, name: &str) -> Result<Box<dyn Directory>, StorageError> {
        let path = self.entry(name)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|err| StorageError::from_io(name, err))?;
        if !metadata.is_dir() {
            return Err(StorageError::not_found(name));
        }
        Ok(Box::new(LocalDirectory::new(path)))
    }

    async fn get_or_create_subdirectory(
        &self,
        name: &str,
    ) -> Result<Box<dyn Directory>, StorageError> {
        let path = self.entry(name)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|err| StorageError::from_io(name, err))?;
        Ok(Box::new(LocalDirectory::new(path)))
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.entry(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|err| StorageError::from_io(name, err))
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.entry(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| StorageError::from_io(name, err))
    }

    async fn delete_entry(&self, name: &str) -> Result<(), StorageError> {
        let path = self.entry(name)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|err| StorageError::from_io(name, err))?;
        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        result.map_err(|err| StorageError::from_io(name, err))
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.entry(name)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|err| StorageError::from_io(name, err))
    }
}
