use crate::{
    directory::{validate_name, DirEntry, Directory, EntryKind},
    error::StorageError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug)]
enum Entry {
    File(Vec<u8>),
    Directory(BTreeMap<String, Entry>),
}

type Tree = BTreeMap<String, Entry>;

/// An in-memory directory tree.
///
/// Clones and subdirectory handles share the same tree, so a test can keep a
/// handle and observe what a store wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    root: Arc<Mutex<Tree>>,
    path: Vec<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn child(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            root: Arc::clone(&self.root),
            path,
        }
    }

    /// Run `f` against this directory's entries.
    fn with_tree<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> Result<R, StorageError> {
        let mut root = self.root.lock();
        let mut tree: &mut Tree = &mut root;
        for segment in &self.path {
            tree = match tree.get_mut(segment) {
                Some(Entry::Directory(children)) => children,
                _ => return Err(StorageError::not_found(segment.as_str())),
            };
        }
        Ok(f(tree))
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn list_entries(&self) -> Result<Vec<DirEntry>, StorageError> {
        self.with_tree(|tree| {
            tree.iter()
                .map(|(name, entry)| DirEntry {
                    name: name.clone(),
                    kind: match entry {
                        Entry::File(_) => EntryKind::File,
                        Entry::Directory(_) => EntryKind::Directory,
                    },
                })
                .collect()
        })
    }

    async fn subdirectory(&self, name: &str) -> Result<Box<dyn Directory>, StorageError> {
        validate_name(name)?;
        let is_dir = self.with_tree(|tree| matches!(tree.get(name), Some(Entry::Directory(_))))?;
        if !is_dir {
            return Err(StorageError::not_found(name));
        }
        Ok(Box::new(self.child(name)))
    }

    async fn get_or_create_subdirectory(
        &self,
        name: &str,
    ) -> Result<Box<dyn Directory>, StorageError> {
        validate_name(name)?;
        let created = self.with_tree(|tree| {
            match tree
                .entry(name.to_string())
                .or_insert_with(|| Entry::Directory(BTreeMap::new()))
            {
                Entry::Directory(_) => true,
                Entry::File(_) => false,
            }
        })?;
        if !created {
            return Err(StorageError::Io {
                name: name.to_string(),
                source: std::io::Error::other("a file with this name exists"),
            });
        }
        Ok(Box::new(self.child(name)))
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        validate_name(name)?;
        self.with_tree(|tree| match tree.get(name) {
            Some(Entry::File(bytes)) => Some(bytes.clone()),
            _ => None,
        })?
        .ok_or_else(|| StorageError::not_found(name))
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_name(name)?;
        let is_dir = self.with_tree(|tree| {
            if matches!(tree.get(name), Some(Entry::Directory(_))) {
                return true;
            }
            tree.insert(name.to_string(), Entry::File(bytes.to_vec()));
            false
        })?;
        if is_dir {
            return Err(StorageError::Io {
                name: name.to_string(),
                source: std::io::Error::other("is a directory"),
            });
        }
        Ok(())
    }

    async fn delete_entry(&self, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        self.with_tree(|tree| tree.remove(name))?
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(name))
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        validate_name(name)?;
        self.with_tree(|tree| tree.contains_key(name))
    }
}
