//! A [`Directory`] wrapper that injects storage failures for tests.

use crate::{
    directory::{DirEntry, Directory},
    error::StorageError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{io, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    OpenDirectory,
    Read,
    Write,
    Delete,
}

/// When an operation should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Pass everything through.
    Never,
    /// Fail every call of this operation.
    Always(Operation),
    /// Fail this operation for entry names containing the pattern.
    Matching(Operation, String),
}

/// Wrapper around a directory that fails calls selected by a policy.
///
/// Subdirectories opened through the wrapper are wrapped too and share the
/// policy, so it can be changed after a store has been built.
#[derive(Debug, Clone)]
pub struct FailingDirectory {
    inner: Arc<dyn Directory>,
    policy: Arc<Mutex<FailurePolicy>>,
}

impl FailingDirectory {
    pub fn new(inner: impl Directory + 'static, policy: FailurePolicy) -> Self {
        Self {
            inner: Arc::new(inner),
            policy: Arc::new(Mutex::new(policy)),
        }
    }

    pub fn set_policy(&self, policy: FailurePolicy) {
        *self.policy.lock() = policy;
    }

    fn check(&self, operation: Operation, name: &str) -> Result<(), StorageError> {
        let fail = match &*self.policy.lock() {
            FailurePolicy::Never => false,
            FailurePolicy::Always(op) => *op == operation,
            FailurePolicy::Matching(op, pattern) => *op == operation && name.contains(pattern.as_str()),
        };
        if fail {
            return Err(StorageError::Io {
                name: name.to_string(),
                source: io::Error::other(format!("injected {operation:?} failure")),
            });
        }
        Ok(())
    }

    fn wrap(&self, inner: Box<dyn Directory>) -> Box<dyn Directory> {
        Box::new(Self {
            inner: Arc::from(inner),
            policy: Arc::clone(&self.policy),
        })
    }
}

#[async_trait]
impl Directory for FailingDirectory {
    async fn list_entries(&self) -> Result<Vec<DirEntry>, StorageError> {
        self.check(Operation::List, "")?;
        self.inner.list_entries().await
    }

    async fn subdirectory(&self, name: &str) -> Result<Box<dyn Directory>, StorageError> {
        self.check(Operation::OpenDirectory, name)?;
        let inner = self.inner.subdirectory(name).await?;
        Ok(self.wrap(inner))
    }

    async fn get_or_create_subdirectory(
        &self,
        name: &str,
    ) -> Result<Box<dyn Directory>, StorageError> {
        self.check(Operation::OpenDirectory, name)?;
        let inner = self.inner.get_or_create_subdirectory(name).await?;
        Ok(self.wrap(inner))
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        self.check(Operation::Read, name)?;
        self.inner.read_file(name).await
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.check(Operation::Write, name)?;
        self.inner.write_file(name, bytes).await
    }

    async fn delete_entry(&self, name: &str) -> Result<(), StorageError> {
        self.check(Operation::Delete, name)?;
        self.inner.delete_entry(name).await
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        self.check(Operation::List, name)?;
        self.inner.exists(name).await
    }
}
