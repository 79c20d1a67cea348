//! fs::shared
//!
//! A [`RevFs`] that can be shared between threads.
//!
//! The cat-file protocol is strictly request/response, so every call takes
//! the one lock for its whole duration. A multi-step sequence that must not
//! interleave with other callers goes through [`SharedRevFs::with`].

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::accessor::{Blob, RevFs};
use super::error::FsError;
use super::walk::{WalkEntry, WalkOrder};
use crate::core::types::{CanonicalPath, Revision};
use crate::git::{CatFile, ObjectStore};

/// Cloneable, thread-safe handle to one [`RevFs`].
#[derive(Debug)]
pub struct SharedRevFs<S = CatFile> {
    inner: Arc<Mutex<RevFs<S>>>,
}

impl<S> Clone for SharedRevFs<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ObjectStore> From<RevFs<S>> for SharedRevFs<S> {
    fn from(fs: RevFs<S>) -> Self {
        Self::new(fs)
    }
}

impl<S: ObjectStore> SharedRevFs<S> {
    pub fn new(fs: RevFs<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(fs)),
        }
    }

    /// Run `f` with exclusive access to the underlying view.
    pub fn with<T>(&self, f: impl FnOnce(&mut RevFs<S>) -> T) -> T {
        f(&mut self.inner.lock())
    }

    pub fn resolve(
        &self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<CanonicalPath, FsError> {
        self.inner.lock().resolve(revision, path)
    }

    pub fn exists(&self, revision: &Revision, path: impl AsRef<Path>) -> Result<bool, FsError> {
        self.inner.lock().exists(revision, path)
    }

    pub fn isfile(&self, revision: &Revision, path: impl AsRef<Path>) -> Result<bool, FsError> {
        self.inner.lock().isfile(revision, path)
    }

    pub fn isdir(&self, revision: &Revision, path: impl AsRef<Path>) -> Result<bool, FsError> {
        self.inner.lock().isdir(revision, path)
    }

    pub fn listdir(
        &self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<BTreeSet<String>, FsError> {
        self.inner.lock().listdir(revision, path)
    }

    pub fn open(
        &self,
        revision: &Revision,
        path: impl AsRef<Path>,
        mode: &str,
    ) -> Result<Blob, FsError> {
        self.inner.lock().open(revision, path, mode)
    }

    pub fn read(&self, revision: &Revision, path: impl AsRef<Path>) -> Result<Vec<u8>, FsError> {
        self.inner.lock().read(revision, path)
    }

    pub fn glob(
        &self,
        revision: &Revision,
        dir: impl AsRef<Path>,
        pattern: &str,
    ) -> Result<Vec<String>, FsError> {
        self.inner.lock().glob(revision, dir, pattern)
    }

    pub fn walk(
        &self,
        revision: &Revision,
        root: impl AsRef<Path>,
        order: WalkOrder,
    ) -> Result<Vec<WalkEntry>, FsError> {
        self.inner.lock().walk(revision, root, order)
    }

    pub fn pin(&self, revision: &Revision) -> Result<Revision, FsError> {
        self.inner.lock().pin(revision)
    }
}
