//! fs::accessor
//!
//! [`RevFs`]: the filesystem-style facade over one object store.
//!
//! # Example
//!
//! ```
//! use revfs::fs::RevFs;
//! use revfs::git::mock::{MockStore, MODE_DIR, MODE_FILE, MODE_SYMLINK};
//! use std::io::Read;
//!
//! let mut store = MockStore::new();
//! let body = store.blob(b"fn main() {}\n");
//! let src = store.tree(&[(MODE_FILE, "main.rs", body)]);
//! let link = store.blob(b"src/main.rs");
//! let root = store.tree(&[(MODE_DIR, "src", src), (MODE_SYMLINK, "entry", link)]);
//! let rev = store.commit("main", &root);
//!
//! let mut fs = RevFs::new(store);
//! assert!(fs.isdir(&rev, "src").unwrap());
//! assert!(fs.isfile(&rev, "entry").unwrap());
//! assert!(!fs.exists(&rev, "missing").unwrap());
//!
//! let mut text = String::new();
//! fs.open(&rev, "entry", "rb").unwrap().read_to_string(&mut text).unwrap();
//! assert_eq!(text, "fn main() {}\n");
//! ```

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::FsError;
use super::resolve::{Resolver, MAX_SYMLINK_HOPS};
use crate::core::config::Config;
use crate::core::types::{CanonicalPath, ObjectKind, Revision};
use crate::git::{CatFile, ObjectRequest, ObjectStore, PipeError, Repo};
use crate::tree::{CacheStats, TreeCache};

/// Modes accepted by [`RevFs::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// `"rb"`: read raw bytes.
    ReadBinary,
}

impl OpenMode {
    /// Parse the textual mode; only `"rb"` is supported.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "rb" => Some(OpenMode::ReadBinary),
            _ => None,
        }
    }
}

/// An open file: either object store content or a file outside the repository.
///
/// Store content is held in memory; disk files are closed when dropped.
#[derive(Debug)]
pub enum Blob {
    Store(Cursor<Vec<u8>>),
    Disk(File),
}

impl Blob {
    /// Check whether the content comes from outside the repository.
    pub fn is_disk(&self) -> bool {
        matches!(self, Blob::Disk(_))
    }
}

impl Read for Blob {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Blob::Store(cursor) => cursor.read(buf),
            Blob::Disk(file) => file.read(buf),
        }
    }
}

/// Read-only view of a repository at arbitrary revisions.
///
/// Every operation takes `&mut self`: the underlying object store answers
/// one request at a time. Use [`super::SharedRevFs`] to share one instance
/// between threads.
#[derive(Debug)]
pub struct RevFs<S = CatFile> {
    store: S,
    cache: TreeCache,
    max_hops: usize,
    escape_root: Option<PathBuf>,
}

impl RevFs<CatFile> {
    /// Open a view of `repo` backed by a `git cat-file --batch` child.
    ///
    /// The child starts on the first request. Relative symlink escapes are
    /// read relative to the repository root.
    pub fn for_repo(repo: Repo, config: &Config) -> Self {
        let root = repo.root();
        let store = CatFile::for_repo(config.git_binary(), repo);
        RevFs::new(store)
            .with_max_symlink_hops(config.max_symlink_hops())
            .with_escape_root(root)
    }
}

impl<S: ObjectStore> RevFs<S> {
    /// Create a view over `store` with the default symlink bound.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: TreeCache::new(),
            max_hops: MAX_SYMLINK_HOPS,
            escape_root: None,
        }
    }

    /// Set the maximum number of symlinks followed in one resolution.
    pub fn with_max_symlink_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Read relative escapes (`../x`) relative to `root` instead of the
    /// process working directory.
    pub fn with_escape_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.escape_root = Some(root.into());
        self
    }

    /// The underlying object store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Forget every cached tree.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Resolve `path` at `revision`, following symlinks.
    ///
    /// # Errors
    ///
    /// See [`FsError`]; `MissingFile`, `NotADirectory` and `SymlinkLoop`
    /// describe the path, anything else the store.
    pub fn resolve(
        &mut self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<CanonicalPath, FsError> {
        Resolver {
            store: &mut self.store,
            cache: &mut self.cache,
            max_hops: self.max_hops,
        }
        .resolve(revision, path.as_ref())
    }

    fn classify(
        &mut self,
        revision: &Revision,
        path: &Path,
        test: fn(&CanonicalPath) -> bool,
    ) -> Result<bool, FsError> {
        match self.resolve(revision, path) {
            Ok(resolved) => Ok(test(&resolved)),
            Err(e) if e.is_benign() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check whether anything exists at `path`.
    pub fn exists(&mut self, revision: &Revision, path: impl AsRef<Path>) -> Result<bool, FsError> {
        self.classify(revision, path.as_ref(), |_| true)
    }

    /// Check whether `path` is a file (symlinks out of the repository count).
    pub fn isfile(&mut self, revision: &Revision, path: impl AsRef<Path>) -> Result<bool, FsError> {
        self.classify(revision, path.as_ref(), CanonicalPath::is_file)
    }

    /// Check whether `path` is a directory.
    pub fn isdir(&mut self, revision: &Revision, path: impl AsRef<Path>) -> Result<bool, FsError> {
        self.classify(revision, path.as_ref(), CanonicalPath::is_dir)
    }

    /// List the names in directory `path`.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotADirectory` if `path` does not resolve to a
    /// directory in the repository.
    pub fn listdir(
        &mut self,
        revision: &Revision,
        path: impl AsRef<Path>,
    ) -> Result<BTreeSet<String>, FsError> {
        let path = path.as_ref();
        let dir = match self.resolve(revision, path)? {
            CanonicalPath::Directory(dir) => dir,
            CanonicalPath::File(_) | CanonicalPath::Escape(_) => {
                return Err(FsError::NotADirectory {
                    revision: revision.clone(),
                    path: path.to_string_lossy().into_owned(),
                })
            }
        };
        match self.cache.get(&mut self.store, revision, &dir) {
            Ok(tree) => Ok(tree.names().map(str::to_string).collect()),
            Err(PipeError::MissingObject { .. }) => Err(FsError::MissingFile {
                revision: revision.clone(),
                path: path.to_string_lossy().into_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Open the file at `path` for reading.
    ///
    /// Symlinks that leave the repository are followed onto the real
    /// filesystem.
    ///
    /// # Errors
    ///
    /// - [`FsError::BadMode`] unless `mode` is `"rb"`
    /// - [`FsError::IsDirectory`] if `path` is a directory
    /// - [`FsError::Io`] if an escaped path cannot be opened
    pub fn open(
        &mut self,
        revision: &Revision,
        path: impl AsRef<Path>,
        mode: &str,
    ) -> Result<Blob, FsError> {
        let path = path.as_ref();
        let shown = || path.to_string_lossy().into_owned();
        if OpenMode::parse(mode).is_none() {
            return Err(FsError::BadMode {
                revision: revision.clone(),
                path: shown(),
                mode: mode.to_string(),
            });
        }

        let file = match self.resolve(revision, path)? {
            CanonicalPath::Directory(_) => {
                return Err(FsError::IsDirectory {
                    revision: revision.clone(),
                    path: shown(),
                })
            }
            CanonicalPath::Escape(outside) => return self.open_outside(outside),
            CanonicalPath::File(file) => file,
        };

        let request = ObjectRequest::Path {
            revision,
            path: &file,
        };
        let record = match self.store.fetch(request) {
            Ok(record) => record,
            Err(PipeError::MissingObject { .. }) => {
                return Err(FsError::MissingFile {
                    revision: revision.clone(),
                    path: shown(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        match record.kind {
            ObjectKind::Blob => Ok(Blob::Store(Cursor::new(record.bytes))),
            ObjectKind::Tree => Err(FsError::IsDirectory {
                revision: revision.clone(),
                path: shown(),
            }),
            actual => Err(PipeError::UnexpectedKind {
                request: request.line(),
                expected: ObjectKind::Blob,
                actual,
            }
            .into()),
        }
    }

    fn open_outside(&self, outside: PathBuf) -> Result<Blob, FsError> {
        let target = match &self.escape_root {
            Some(root) if outside.is_relative() => root.join(&outside),
            _ => outside,
        };
        debug!(path = %target.display(), "reading outside the repository");
        File::open(&target)
            .map(Blob::Disk)
            .map_err(|source| FsError::Io {
                path: target,
                source,
            })
    }

    /// Read the whole file at `path`.
    pub fn read(&mut self, revision: &Revision, path: impl AsRef<Path>) -> Result<Vec<u8>, FsError> {
        let path = path.as_ref();
        let mut blob = self.open(revision, path, "rb")?;
        let mut bytes = Vec::new();
        blob.read_to_end(&mut bytes).map_err(|source| FsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(bytes)
    }

    /// Resolve a floating revision expression to the commit it names now.
    ///
    /// Tree lookups are cached per revision string; pinning first keeps
    /// results consistent if the repository moves while this view is alive.
    pub fn pin(&mut self, revision: &Revision) -> Result<Revision, FsError> {
        let request = ObjectRequest::Commit(revision);
        let record = self
            .store
            .fetch(request)?
            .expect_kind(ObjectKind::Commit, &request)?;
        debug!(%revision, commit = %record.id, "pinned revision");
        Ok(Revision::from(record.id))
    }
}
