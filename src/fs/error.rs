//! fs::error
//!
//! Failures of path resolution and file access.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::Revision;
use crate::git::PipeError;

/// Errors from the revision filesystem.
///
/// Every path-level variant carries the revision and the path as the caller
/// gave it (not the symlink-expanded one).
#[derive(Debug, Error)]
pub enum FsError {
    /// Nothing exists at the path.
    #[error("no such file: {revision}:{path}")]
    MissingFile { revision: Revision, path: String },

    /// A file was required but the path is a directory.
    #[error("is a directory: {revision}:{path}")]
    IsDirectory { revision: Revision, path: String },

    /// A directory was required but the path (or one of its parents) is a file.
    #[error("not a directory: {revision}:{path}")]
    NotADirectory { revision: Revision, path: String },

    /// Too many symlinks were followed while resolving the path.
    #[error("too many levels of symbolic links: {revision}:{path}")]
    SymlinkLoop { revision: Revision, path: String },

    /// Only binary reads are supported.
    #[error("unsupported open mode '{mode}' for {revision}:{path}")]
    BadMode {
        revision: Revision,
        path: String,
        mode: String,
    },

    /// Reading a symlink target outside the repository failed.
    #[error("failed to read '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The object store failed.
    #[error(transparent)]
    Store(#[from] PipeError),
}

impl FsError {
    /// Check whether this failure just means "no such path".
    ///
    /// `exists`, `isfile` and `isdir` answer `false` for these and propagate
    /// everything else.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            FsError::MissingFile { .. } | FsError::NotADirectory { .. }
        )
    }

    /// Check whether the underlying pipe is gone and the owner must be rebuilt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FsError::Store(PipeError::GitDied { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev() -> Revision {
        Revision::new("HEAD").unwrap()
    }

    #[test]
    fn benign_subset() {
        let missing = FsError::MissingFile {
            revision: rev(),
            path: "a".into(),
        };
        let not_dir = FsError::NotADirectory {
            revision: rev(),
            path: "a/b".into(),
        };
        let looped = FsError::SymlinkLoop {
            revision: rev(),
            path: "l".into(),
        };
        assert!(missing.is_benign());
        assert!(not_dir.is_benign());
        assert!(!looped.is_benign());
    }

    #[test]
    fn git_died_is_fatal() {
        let err = FsError::from(PipeError::GitDied {
            request: "HEAD:".into(),
        });
        assert!(err.is_fatal());
        assert!(!err.is_benign());
    }

    #[test]
    fn messages_name_revision_and_path() {
        let err = FsError::IsDirectory {
            revision: rev(),
            path: "src".into(),
        };
        assert_eq!(err.to_string(), "is a directory: HEAD:src");
    }
}
