//! git
//!
//! Single interface for reading Git objects.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. Repository discovery uses
//! `git2`; object reads flow through one long-lived `git cat-file --batch`
//! child owned by [`CatFile`]. No other module spawns git or imports `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery ([`Repo::discover`], [`detect_worktree`])
//! - Object reads by `revision:path`, by id, or by commit expression
//! - Lifetime of the cat-file child (lazy start, teardown on drop)
//! - An in-memory [`mock::MockStore`] for tests
//!
//! # Example
//!
//! ```ignore
//! use revfs::core::types::Revision;
//! use revfs::git::{CatFile, GitCommand, ObjectRequest, ObjectStore, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::discover(Path::new("."))?;
//! let mut store = CatFile::new(GitCommand::new("git", repo));
//! let head = Revision::head();
//! let readme = store.fetch(ObjectRequest::Path { revision: &head, path: "README.md" })?;
//! println!("{} bytes", readme.bytes.len());
//! ```

pub mod mock;
mod pipe;
mod repo;

pub use pipe::{
    read_response, write_request, CatFile, ObjectRecord, ObjectRequest, ObjectStore, PipeError,
};
pub use repo::{detect_worktree, GitCommand, Repo, RepoError};
