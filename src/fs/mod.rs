//! fs
//!
//! Filesystem-style reads of a repository at any revision.
//!
//! # Architecture
//!
//! - [`RevFs::resolve`] turns a path into a [`CanonicalPath`] by walking
//!   cached trees and expanding symlinks (`realpath`-style)
//! - [`RevFs`] answers `exists`/`isfile`/`isdir`/`listdir`/`open` on top
//! - [`SharedRevFs`] puts one `RevFs` behind a lock for use across threads
//!
//! Symlinks whose targets leave the repository resolve to
//! [`CanonicalPath::Escape`] and are read from the real filesystem.
//!
//! [`CanonicalPath`]: crate::core::types::CanonicalPath
//! [`CanonicalPath::Escape`]: crate::core::types::CanonicalPath::Escape

mod accessor;
mod error;
mod resolve;
mod shared;
mod walk;

pub use accessor::{Blob, OpenMode, RevFs};
pub use error::FsError;
pub use resolve::{components, is_escape, normalize, MAX_SYMLINK_HOPS};
pub use shared::SharedRevFs;
pub use walk::{glob_match, WalkEntry, WalkOrder};
