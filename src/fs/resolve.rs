//! fs::resolve
//!
//! `realpath` for a revision: walk a path component by component through
//! the cached trees, following symlinks stored in the repository.
//!
//! # Algorithm
//!
//! The walk keeps three pieces of state: the components still to visit, the
//! repository path resolved so far, and the number of symlinks followed.
//! Each step looks the next component up in the tree of the resolved-so-far
//! path:
//!
//! - a file ends the walk (or fails with `NotADirectory` if components remain)
//! - a directory ends the walk if nothing remains, otherwise descends
//! - a symlink's target is normalized against the link's directory; targets
//!   leaving the repository end the walk as an escape, others are spliced in
//!   front of the remaining components and the walk restarts at the root
//!
//! More than `max_hops` symlinks in one resolution fail with `SymlinkLoop`.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::error::FsError;
use crate::core::types::{CanonicalPath, ContentId, ObjectKind, Revision};
use crate::git::{ObjectRequest, ObjectStore, PipeError};
use crate::tree::{TreeCache, TreeEntry};

pub use crate::core::config::MAX_SYMLINK_HOPS;

/// Split a caller-supplied, OS-native relative path into store components.
///
/// `.` components and leading separators are dropped; `..` is kept and will
/// simply fail to match any tree entry.
pub fn components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => None,
        })
        .collect()
}

/// Lexically normalize symlink `target` relative to directory `base`.
///
/// Absolute targets ignore `base`. `..` segments that climb above the start
/// are kept for relative paths and dropped for absolute ones.
///
/// # Example
///
/// ```
/// use revfs::fs::normalize;
///
/// assert_eq!(normalize("a/b", "../c"), "a/c");
/// assert_eq!(normalize("a", "../../outside"), "../outside");
/// assert_eq!(normalize("a", "/etc/./hosts"), "/etc/hosts");
/// assert_eq!(normalize("a", ".."), "");
/// ```
pub fn normalize(base: &str, target: &str) -> String {
    let absolute = target.starts_with('/');
    let joined = if absolute || base.is_empty() {
        target.to_string()
    } else {
        format!("{}/{}", base, target)
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            name => parts.push(name),
        }
    }

    let body = parts.join("/");
    if absolute {
        format!("/{}", body)
    } else {
        body
    }
}

/// Check whether a normalized target leaves the repository.
///
/// Only targets starting with `/` or `../` escape. A bare `..` stays inside
/// and is looked up like any other component, so it resolves as missing.
pub fn is_escape(normalized: &str) -> bool {
    normalized.starts_with('/') || normalized.starts_with("../")
}

/// Loop state of one resolution.
#[derive(Debug)]
struct Walk {
    remaining: VecDeque<String>,
    resolved: String,
    hops: usize,
}

impl Walk {
    fn new(components: Vec<String>) -> Self {
        Self {
            remaining: components.into(),
            resolved: String::new(),
            hops: 0,
        }
    }

    fn descend(&mut self, name: &str) {
        if !self.resolved.is_empty() {
            self.resolved.push('/');
        }
        self.resolved.push_str(name);
    }

    /// Continue from the root with `target`'s components in front.
    fn restart(&mut self, target: &str) {
        for component in target.rsplit('/').filter(|c| !c.is_empty()) {
            self.remaining.push_front(component.to_string());
        }
        self.resolved.clear();
    }
}

/// Resolves paths for one store and cache.
pub(crate) struct Resolver<'a, S: ?Sized> {
    pub store: &'a mut S,
    pub cache: &'a mut TreeCache,
    pub max_hops: usize,
}

impl<S: ObjectStore + ?Sized> Resolver<'_, S> {
    /// Resolve `path` at `revision`.
    ///
    /// # Errors
    ///
    /// - [`FsError::MissingFile`] if a component does not exist (or the
    ///   revision does not)
    /// - [`FsError::NotADirectory`] if a file is used as a directory
    /// - [`FsError::SymlinkLoop`] if more than `max_hops` links are followed
    /// - [`FsError::Store`] if the object store fails
    pub fn resolve(&mut self, revision: &Revision, path: &Path) -> Result<CanonicalPath, FsError> {
        let shown = path.to_string_lossy().into_owned();
        let fail = |make: fn(Revision, String) -> FsError| make(revision.clone(), shown.clone());

        let mut walk = Walk::new(components(path));
        if walk.remaining.is_empty() {
            // The root is never a symlink.
            return Ok(CanonicalPath::root());
        }

        while let Some(component) = walk.remaining.pop_front() {
            let parent = walk.resolved.clone();
            let entry = match self.lookup(revision, &parent, &component) {
                Ok(entry) => entry,
                Err(PipeError::MissingObject { .. }) => return Err(fail(missing_file)),
                Err(e) => return Err(e.into()),
            };
            walk.descend(&component);

            match entry {
                None => return Err(fail(missing_file)),
                Some(TreeEntry::File { .. }) if !walk.remaining.is_empty() => {
                    return Err(fail(not_a_directory));
                }
                Some(TreeEntry::File { .. }) => return Ok(CanonicalPath::File(walk.resolved)),
                Some(TreeEntry::Directory { .. }) if walk.remaining.is_empty() => {
                    return Ok(CanonicalPath::Directory(walk.resolved));
                }
                Some(TreeEntry::Directory { .. }) => {}
                Some(TreeEntry::Symlink { id, .. }) => {
                    walk.hops += 1;
                    if walk.hops > self.max_hops {
                        return Err(fail(symlink_loop));
                    }
                    let target = self.read_link(&id)?;
                    let link_to = normalize(&parent, &target);
                    debug!(link = %walk.resolved, target = %link_to, hops = walk.hops, "following symlink");
                    if is_escape(&link_to) {
                        return Ok(CanonicalPath::Escape(PathBuf::from(link_to)));
                    }
                    walk.restart(&link_to);
                }
            }
        }

        // Only reachable when a symlink pointed at the root.
        Ok(CanonicalPath::root())
    }

    fn lookup(
        &mut self,
        revision: &Revision,
        dir: &str,
        name: &str,
    ) -> Result<Option<TreeEntry>, PipeError> {
        let tree = self.cache.get(&mut *self.store, revision, dir)?;
        Ok(tree.get(name).cloned())
    }

    /// Read a link target as UTF-8.
    ///
    /// Invalid bytes become U+FFFD, so a target that is not UTF-8 names a
    /// path no tree entry matches and resolves as missing.
    fn read_link(&mut self, id: &ContentId) -> Result<String, PipeError> {
        let request = ObjectRequest::Id(id);
        let record = self
            .store
            .fetch(request)?
            .expect_kind(ObjectKind::Blob, &request)?;
        Ok(String::from_utf8_lossy(&record.bytes).into_owned())
    }
}

fn missing_file(revision: Revision, path: String) -> FsError {
    FsError::MissingFile { revision, path }
}

fn not_a_directory(revision: Revision, path: String) -> FsError {
    FsError::NotADirectory { revision, path }
}

fn symlink_loop(revision: Revision, path: String) -> FsError {
    FsError::SymlinkLoop { revision, path }
}
