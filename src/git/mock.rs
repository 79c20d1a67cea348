//! git::mock
//!
//! In-memory object store for deterministic testing.
//!
//! # Design
//!
//! `MockStore` implements [`ObjectStore`] over hand-built blobs and trees so
//! resolver behavior can be tested without spawning git. It records every
//! request it serves, which makes cache hits observable, and can simulate
//! the cat-file child dying.
//!
//! # Example
//!
//! ```
//! use revfs::git::mock::{MockStore, MODE_FILE};
//! use revfs::git::{ObjectRequest, ObjectStore};
//!
//! let mut store = MockStore::new();
//! let readme = store.blob(b"hello\n");
//! let root = store.tree(&[(MODE_FILE, "README", readme)]);
//! let rev = store.commit("main", &root);
//!
//! let record = store
//!     .fetch(ObjectRequest::Path { revision: &rev, path: "README" })
//!     .unwrap();
//! assert_eq!(record.bytes, b"hello\n");
//! assert_eq!(store.fetch_count(), 1);
//! ```

use std::collections::HashMap;

use super::pipe::{ObjectRecord, ObjectRequest, ObjectStore, PipeError};
use crate::core::types::{ContentId, ObjectKind, Revision};
use crate::tree::{decode, TreeEntry};

/// Mode of a regular file entry.
pub const MODE_FILE: &str = "100644";
/// Mode of an executable file entry.
pub const MODE_EXECUTABLE: &str = "100755";
/// Mode of a subdirectory entry.
pub const MODE_DIR: &str = "40000";
/// Mode of a symlink entry.
pub const MODE_SYMLINK: &str = "120000";
/// Mode of a submodule entry.
pub const MODE_GITLINK: &str = "160000";

#[derive(Debug, Clone)]
struct Object {
    kind: ObjectKind,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    commit: ContentId,
    root: ContentId,
}

/// In-memory object store.
#[derive(Debug, Default)]
pub struct MockStore {
    objects: HashMap<ContentId, Object>,
    revisions: HashMap<Revision, Snapshot>,
    next_id: u64,
    requests: Vec<String>,
    dead: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: ObjectKind, bytes: Vec<u8>) -> ContentId {
        self.next_id += 1;
        let id = ContentId::new(format!("{:040x}", self.next_id))
            .unwrap_or_else(|_| unreachable!("counter ids are 40 hex digits"));
        self.objects.insert(id.clone(), Object { kind, bytes });
        id
    }

    /// Add a blob.
    pub fn blob(&mut self, bytes: &[u8]) -> ContentId {
        self.insert(ObjectKind::Blob, bytes.to_vec())
    }

    /// Add a tree from `(mode, name, id)` records, encoded as git does.
    pub fn tree(&mut self, entries: &[(&str, &str, ContentId)]) -> ContentId {
        let mut raw = Vec::new();
        for (mode, name, id) in entries {
            raw.extend_from_slice(mode.as_bytes());
            raw.push(b' ');
            raw.extend_from_slice(name.as_bytes());
            raw.push(0);
            raw.extend(hex::decode(id.as_str()).unwrap_or_default());
        }
        self.raw_tree(raw)
    }

    /// Add a tree object with arbitrary (possibly corrupt) bytes.
    pub fn raw_tree(&mut self, bytes: Vec<u8>) -> ContentId {
        self.insert(ObjectKind::Tree, bytes)
    }

    /// Point revision `name` at a commit whose root tree is `root`.
    pub fn commit(&mut self, name: &str, root: &ContentId) -> Revision {
        let commit = self.insert(
            ObjectKind::Commit,
            format!("tree {}\n\nsnapshot {}\n", root, name).into_bytes(),
        );
        let revision =
            Revision::new(name).unwrap_or_else(|e| panic!("bad mock revision: {}", e));
        self.revisions.insert(
            revision.clone(),
            Snapshot {
                commit,
                root: root.clone(),
            },
        );
        revision
    }

    /// The root tree id of a revision created with [`MockStore::commit`].
    pub fn root_of(&self, revision: &Revision) -> ContentId {
        self.revisions
            .get(revision)
            .map(|s| s.root.clone())
            .unwrap_or_else(|| panic!("unknown mock revision {}", revision))
    }

    /// Make every later fetch fail as if the cat-file child exited.
    pub fn kill(&mut self) {
        self.dead = true;
    }

    /// Number of requests served so far (including failed ones).
    pub fn fetch_count(&self) -> usize {
        self.requests.len()
    }

    /// The request lines served so far, oldest first.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    fn record(&self, id: &ContentId) -> Option<ObjectRecord> {
        self.objects.get(id).map(|object| ObjectRecord {
            id: id.clone(),
            kind: object.kind,
            bytes: object.bytes.clone(),
        })
    }

    fn lookup(&self, revision: &Revision, path: &str) -> Option<ContentId> {
        let mut current = self.revisions.get(revision)?.root.clone();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let object = self.objects.get(&current)?;
            if object.kind != ObjectKind::Tree {
                return None;
            }
            let tree = decode(&object.bytes).ok()?;
            current = match tree.get(component)? {
                TreeEntry::Directory { id, .. }
                | TreeEntry::File { id, .. }
                | TreeEntry::Symlink { id, .. } => id.clone(),
            };
        }
        Some(current)
    }
}

impl ObjectStore for MockStore {
    fn fetch(&mut self, request: ObjectRequest<'_>) -> Result<ObjectRecord, PipeError> {
        self.requests.push(request.line());
        if self.dead {
            return Err(PipeError::GitDied {
                request: request.line(),
            });
        }
        let found = match request {
            ObjectRequest::Path { revision, path } => self
                .lookup(revision, path)
                .and_then(|id| self.record(&id)),
            ObjectRequest::Id(id) => self.record(id),
            ObjectRequest::Commit(revision) => self
                .revisions
                .get(revision)
                .and_then(|snapshot| self.record(&snapshot.commit)),
        };
        found.ok_or_else(|| request.missing())
    }
}
