//! tree::cache
//!
//! Memoized tree lookups keyed by `(revision, directory path)`.
//!
//! Entries are never invalidated individually: a fixed revision's trees
//! never change. Callers passing floating expressions such as branch names
//! either pin them first or call [`TreeCache::clear`] when the repository
//! may have moved.

use std::collections::HashMap;

use tracing::debug;

use super::decode::{decode, Tree};
use crate::core::types::{ObjectKind, Revision};
use crate::git::{ObjectRequest, ObjectStore, PipeError};

/// Hit/miss counters for a [`TreeCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Decoded trees for one resolver.
#[derive(Debug, Default)]
pub struct TreeCache {
    trees: HashMap<Revision, HashMap<String, Tree>>,
    stats: CacheStats,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tree of `path` (`""` for the root) at `revision`.
    ///
    /// On a miss the tree object is fetched from `store`, decoded and kept.
    ///
    /// # Errors
    ///
    /// Propagates store failures, and returns `PipeError::UnexpectedKind`
    /// if `path` names something other than a tree.
    ///
    /// # Panics
    ///
    /// Panics if the store returns a tree object that does not decode; that
    /// means the repository's object database is corrupt.
    pub fn get<S: ObjectStore + ?Sized>(
        &mut self,
        store: &mut S,
        revision: &Revision,
        path: &str,
    ) -> Result<&Tree, PipeError> {
        let by_path = self.trees.entry(revision.clone()).or_default();
        if by_path.contains_key(path) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            debug!(%revision, path, "tree cache miss");
            let request = ObjectRequest::Path { revision, path };
            let record = store.fetch(request)?.expect_kind(ObjectKind::Tree, &request)?;
            let tree = match decode(&record.bytes) {
                Ok(tree) => tree,
                Err(e) => panic!("tree {} ({}:{}) is corrupt: {}", record.id, revision, path, e),
            };
            by_path.insert(path.to_string(), tree);
        }
        Ok(&by_path[path])
    }

    /// Drop every cached tree.
    pub fn clear(&mut self) {
        self.trees.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
