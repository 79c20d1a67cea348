//! tree
//!
//! Git tree objects: decoding and per-revision caching.
//!
//! # Modules
//!
//! - [`decode`](mod@decode) - Raw tree bytes to [`Tree`]
//! - [`cache`] - [`TreeCache`] keyed by `(revision, path)`

pub mod cache;
pub mod decode;

pub use cache::{CacheStats, TreeCache};
pub use decode::{decode, Tree, TreeEntry, TreeError};
