//! revfs - Read-only filesystem view of a git repository at any revision
//!
//! revfs answers `exists`, `isfile`, `isdir`, `listdir` and `open` for any
//! path at any revision without checking anything out. Object reads go
//! through one long-lived `git cat-file --batch` child; symlinks are
//! followed the way `realpath` would, and links that leave the repository
//! are read from the real filesystem.
//!
//! # Architecture
//!
//! The codebase is layered, each layer only using the ones below it:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to `fs`)
//! - [`fs`] - Path resolution and the [`fs::RevFs`] facade
//! - [`tree`] - Tree object decoding and the per-revision tree cache
//! - [`git`] - Single interface to git: discovery and the cat-file pipe
//! - [`core`] - Domain types and configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. Results for a revision string never change while it stays cached
//! 2. Symlink resolution terminates: at most 40 links are followed by default
//! 3. A failed or confused pipe is never reused
//! 4. A malformed tree object is a fatal error, never silently skipped

pub mod cli;
pub mod core;
pub mod fs;
pub mod git;
pub mod logging;
pub mod tree;
pub mod ui;
