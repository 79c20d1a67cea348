//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens a [`Session`](crate::cli::Session) from the context
//! 2. Reads through [`crate::fs::RevFs`]
//! 3. Formats and displays output
//!
//! Handlers never touch the object store directly.

mod cat;
mod glob;
mod ls;
mod pin;
mod stat;
mod walk;

// Re-export command functions for testing and direct invocation
pub use cat::cat;
pub use glob::glob;
pub use ls::ls;
pub use pin::pin;
pub use stat::stat;
pub use walk::walk;

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Ls { path, classify } => ls(ctx, &path, classify),
        Command::Cat { paths } => cat(ctx, &paths),
        Command::Stat { paths } => stat(ctx, &paths),
        Command::Walk { root, bottom_up } => walk(ctx, &root, bottom_up),
        Command::Glob { pattern, dir } => glob(ctx, &dir, &pattern),
        Command::Pin => pin(ctx),
    }
}
