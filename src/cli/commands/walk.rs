//! walk command - Recursively list a tree at a revision

use crate::cli::Context;
use crate::fs::WalkOrder;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Print one line per directory under `root`.
pub fn walk(ctx: &Context, root: &str, bottom_up: bool) -> Result<()> {
    let mut session = ctx.open()?;
    let rev = session.revision.clone();
    let order = if bottom_up {
        WalkOrder::BottomUp
    } else {
        WalkOrder::TopDown
    };
    let entries = session
        .fs
        .walk(&rev, root, order)
        .with_context(|| format!("Cannot walk '{}'", root))?;
    for entry in &entries {
        println!("{}", output::format_walk_entry(entry));
    }
    Ok(())
}
