//! glob command - Match directory entries against a pattern

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print the names in `dir` matching `pattern`, sorted.
pub fn glob(ctx: &Context, dir: &str, pattern: &str) -> Result<()> {
    let mut session = ctx.open()?;
    let rev = session.revision.clone();
    let names = session
        .fs
        .glob(&rev, dir, pattern)
        .with_context(|| format!("Cannot search '{}'", dir))?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
