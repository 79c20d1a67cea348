//! pin command - Resolve a revision to a commit id

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print the commit the session revision names right now.
pub fn pin(ctx: &Context) -> Result<()> {
    let mut session = ctx.open()?;
    let rev = session.revision.clone();
    let commit = session
        .fs
        .pin(&rev)
        .with_context(|| format!("Cannot resolve revision '{}'", rev))?;
    println!("{}", commit);
    Ok(())
}
