//! cat command - Print files at a revision

use crate::cli::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Write the contents of each path to stdout, in order.
pub fn cat(ctx: &Context, paths: &[String]) -> Result<()> {
    let mut session = ctx.open()?;
    let rev = session.revision.clone();
    for path in paths {
        let bytes = session
            .fs
            .read(&rev, path)
            .with_context(|| format!("Cannot read '{}'", path))?;
        output::write_bytes(&bytes).context("Failed to write to stdout")?;
    }
    Ok(())
}
