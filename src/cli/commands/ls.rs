//! ls command - List a directory at a revision

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print the entries of `path`, one per line.
///
/// With `classify`, directory entries get a trailing `/`.
pub fn ls(ctx: &Context, path: &str, classify: bool) -> Result<()> {
    let mut session = ctx.open()?;
    let rev = session.revision.clone();
    let names = session
        .fs
        .listdir(&rev, path)
        .with_context(|| format!("Cannot list '{}'", display(path)))?;

    for name in names {
        if classify {
            let child = if path.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", path.trim_end_matches('/'), name)
            };
            // Dangling links are still listed, just not marked.
            if session.fs.isdir(&rev, &child)? {
                println!("{}/", name);
                continue;
            }
        }
        println!("{}", name);
    }
    Ok(())
}

fn display(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}
