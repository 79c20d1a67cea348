//! stat command - Show how paths resolve

use crate::cli::Context;
use crate::ui::output;
use anyhow::{bail, Result};

/// Print `<kind>\t<canonical>` for each path.
///
/// Missing paths print `missing\t<path>`; the command fails at the end if
/// any were missing so scripts can test existence.
pub fn stat(ctx: &Context, paths: &[String]) -> Result<()> {
    let mut session = ctx.open()?;
    let rev = session.revision.clone();
    let mut missing = 0;
    for path in paths {
        match session.fs.resolve(&rev, path) {
            Ok(resolved) => println!("{}", output::format_canonical(&resolved)),
            Err(e) if e.is_benign() => {
                println!("missing\t{}", path);
                missing += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    if missing > 0 {
        bail!("{} of {} path(s) not found at {}", missing, paths.len(), rev);
    }
    Ok(())
}
