//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Command results go to stdout; errors and warnings go to stderr.
//! Warnings are suppressed by `--quiet`, errors never are.

use std::fmt::Display;
use std::io::{self, Write};

use crate::core::types::CanonicalPath;
use crate::fs::WalkEntry;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    #[default]
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Describe a resolved path for `revfs stat`.
///
/// ```
/// use revfs::core::types::CanonicalPath;
/// use revfs::ui::output::format_canonical;
///
/// assert_eq!(format_canonical(&CanonicalPath::root()), "directory\t/");
/// assert_eq!(
///     format_canonical(&CanonicalPath::File("src/lib.rs".into())),
///     "file\tsrc/lib.rs"
/// );
/// ```
pub fn format_canonical(path: &CanonicalPath) -> String {
    let kind = match path {
        CanonicalPath::File(_) => "file",
        CanonicalPath::Directory(_) => "directory",
        CanonicalPath::Escape(_) => "outside",
    };
    format!("{}\t{}", kind, path)
}

/// Format one walk entry as `path: dirs/ files`, one line.
pub fn format_walk_entry(entry: &WalkEntry) -> String {
    let dir = if entry.path.is_empty() {
        "."
    } else {
        entry.path.as_str()
    };
    let names = entry
        .dirnames
        .iter()
        .map(|d| format!("{}/", d))
        .chain(entry.filenames.iter().cloned())
        .collect::<Vec<_>>();
    if names.is_empty() {
        format!("{}:", dir)
    } else {
        format!("{}: {}", dir, names.join(" "))
    }
}

/// Write raw bytes to stdout.
pub fn write_bytes(bytes: &[u8]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}
