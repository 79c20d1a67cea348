//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--git <path>`: Git executable to run
//! - `--rev <rev>` / `-r`: Revision to read (default from config, else `HEAD`)
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// revfs - Read files and directories of a git repository at any revision
#[derive(Parser, Debug)]
#[command(name = "revfs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if revfs was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Git executable to use for object reads
    #[arg(long, global = true, value_name = "PATH")]
    pub git: Option<PathBuf>,

    /// Revision to read
    #[arg(short, long, global = true, value_name = "REV")]
    pub rev: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a directory
    #[command(
        name = "ls",
        long_about = "List the entries of a directory at a revision.\n\n\
            Symlinks are followed, so a link to a directory lists the target. \
            Names are printed one per line in sorted order.",
        after_help = "\
EXAMPLES:
    # List the repository root at HEAD
    revfs ls

    # List a directory at a tag
    revfs --rev v1.0 ls src/bin

    # Mark directories with a trailing /
    revfs ls -F src"
    )]
    Ls {
        /// Directory to list
        #[arg(default_value = "")]
        path: String,

        /// Append / to directory names
        #[arg(short = 'F', long)]
        classify: bool,
    },

    /// Print file contents
    #[command(
        name = "cat",
        long_about = "Write the contents of files at a revision to stdout.\n\n\
            Symlinks are followed. A symlink pointing outside the repository \
            is read from the real filesystem.",
        after_help = "\
EXAMPLES:
    # Print a file as it was two commits ago
    revfs --rev HEAD~2 cat BUILD"
    )]
    Cat {
        /// Files to print
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show what paths resolve to
    #[command(
        name = "stat",
        long_about = "Resolve paths at a revision and print their kind and canonical path.\n\n\
            Each line is `<kind>\\t<canonical>` where kind is file, directory, \
            outside or missing. Exits non-zero if any path is missing.",
        after_help = "\
EXAMPLES:
    revfs stat src lib/current
    file\tlib/v2/mod.rs
    directory\tsrc/"
    )]
    Stat {
        /// Paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Recursively list a directory tree
    #[command(name = "walk")]
    Walk {
        /// Directory to start from
        #[arg(default_value = "")]
        root: String,

        /// Report subdirectories before their parents
        #[arg(long)]
        bottom_up: bool,
    },

    /// List directory entries matching a shell pattern
    #[command(
        name = "glob",
        after_help = "\
EXAMPLES:
    # All BUILD-like files at the root
    revfs glob 'BUILD*'

    # Rust sources in src/
    revfs glob --dir src '*.rs'"
    )]
    Glob {
        /// Pattern (`*`, `?`, `[abc]`, `[!abc]`)
        pattern: String,

        /// Directory to search
        #[arg(long, default_value = "")]
        dir: String,
    },

    /// Print the commit id a revision currently names
    #[command(name = "pin")]
    Pin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["revfs", "cat", "README", "--rev", "v1", "-q"]).unwrap();
        assert_eq!(cli.rev.as_deref(), Some("v1"));
        assert!(cli.quiet);
        match cli.command {
            Command::Cat { paths } => assert_eq!(paths, vec!["README"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn ls_defaults_to_root() {
        let cli = Cli::try_parse_from(["revfs", "ls"]).unwrap();
        match cli.command {
            Command::Ls { path, classify } => {
                assert_eq!(path, "");
                assert!(!classify);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cat_requires_a_path() {
        assert!(Cli::try_parse_from(["revfs", "cat"]).is_err());
    }
}
