//! cli
//!
//! Command-line interface layer for revfs.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Locate the repository and load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`Context`], and dispatches to [`commands`]. All reads go through
//! [`crate::fs::RevFs`].

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::core::config::Config;
use crate::core::types::Revision;
use crate::fs::RevFs;
use crate::git::Repo;
use crate::logging;
use crate::ui::output::{self, Verbosity};

/// Global settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Git executable override.
    pub git: Option<PathBuf>,
    /// Revision override.
    pub rev: Option<String>,
    /// Output verbosity.
    pub verbosity: Verbosity,
}

/// An opened repository view plus the revision the command reads.
#[derive(Debug)]
pub struct Session {
    pub fs: RevFs,
    pub revision: Revision,
    pub verbosity: Verbosity,
}

impl Drop for Session {
    fn drop(&mut self) {
        let stats = self.fs.cache_stats();
        debug!(hits = stats.hits, misses = stats.misses, "tree cache");
    }
}

impl Context {
    /// Locate the repository, load configuration and open a view.
    ///
    /// Configured `git.git_dir` skips discovery; otherwise the repository
    /// enclosing the working directory is used.
    pub fn open(&self) -> Result<Session> {
        let cwd = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        let user = Config::load(None).context("Failed to load configuration")?;
        let repo = match user.config.git_dir() {
            Some(git_dir) => Repo::at(git_dir, user.config.work_tree().map(PathBuf::from)),
            None => Repo::discover(&cwd).context("Failed to open repository")?,
        };

        let loaded = Config::load(Some(repo.git_dir.as_path()))
            .context("Failed to load configuration")?;
        for warning in &loaded.warnings {
            output::warn(
                format!("{} ({})", warning.message, warning.path.display()),
                self.verbosity,
            );
        }
        let mut config = loaded.config;
        debug!(
            user = ?config.user_config_loaded_from(),
            repo = ?config.repo_config_loaded_from(),
            "configuration loaded"
        );
        if let Some(git) = &self.git {
            config.set_git_binary(git);
        }

        let revision = match &self.rev {
            Some(rev) => Revision::new(rev.as_str()).context("Invalid --rev")?,
            None => config.default_revision(),
        };
        debug!(%revision, git_dir = %repo.git_dir.display(), "opening repository view");

        Ok(Session {
            fs: RevFs::for_repo(repo, &config),
            revision,
            verbosity: self.verbosity,
        })
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    logging::init(verbosity);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        git: cli.git.clone(),
        rev: cli.rev.clone(),
        verbosity,
    };

    commands::dispatch(cli.command, &ctx)
}
