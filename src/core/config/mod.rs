//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! revfs has two configuration scopes:
//! - **User**: settings for every repository
//! - **Repo**: per-repository overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. User config file
//! 3. Repo config file
//! 4. CLI flags (applied through [`Config::set_git_binary`])
//!
//! # User Config Locations
//!
//! Searched in order, first found wins:
//! 1. `$REVFS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/revfs/config.toml`
//! 3. `~/.revfs/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/revfs.toml`. It lives inside the git directory, so it is never
//! part of any revision being read.
//!
//! # Example
//!
//! ```no_run
//! use revfs::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning.message);
//! }
//! let config = result.config;
//! println!("git binary: {}", config.git_binary().display());
//! println!("symlink bound: {}", config.max_symlink_hops());
//! ```

pub mod schema;

pub use schema::{FileConfig, GitConfig, ResolveConfig, MAX_HOPS_LIMIT, MAX_SYMLINK_HOPS};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::types::Revision;

/// Environment variable naming an explicit user config file.
pub const CONFIG_ENV: &str = "REVFS_CONFIG";

/// File name of the per-repository override inside the git directory.
pub const REPO_CONFIG_FILE: &str = "revfs.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: CLI override, then repo file, then user
/// file, then the built-in default.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// User configuration
    pub user: FileConfig,
    /// Repository override (if found)
    pub repo: Option<FileConfig>,
    /// Path to the user config file (if loaded)
    user_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
    /// `--git` from the command line
    binary_override: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// If `git_dir` is provided, also loads `<git_dir>/revfs.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. Missing config files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::find_user_config().as_deref(), git_dir)
    }

    /// Load configuration from an explicit user file instead of searching.
    pub fn load_from(
        user_path: Option<&Path>,
        git_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let user = match user_path {
            Some(path) => Self::read_config(path)?,
            None => FileConfig::default(),
        };

        let repo_path = git_dir
            .map(|dir| dir.join(REPO_CONFIG_FILE))
            .filter(|path| path.exists());
        let repo = match &repo_path {
            Some(path) => {
                let repo = Self::read_config(path)?;
                if repo.git.as_ref().is_some_and(|g| g.git_dir.is_some()) {
                    warnings.push(ConfigWarning {
                        message: "git.git_dir in a repository config is ignored".to_string(),
                        path: path.clone(),
                    });
                }
                Some(repo)
            }
            None => None,
        };

        user.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        debug!(
            user = ?user_path,
            repo = ?repo_path,
            "loaded configuration"
        );

        Ok(ConfigLoadResult {
            config: Config {
                user,
                repo,
                user_path: user_path.map(Path::to_path_buf),
                repo_path,
                binary_override: None,
            },
            warnings,
        })
    }

    /// Locate the user config file, if any.
    fn find_user_config() -> Option<PathBuf> {
        // 1. Check $REVFS_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/revfs/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("revfs/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.revfs/config.toml
        dirs::home_dir()
            .map(|home| home.join(".revfs/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Override the git executable (the `--git` flag).
    pub fn set_git_binary(&mut self, binary: impl Into<PathBuf>) {
        self.binary_override = Some(binary.into());
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn git_section(&self) -> impl Iterator<Item = &GitConfig> {
        self.repo
            .iter()
            .chain(std::iter::once(&self.user))
            .filter_map(|file| file.git.as_ref())
    }

    fn resolve_section(&self) -> impl Iterator<Item = &ResolveConfig> {
        self.repo
            .iter()
            .chain(std::iter::once(&self.user))
            .filter_map(|file| file.resolve.as_ref())
    }

    /// Get the git executable.
    ///
    /// Defaults to `git` (looked up on `$PATH`).
    pub fn git_binary(&self) -> PathBuf {
        self.binary_override
            .clone()
            .or_else(|| self.git_section().find_map(|g| g.binary.clone()))
            .unwrap_or_else(|| PathBuf::from("git"))
    }

    /// Get the configured repository directory.
    ///
    /// Only the user file may set this; returns `None` to use discovery.
    pub fn git_dir(&self) -> Option<&Path> {
        self.user.git.as_ref().and_then(|g| g.git_dir.as_deref())
    }

    /// Get the configured working tree, paired with [`Config::git_dir`].
    pub fn work_tree(&self) -> Option<&Path> {
        self.user.git.as_ref().and_then(|g| g.work_tree.as_deref())
    }

    /// Get the symlink bound.
    ///
    /// Defaults to 40 if not configured.
    pub fn max_symlink_hops(&self) -> usize {
        self.resolve_section()
            .find_map(|r| r.max_symlink_hops)
            .unwrap_or(MAX_SYMLINK_HOPS)
    }

    /// Get the revision used when none is given.
    ///
    /// Defaults to `HEAD` if not configured.
    pub fn default_revision(&self) -> Revision {
        self.resolve_section()
            .find_map(|r| r.default_revision.as_deref())
            .and_then(|rev| Revision::new(rev).ok())
            .unwrap_or_else(Revision::head)
    }

    /// Get the path to the loaded user config file.
    pub fn user_config_loaded_from(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_without_files() {
        let result = Config::load_from(None, None).unwrap();
        let config = result.config;

        assert_eq!(config.git_binary(), PathBuf::from("git"));
        assert_eq!(config.max_symlink_hops(), 40);
        assert_eq!(config.default_revision(), Revision::head());
        assert!(config.git_dir().is_none());
        assert!(config.user_config_loaded_from().is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_user_from_env() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "config.toml",
            r#"
            [git]
            binary = "/opt/git"
            "#,
        );

        std::env::set_var(CONFIG_ENV, &path);
        let result = Config::load(None);
        std::env::remove_var(CONFIG_ENV);

        let config = result.unwrap().config;
        assert_eq!(config.git_binary(), PathBuf::from("/opt/git"));
        assert_eq!(config.user_config_loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn repo_overrides_user() {
        let temp = TempDir::new().unwrap();
        let user = write(
            temp.path(),
            "user.toml",
            r#"
            [git]
            binary = "/usr/bin/git"

            [resolve]
            max_symlink_hops = 10
            default_revision = "main"
            "#,
        );
        let git_dir = temp.path().join(".git");
        fs::create_dir(&git_dir).unwrap();
        write(
            &git_dir,
            REPO_CONFIG_FILE,
            r#"
            [resolve]
            max_symlink_hops = 5
            "#,
        );

        let config = Config::load_from(Some(user.as_path()), Some(git_dir.as_path()))
            .unwrap()
            .config;

        assert_eq!(config.max_symlink_hops(), 5);
        // Fields missing from the override fall through.
        assert_eq!(config.default_revision().as_str(), "main");
        assert_eq!(config.git_binary(), PathBuf::from("/usr/bin/git"));
        assert!(config.repo_config_loaded_from().is_some());
    }

    #[test]
    fn cli_binary_wins() {
        let temp = TempDir::new().unwrap();
        let user = write(
            temp.path(),
            "user.toml",
            "[git]\nbinary = \"/usr/bin/git\"\n",
        );
        let mut config = Config::load_from(Some(user.as_path()), None).unwrap().config;
        config.set_git_binary("/custom/git");
        assert_eq!(config.git_binary(), PathBuf::from("/custom/git"));
    }

    #[test]
    fn repo_git_dir_ignored_with_warning() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            REPO_CONFIG_FILE,
            "[git]\ngit_dir = \"/elsewhere\"\n",
        );
        let result = Config::load_from(None, Some(temp.path())).unwrap();
        assert!(result.config.git_dir().is_none());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("ignored"));
    }

    #[test]
    fn invalid_hops_rejected() {
        let temp = TempDir::new().unwrap();
        let user = write(
            temp.path(),
            "user.toml",
            "[resolve]\nmax_symlink_hops = 0\n",
        );
        assert!(matches!(
            Config::load_from(Some(user.as_path()), None),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn malformed_toml_rejected() {
        let temp = TempDir::new().unwrap();
        let user = write(temp.path(), "user.toml", "[git\nbinary = ");
        assert!(matches!(
            Config::load_from(Some(user.as_path()), None),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn unreadable_user_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent.toml");
        assert!(matches!(
            Config::load_from(Some(missing.as_path()), None),
            Err(ConfigError::ReadError { .. })
        ));
    }
}
