//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the user-level file and the repository
//! override; fields left out of the override fall back to the user file.
//!
//! # Validation
//!
//! Config values are validated after parsing: the git binary must be
//! non-empty, the symlink bound must be in `1..=1024`, and the default
//! revision must be a valid revision expression.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Revision;

/// Default bound on symlinks followed in one resolution (Linux's `MAXSYMLINKS`).
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Largest accepted `max_symlink_hops`.
pub const MAX_HOPS_LIMIT: usize = 1024;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// [git]
/// binary = "/usr/bin/git"
/// git_dir = "/src/project/.git"
/// work_tree = "/src/project"
///
/// [resolve]
/// max_symlink_hops = 40
/// default_revision = "main"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// How git is invoked
    pub git: Option<GitConfig>,

    /// Path resolution settings
    pub resolve: Option<ResolveConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(git) = &self.git {
            git.validate()?;
        }
        if let Some(resolve) = &self.resolve {
            resolve.validate()?;
        }
        Ok(())
    }
}

/// `[git]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Path to the git executable (default: `git` on `$PATH`)
    pub binary: Option<PathBuf>,

    /// Repository directory, skipping discovery
    pub git_dir: Option<PathBuf>,

    /// Working tree paired with `git_dir`
    pub work_tree: Option<PathBuf>,
}

impl GitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(binary) = &self.binary {
            if binary.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git.binary cannot be empty".to_string(),
                ));
            }
        }
        if self.work_tree.is_some() && self.git_dir.is_none() {
            return Err(ConfigError::InvalidValue(
                "git.work_tree requires git.git_dir".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[resolve]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Symlinks followed before giving up (default: 40)
    pub max_symlink_hops: Option<usize>,

    /// Revision used when none is given (default: `HEAD`)
    pub default_revision: Option<String>,
}

impl ResolveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(hops) = self.max_symlink_hops {
            if !(1..=MAX_HOPS_LIMIT).contains(&hops) {
                return Err(ConfigError::InvalidValue(format!(
                    "resolve.max_symlink_hops must be between 1 and {}, got {}",
                    MAX_HOPS_LIMIT, hops
                )));
            }
        }
        if let Some(rev) = &self.default_revision {
            Revision::new(rev.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid resolve.default_revision: {}", e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GitConfig::default();
            assert!(config.binary.is_none());
            assert!(config.git_dir.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn empty_binary_rejected() {
            let config = GitConfig {
                binary: Some(PathBuf::new()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn work_tree_needs_git_dir() {
            let config = GitConfig {
                work_tree: Some(PathBuf::from("/src")),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    mod resolve_config {
        use super::*;

        #[test]
        fn hop_bounds() {
            for (hops, ok) in [(0, false), (1, true), (40, true), (1024, true), (1025, false)] {
                let config = ResolveConfig {
                    max_symlink_hops: Some(hops),
                    ..Default::default()
                };
                assert_eq!(config.validate().is_ok(), ok, "hops = {}", hops);
            }
        }

        #[test]
        fn blank_revision_rejected() {
            let config = ResolveConfig {
                default_revision: Some("  ".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    mod file_config {
        use super::*;

        #[test]
        fn parse_full() {
            let toml = r#"
                [git]
                binary = "/opt/git/bin/git"

                [resolve]
                max_symlink_hops = 8
                default_revision = "main"
            "#;
            let config: FileConfig = toml::from_str(toml).unwrap();
            let git = config.git.as_ref().unwrap();
            assert_eq!(git.binary, Some(PathBuf::from("/opt/git/bin/git")));
            let resolve = config.resolve.as_ref().unwrap();
            assert_eq!(resolve.max_symlink_hops, Some(8));
            assert_eq!(resolve.default_revision.as_deref(), Some("main"));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn roundtrip() {
            let config = FileConfig {
                git: Some(GitConfig {
                    binary: Some(PathBuf::from("git")),
                    git_dir: Some(PathBuf::from("/r/.git")),
                    work_tree: Some(PathBuf::from("/r")),
                }),
                resolve: Some(ResolveConfig {
                    max_symlink_hops: Some(40),
                    default_revision: Some("HEAD".to_string()),
                }),
            };
            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: FileConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                [resolve]
                max_symlink_hops = 40
                follow_everything = true
            "#;
            let result: Result<FileConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
