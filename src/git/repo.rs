//! git::repo
//!
//! Repository discovery and git command construction.
//!
//! Discovery uses `git2`; everything that reads objects goes through the
//! `git` executable so the object store pipe sees exactly what the user's
//! git sees (alternates, replace refs, partial clones).

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Errors from repository discovery.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },
}

/// Location of a repository on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    /// The git metadata directory (typically `.git`)
    pub git_dir: PathBuf,
    /// The working tree, absent for bare repositories
    pub work_tree: Option<PathBuf>,
}

impl Repo {
    /// Discover the repository containing `path`.
    ///
    /// Bare repositories are accepted; they simply have no work tree.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotARepo` if no repository encloses `path`.
    pub fn discover(path: &Path) -> Result<Self, RepoError> {
        let repo = git2::Repository::discover(path).map_err(|_| RepoError::NotARepo {
            path: path.to_path_buf(),
        })?;
        let found = Self {
            git_dir: repo.path().to_path_buf(),
            work_tree: repo.workdir().map(Path::to_path_buf),
        };
        debug!(git_dir = %found.git_dir.display(), "discovered repository");
        Ok(found)
    }

    /// Use explicit locations without discovery.
    pub fn at(git_dir: impl Into<PathBuf>, work_tree: Option<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
            work_tree,
        }
    }

    /// Directory that relative symlink escapes are resolved against.
    ///
    /// This is the work tree, or the parent of the git dir for bare
    /// repositories.
    pub fn root(&self) -> PathBuf {
        match &self.work_tree {
            Some(work_tree) => work_tree.clone(),
            None => self
                .git_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.git_dir.clone()),
        }
    }
}

/// Builds `git` invocations bound to one repository.
#[derive(Debug, Clone)]
pub struct GitCommand {
    binary: PathBuf,
    repo: Repo,
}

impl GitCommand {
    /// Create a command builder for `repo` using the given git executable.
    pub fn new(binary: impl Into<PathBuf>, repo: Repo) -> Self {
        Self {
            binary: binary.into(),
            repo,
        }
    }

    /// The repository the commands run against.
    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    fn base_args(&self) -> Vec<String> {
        let mut args = vec![format!("--git-dir={}", self.repo.git_dir.display())];
        if let Some(work_tree) = &self.repo.work_tree {
            args.push(format!("--work-tree={}", work_tree.display()));
        }
        args
    }

    /// Build a `git` command for `args`.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.base_args()).args(args);
        cmd
    }

    /// Render the full command line for logs and error messages.
    pub fn display(&self, args: &[&str]) -> String {
        CommandLine {
            binary: &self.binary,
            args: self
                .base_args()
                .into_iter()
                .chain(args.iter().map(|a| a.to_string()))
                .collect(),
        }
        .to_string()
    }
}

struct CommandLine<'a> {
    binary: &'a Path,
    args: Vec<String>,
}

impl fmt::Display for CommandLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Find the top of the working tree containing `dir` using `git rev-parse`.
///
/// Returns `None` if `dir` is not inside a working tree or git cannot run.
pub fn detect_worktree(binary: &Path, dir: Option<&Path>) -> Option<PathBuf> {
    let mut cmd = Command::new(binary);
    cmd.args(["rev-parse", "--show-toplevel"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    debug!(binary = %binary.display(), "detecting worktree");
    let output = cmd.output().ok()?;
    if !output.status.success() {
        return None;
    }
    let top = String::from_utf8(output.stdout).ok()?;
    let top = top.trim();
    if top.is_empty() {
        None
    } else {
        Some(PathBuf::from(top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_includes_repo_flags() {
        let git = GitCommand::new(
            "git",
            Repo::at("/r/.git", Some(PathBuf::from("/r"))),
        );
        assert_eq!(
            git.display(&["cat-file", "--batch"]),
            "git --git-dir=/r/.git --work-tree=/r cat-file --batch"
        );
    }

    #[test]
    fn bare_repo_omits_work_tree() {
        let git = GitCommand::new("/usr/bin/git", Repo::at("/srv/r.git", None));
        assert_eq!(
            git.display(&["cat-file", "--batch"]),
            "/usr/bin/git --git-dir=/srv/r.git cat-file --batch"
        );
    }

    #[test]
    fn root_prefers_work_tree() {
        let repo = Repo::at("/r/.git", Some(PathBuf::from("/w")));
        assert_eq!(repo.root(), PathBuf::from("/w"));
        let bare = Repo::at("/srv/r.git", None);
        assert_eq!(bare.root(), PathBuf::from("/srv"));
    }

    #[test]
    fn discover_outside_repo_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        // A bare temp dir is only outside a repository if no ancestor is one.
        if git2::Repository::discover(dir.path()).is_err() {
            assert!(matches!(
                Repo::discover(dir.path()),
                Err(RepoError::NotARepo { .. })
            ));
        }
    }
}
