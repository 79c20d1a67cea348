//! fs::walk
//!
//! Recursive directory walks and shell-style globbing over a revision.

use std::collections::HashSet;
use std::path::Path;

use super::accessor::RevFs;
use super::error::FsError;
use crate::core::types::{CanonicalPath, Revision};
use crate::git::ObjectStore;

/// Order in which [`RevFs::walk`] reports directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkOrder {
    /// A directory before its subdirectories.
    #[default]
    TopDown,
    /// A directory after its subdirectories.
    BottomUp,
}

/// One directory visited by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Repository-relative path of the directory as reached (`""` for the root)
    pub path: String,
    /// Children that resolve to directories, sorted
    pub dirnames: Vec<String>,
    /// All other children (files, escapes, dangling links), sorted
    pub filenames: Vec<String>,
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// State shared by one walk.
struct Walk<'a> {
    revision: &'a Revision,
    order: WalkOrder,
    /// Real path of the walk root
    subtree: String,
    /// Real paths already claimed for descent
    visited: HashSet<String>,
    out: Vec<WalkEntry>,
}

impl Walk<'_> {
    /// Check whether `real` will be reached by descending real directories.
    fn in_subtree(&self, real: &str) -> bool {
        self.subtree.is_empty()
            || real == self.subtree
            || real
                .strip_prefix(self.subtree.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl<S: ObjectStore> RevFs<S> {
    /// Walk the directory tree under `root`.
    ///
    /// Symlinked directories are listed in `dirnames`; each real directory
    /// is descended into once, so links back up the tree cannot loop.
    /// Directories under `root` are always reached by their real path; a link
    /// is only followed when it leaves the subtree of `root`.
    /// Dangling and looping symlinks are listed as files.
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotADirectory` if `root` is not a directory, and
    /// propagates store failures.
    pub fn walk(
        &mut self,
        revision: &Revision,
        root: impl AsRef<Path>,
        order: WalkOrder,
    ) -> Result<Vec<WalkEntry>, FsError> {
        let root = root.as_ref();
        let real = match self.resolve(revision, root)? {
            CanonicalPath::Directory(real) => real,
            _ => {
                return Err(FsError::NotADirectory {
                    revision: revision.clone(),
                    path: root.to_string_lossy().into_owned(),
                })
            }
        };
        let start = super::resolve::components(root).join("/");

        let mut walk = Walk {
            revision,
            order,
            subtree: real.clone(),
            visited: HashSet::from([real.clone()]),
            out: Vec::new(),
        };
        self.walk_dir(&mut walk, start, real)?;
        Ok(walk.out)
    }

    fn walk_dir(&mut self, walk: &mut Walk<'_>, dir: String, real: String) -> Result<(), FsError> {
        let revision = walk.revision;
        let mut dirnames = Vec::new();
        let mut filenames = Vec::new();
        let mut descend = Vec::new();

        for name in self.listdir(revision, &dir)? {
            let child = join(&dir, &name);
            match self.resolve(revision, &child) {
                Ok(CanonicalPath::Directory(target)) => {
                    let direct = target == join(&real, &name);
                    if (direct || !walk.in_subtree(&target)) && walk.visited.insert(target.clone())
                    {
                        descend.push((child, target));
                    }
                    dirnames.push(name);
                }
                Ok(_) => filenames.push(name),
                Err(e) if e.is_benign() || matches!(e, FsError::SymlinkLoop { .. }) => {
                    filenames.push(name)
                }
                Err(e) => return Err(e),
            }
        }

        let entry = WalkEntry {
            path: dir,
            dirnames,
            filenames,
        };
        let pending = match walk.order {
            WalkOrder::TopDown => {
                walk.out.push(entry);
                None
            }
            WalkOrder::BottomUp => Some(entry),
        };
        for (child, target) in descend {
            self.walk_dir(walk, child, target)?;
        }
        walk.out.extend(pending);
        Ok(())
    }

    /// List the names in directory `dir` that match shell pattern `pattern`.
    ///
    /// Supports `*`, `?`, `[abc]`, `[a-z]` and `[!abc]`. Results are sorted.
    pub fn glob(
        &mut self,
        revision: &Revision,
        dir: impl AsRef<Path>,
        pattern: &str,
    ) -> Result<Vec<String>, FsError> {
        let pattern: Vec<char> = pattern.chars().collect();
        Ok(self
            .listdir(revision, dir)?
            .into_iter()
            .filter(|name| fnmatch(&pattern, &name.chars().collect::<Vec<_>>()))
            .collect())
    }
}

/// Match `name` against a shell wildcard pattern.
///
/// # Example
///
/// ```
/// use revfs::fs::glob_match;
///
/// assert!(glob_match("*.rs", "lib.rs"));
/// assert!(glob_match("BUILD*", "BUILD.tools"));
/// assert!(glob_match("[!.]*", "visible"));
/// assert!(!glob_match("[!.]*", ".hidden"));
/// ```
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    fnmatch(&pattern, &name)
}

fn fnmatch(pattern: &[char], name: &[char]) -> bool {
    match pattern.first() {
        None => name.is_empty(),
        Some('*') => (0..=name.len()).any(|skip| fnmatch(&pattern[1..], &name[skip..])),
        Some('?') => !name.is_empty() && fnmatch(&pattern[1..], &name[1..]),
        Some('[') => match (name.first(), class(&pattern[1..])) {
            (Some(&c), Some((set, rest))) => set.matches(c) && fnmatch(rest, &name[1..]),
            // An unterminated class is a literal '['.
            (Some('['), None) => fnmatch(&pattern[1..], &name[1..]),
            _ => false,
        },
        Some(&p) => name.first() == Some(&p) && fnmatch(&pattern[1..], &name[1..]),
    }
}

/// A parsed `[...]` character class.
struct CharClass<'a> {
    negated: bool,
    body: &'a [char],
}

impl CharClass<'_> {
    fn matches(&self, c: char) -> bool {
        let mut found = false;
        let mut i = 0;
        while i < self.body.len() {
            if i + 2 < self.body.len() && self.body[i + 1] == '-' {
                found |= (self.body[i]..=self.body[i + 2]).contains(&c);
                i += 3;
            } else {
                found |= self.body[i] == c;
                i += 1;
            }
        }
        found != self.negated
    }
}

/// Parse a class starting just after `[`; returns it and the pattern after `]`.
fn class(pattern: &[char]) -> Option<(CharClass<'_>, &[char])> {
    let negated = matches!(pattern.first(), Some('!') | Some('^'));
    let start = usize::from(negated);
    // A ']' right after the opening bracket is a member, not the end.
    let end = pattern
        .iter()
        .skip(start + 1)
        .position(|&c| c == ']')
        .map(|i| i + start + 1)?;
    Some((
        CharClass {
            negated,
            body: &pattern[start..end],
        },
        &pattern[end + 1..],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{MockStore, MODE_DIR, MODE_FILE, MODE_SYMLINK};

    #[test]
    fn wildcard_patterns() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("a*c", "abbbc"));
        assert!(!glob_match("a*c", "abbb"));
        assert!(glob_match("?.txt", "a.txt"));
        assert!(!glob_match("?.txt", ".txt"));
        assert!(glob_match("BUILD", "BUILD"));
        assert!(!glob_match("BUILD", "BUILD.x"));
    }

    #[test]
    fn character_classes() {
        assert!(glob_match("[abc]x", "bx"));
        assert!(!glob_match("[abc]x", "dx"));
        assert!(glob_match("file[0-9]", "file7"));
        assert!(!glob_match("file[0-9]", "filex"));
        assert!(glob_match("[!a]*", "bcd"));
        assert!(!glob_match("[!a]*", "abc"));
        assert!(glob_match("[]]", "]"));
        assert!(glob_match("[", "["));
    }

    /// ```text
    /// BUILD
    /// README
    /// src/BUILD
    /// src/lib/ -> (dir) a.rs
    /// src/up -> ..
    /// dangling -> nowhere
    /// ```
    fn fixture() -> (RevFs<MockStore>, Revision) {
        let mut store = MockStore::new();
        let blob = store.blob(b"x");
        let lib = store.tree(&[(MODE_FILE, "a.rs", blob.clone())]);
        let up = store.blob(b"..");
        let src = store.tree(&[
            (MODE_FILE, "BUILD", blob.clone()),
            (MODE_DIR, "lib", lib),
            (MODE_SYMLINK, "up", up),
        ]);
        let nowhere = store.blob(b"nowhere");
        let root = store.tree(&[
            (MODE_FILE, "BUILD", blob.clone()),
            (MODE_FILE, "README", blob),
            (MODE_DIR, "src", src),
            (MODE_SYMLINK, "dangling", nowhere),
        ]);
        let rev = store.commit("rev", &root);
        (RevFs::new(store), rev)
    }

    #[test]
    fn walk_top_down() {
        let (mut fs, rev) = fixture();
        let entries = fs.walk(&rev, "", WalkOrder::TopDown).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["", "src", "src/lib"]);

        assert_eq!(entries[0].dirnames, vec!["src"]);
        assert_eq!(entries[0].filenames, vec!["BUILD", "README", "dangling"]);
        // `up` points back at the root: listed, not descended.
        assert_eq!(entries[1].dirnames, vec!["lib", "up"]);
        assert_eq!(entries[1].filenames, vec!["BUILD"]);
        assert_eq!(entries[2].filenames, vec!["a.rs"]);
    }

    #[test]
    fn walk_bottom_up() {
        let (mut fs, rev) = fixture();
        let entries = fs.walk(&rev, "src", WalkOrder::BottomUp).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        // Starting below the root, `up` reaches an unvisited directory.
        assert_eq!(paths, vec!["src/lib", "src/up", "src"]);
        assert_eq!(entries[1].dirnames, vec!["src"]);
        assert_eq!(entries[1].filenames, vec!["BUILD", "README", "dangling"]);
    }

    #[test]
    fn link_sorting_first_does_not_hide_real_directory() {
        let mut store = MockStore::new();
        let blob = store.blob(b"x");
        let z = store.tree(&[(MODE_FILE, "f", blob)]);
        let target = store.blob(b"z");
        let root = store.tree(&[(MODE_SYMLINK, "a_link", target), (MODE_DIR, "z", z)]);
        let rev = store.commit("rev", &root);
        let mut fs = RevFs::new(store);

        let entries = fs.walk(&rev, "", WalkOrder::TopDown).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["", "z"]);
        assert_eq!(entries[0].dirnames, vec!["a_link", "z"]);
        assert_eq!(entries[1].filenames, vec!["f"]);
    }

    #[test]
    fn walk_of_file_fails() {
        let (mut fs, rev) = fixture();
        assert!(matches!(
            fs.walk(&rev, "README", WalkOrder::TopDown),
            Err(FsError::NotADirectory { .. })
        ));
    }

    #[test]
    fn glob_filters_listing() {
        let (mut fs, rev) = fixture();
        assert_eq!(fs.glob(&rev, "", "BUILD*").unwrap(), vec!["BUILD"]);
        assert_eq!(fs.glob(&rev, "src", "*").unwrap(), vec!["BUILD", "lib", "up"]);
        assert!(fs.glob(&rev, "", "*.rs").unwrap().is_empty());
    }
}
