//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Revision`] - Revision expression naming a snapshot
//! - [`ContentId`] - Git object identifier (hex)
//! - [`ObjectKind`] - Kind reported by the object store
//! - [`CanonicalPath`] - Result of resolving a path at a revision
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use revfs::core::types::{ContentId, Revision};
//!
//! let rev = Revision::new("HEAD~2").unwrap();
//! let id = ContentId::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(rev.as_str(), "HEAD~2");
//! assert_eq!(id.as_str().len(), 40);
//!
//! // Invalid constructions fail at creation time
//! assert!(Revision::new("").is_err());
//! assert!(ContentId::new("not-a-sha").is_err());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    #[error("invalid object id: {0}")]
    InvalidContentId(String),

    #[error("unknown object kind: {0}")]
    InvalidObjectKind(String),
}

/// A revision expression understood by git (`HEAD`, a commit id, `v1.2^`, ...).
///
/// The expression is passed to the object store verbatim. Tree lookups are
/// cached per revision string, so callers that need fresh results across
/// repository updates should pin floating expressions to a commit id first
/// (see `RevFs::pin`).
///
/// Revisions cannot be empty and cannot contain line breaks, since the
/// object store protocol is line-delimited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    /// Create a new validated revision.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRevision` if the expression is empty or
    /// contains a line break.
    pub fn new(rev: impl Into<String>) -> Result<Self, TypeError> {
        let rev = rev.into();
        if rev.trim().is_empty() {
            return Err(TypeError::InvalidRevision(
                "revision cannot be empty".into(),
            ));
        }
        if rev.contains(['\n', '\r']) {
            return Err(TypeError::InvalidRevision(
                "revision cannot contain line breaks".into(),
            ));
        }
        Ok(Self(rev))
    }

    /// The revision that names the current checkout.
    pub fn head() -> Self {
        Self("HEAD".to_string())
    }

    /// Get the revision as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Revision {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Revision> for String {
    fn from(rev: Revision) -> Self {
        rev.0
    }
}

impl From<ContentId> for Revision {
    fn from(id: ContentId) -> Self {
        Self(id.0)
    }
}

impl FromStr for Revision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Revision {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier, hex encoded.
///
/// Identifiers are normalized to lowercase. Both SHA-1 (40 characters) and
/// SHA-256 (64 characters) repositories are accepted.
///
/// # Example
///
/// ```
/// use revfs::core::types::ContentId;
///
/// let id = ContentId::from_raw(&[0xab; 20]).unwrap();
/// assert_eq!(id.as_str(), "abababababababababababababababababababab");
///
/// let upper = ContentId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(upper.as_str(), "abc123def4567890abc123def4567890abc12345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    /// Length in bytes of a raw SHA-1 object id, as embedded in tree objects.
    pub const RAW_LEN: usize = 20;

    /// Create a new validated object id from its hex form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidContentId` if the string is not a 40 or 64
    /// character hex string.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        if id.len() != 40 && id.len() != 64 {
            return Err(TypeError::InvalidContentId(format!(
                "expected 40 or 64 hex characters, got {}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidContentId(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(id))
    }

    /// Create an object id from its raw binary form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidContentId` if `raw` is not 20 or 32 bytes.
    pub fn from_raw(raw: &[u8]) -> Result<Self, TypeError> {
        Self::new(hex::encode(raw))
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of an object as reported by the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectKind {
    /// The name git uses for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            "tag" => Ok(ObjectKind::Tag),
            other => Err(TypeError::InvalidObjectKind(other.to_string())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path after symlink resolution.
///
/// The textual form (via `Display`) follows the classic convention: files
/// have no trailing `/`, directories end in `/` (the root is just `/`), and
/// escapes start with `../` or `/`.
///
/// # Example
///
/// ```
/// use revfs::core::types::CanonicalPath;
///
/// assert_eq!(CanonicalPath::root().to_string(), "/");
/// assert_eq!(CanonicalPath::Directory("src/bin".into()).to_string(), "src/bin/");
/// assert_eq!(CanonicalPath::File("src/lib.rs".into()).to_string(), "src/lib.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalPath {
    /// A file inside the repository (repository-relative, `/`-separated).
    File(String),
    /// A directory inside the repository; the empty string is the root.
    Directory(String),
    /// A symlink target that leaves the repository.
    Escape(PathBuf),
}

impl CanonicalPath {
    /// The repository root.
    pub fn root() -> Self {
        CanonicalPath::Directory(String::new())
    }

    /// Check whether this names something served from the object store as a file.
    ///
    /// Escapes count as files: their contents come from the real filesystem.
    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Check whether this names a directory in the repository.
    pub fn is_dir(&self) -> bool {
        matches!(self, CanonicalPath::Directory(_))
    }

    /// Check whether this is a path outside the repository.
    pub fn is_escape(&self) -> bool {
        matches!(self, CanonicalPath::Escape(_))
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalPath::File(path) => f.write_str(path),
            CanonicalPath::Directory(path) if path.is_empty() => f.write_str("/"),
            CanonicalPath::Directory(path) => write!(f, "{}/", path),
            CanonicalPath::Escape(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod revision {
        use super::*;

        #[test]
        fn accepts_expressions() {
            assert!(Revision::new("HEAD").is_ok());
            assert!(Revision::new("main~3").is_ok());
            assert!(Revision::new("v1.0^{commit}").is_ok());
            assert!(Revision::new("abc123def4567890abc123def4567890abc12345").is_ok());
        }

        #[test]
        fn empty_rejected() {
            assert!(Revision::new("").is_err());
            assert!(Revision::new("   ").is_err());
        }

        #[test]
        fn line_breaks_rejected() {
            assert!(Revision::new("HEAD\nHEAD").is_err());
            assert!(Revision::new("HEAD\r").is_err());
        }

        #[test]
        fn deserializes_from_string() {
            #[derive(Deserialize)]
            struct Wrapper {
                rev: Revision,
            }
            let w: Wrapper = toml::from_str("rev = \"main\"").unwrap();
            assert_eq!(w.rev.as_str(), "main");
            assert!(toml::from_str::<Wrapper>("rev = \"\"").is_err());
        }
    }

    mod content_id {
        use super::*;

        #[test]
        fn normalizes_to_lowercase() {
            let id = ContentId::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
            assert_eq!(id.as_str(), "abcdef0123456789abcdef0123456789abcdef01");
        }

        #[test]
        fn wrong_length_rejected() {
            assert!(ContentId::new("abc123").is_err());
            assert!(ContentId::new("a".repeat(41)).is_err());
        }

        #[test]
        fn sha256_length_accepted() {
            assert!(ContentId::new("a".repeat(64)).is_ok());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(ContentId::new("g".repeat(40)).is_err());
        }

        #[test]
        fn from_raw_hex_encodes() {
            let mut raw = [0u8; 20];
            raw[0] = 0x01;
            raw[19] = 0xff;
            let id = ContentId::from_raw(&raw).unwrap();
            assert_eq!(id.as_str(), "01000000000000000000000000000000000000ff");
        }

        #[test]
        fn from_raw_wrong_length_rejected() {
            assert!(ContentId::from_raw(&[0u8; 19]).is_err());
        }
    }

    mod object_kind {
        use super::*;

        #[test]
        fn parses_known_kinds() {
            assert_eq!("blob".parse::<ObjectKind>().unwrap(), ObjectKind::Blob);
            assert_eq!("tree".parse::<ObjectKind>().unwrap(), ObjectKind::Tree);
            assert_eq!("commit".parse::<ObjectKind>().unwrap(), ObjectKind::Commit);
            assert_eq!("tag".parse::<ObjectKind>().unwrap(), ObjectKind::Tag);
        }

        #[test]
        fn unknown_kind_rejected() {
            assert_eq!(
                "missing".parse::<ObjectKind>(),
                Err(TypeError::InvalidObjectKind("missing".into()))
            );
        }
    }

    mod canonical_path {
        use super::*;

        #[test]
        fn display_forms() {
            assert_eq!(CanonicalPath::root().to_string(), "/");
            assert_eq!(CanonicalPath::Directory("d".into()).to_string(), "d/");
            assert_eq!(CanonicalPath::File("d/f".into()).to_string(), "d/f");
            assert_eq!(
                CanonicalPath::Escape(PathBuf::from("../outside")).to_string(),
                "../outside"
            );
        }

        #[test]
        fn classification() {
            assert!(CanonicalPath::root().is_dir());
            assert!(CanonicalPath::File("f".into()).is_file());
            let escape = CanonicalPath::Escape(PathBuf::from("/etc/hosts"));
            assert!(escape.is_file());
            assert!(escape.is_escape());
            assert!(!escape.is_dir());
        }
    }
}
