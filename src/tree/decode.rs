//! tree::decode
//!
//! Decoder for git tree objects.
//!
//! A tree object is a concatenation of records:
//!
//! ```text
//! <mode ascii> SP <name> NUL <20 byte raw object id>
//! ```
//!
//! with no delimiter between records beyond the fixed-size id. Mode
//! `120000` is a symlink, `40000` a directory, and anything else (regular,
//! executable, and gitlink entries alike) is treated as a file.

use std::collections::HashMap;

use thiserror::Error;

use crate::core::types::ContentId;

const MODE_SYMLINK: &[u8] = b"120000";
const MODE_DIRECTORY: &[u8] = b"40000";

/// A tree object that could not be decoded.
///
/// This means the local object store is corrupt; it is never retried.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("corrupt tree object at byte {offset}: {reason}")]
pub struct TreeError {
    pub offset: usize,
    pub reason: &'static str,
}

/// One entry of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// A subdirectory; the id names another tree.
    Directory { name: String, id: ContentId },
    /// A regular or executable file, or a submodule link.
    File { name: String, id: ContentId },
    /// A symlink; the id names a blob holding the target path.
    Symlink { name: String, id: ContentId },
}

impl TreeEntry {
    fn from_mode(mode: &[u8], name: String, id: ContentId) -> Self {
        match mode {
            MODE_SYMLINK => TreeEntry::Symlink { name, id },
            MODE_DIRECTORY => TreeEntry::Directory { name, id },
            _ => TreeEntry::File { name, id },
        }
    }

    /// The entry name within its tree.
    pub fn name(&self) -> &str {
        match self {
            TreeEntry::Directory { name, .. }
            | TreeEntry::File { name, .. }
            | TreeEntry::Symlink { name, .. } => name,
        }
    }

    /// The id of the object the entry points at.
    pub fn id(&self) -> &ContentId {
        match self {
            TreeEntry::Directory { id, .. }
            | TreeEntry::File { id, .. }
            | TreeEntry::Symlink { id, .. } => id,
        }
    }
}

/// The direct children of one directory at one revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: HashMap<String, TreeEntry>,
}

impl Tree {
    /// Look up a child by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    /// Iterate over child names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<TreeEntry> for Tree {
    fn from_iter<I: IntoIterator<Item = TreeEntry>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|entry| (entry.name().to_string(), entry))
                .collect(),
        }
    }
}

/// Bounds-checked reader over the raw tree bytes.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn error(&self, reason: &'static str) -> TreeError {
        TreeError {
            offset: self.pos,
            reason,
        }
    }

    /// Take bytes up to (not including) `delim` and step over it.
    fn take_until(&mut self, delim: u8, reason: &'static str) -> Result<&'a [u8], TreeError> {
        let buf = self.buf;
        let rest = &buf[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == delim)
            .ok_or_else(|| self.error(reason))?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn take(&mut self, n: usize, reason: &'static str) -> Result<&'a [u8], TreeError> {
        if self.buf.len() - self.pos < n {
            return Err(self.error(reason));
        }
        let buf = self.buf;
        let bytes = &buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }
}

/// Decode a raw tree object.
///
/// Names that are not valid UTF-8 are decoded lossily. A name that occurs
/// twice keeps its last entry.
///
/// # Errors
///
/// Returns [`TreeError`] if a record is truncated or has an empty mode.
///
/// # Example
///
/// ```
/// use revfs::tree::{decode, TreeEntry};
///
/// let mut raw = b"100644 README\0".to_vec();
/// raw.extend_from_slice(&[0x11; 20]);
/// let tree = decode(&raw).unwrap();
/// assert!(matches!(tree.get("README"), Some(TreeEntry::File { .. })));
/// ```
pub fn decode(bytes: &[u8]) -> Result<Tree, TreeError> {
    let mut cursor = Cursor::new(bytes);
    let mut entries = HashMap::new();

    while !cursor.at_end() {
        let mode = cursor.take_until(b' ', "missing space after mode")?;
        if mode.is_empty() {
            return Err(cursor.error("empty mode"));
        }
        let name = cursor.take_until(0, "missing NUL after name")?;
        let raw_id = cursor.take(ContentId::RAW_LEN, "truncated object id")?;
        let id = ContentId::from_raw(raw_id).map_err(|_| cursor.error("bad object id"))?;

        let name = String::from_utf8_lossy(name).into_owned();
        entries.insert(name.clone(), TreeEntry::from_mode(mode, name, id));
    }

    Ok(Tree { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mode: &str, name: &str, fill: u8) -> Vec<u8> {
        let mut out = format!("{} {}\0", mode, name).into_bytes();
        out.extend_from_slice(&[fill; 20]);
        out
    }

    #[test]
    fn decodes_all_three_kinds() {
        let mut raw = record("100644", "f", 0x01);
        raw.extend(record("40000", "d", 0x02));
        raw.extend(record("120000", "l", 0x03));

        let tree = decode(&raw).unwrap();
        assert_eq!(tree.len(), 3);
        assert!(matches!(tree.get("f"), Some(TreeEntry::File { .. })));
        assert!(matches!(tree.get("d"), Some(TreeEntry::Directory { .. })));
        assert!(matches!(tree.get("l"), Some(TreeEntry::Symlink { .. })));
        assert_eq!(tree.get("d").unwrap().id().as_str(), "02".repeat(20));
        assert_eq!(tree.get("l").unwrap().name(), "l");
    }

    #[test]
    fn executable_and_gitlink_are_files() {
        let mut raw = record("100755", "run.sh", 0x04);
        raw.extend(record("160000", "vendor", 0x05));
        let tree = decode(&raw).unwrap();
        assert!(matches!(tree.get("run.sh"), Some(TreeEntry::File { .. })));
        assert!(matches!(tree.get("vendor"), Some(TreeEntry::File { .. })));
    }

    #[test]
    fn raw_id_bytes_may_contain_delimiters() {
        // Spaces and NULs inside the id must not confuse record boundaries.
        let mut raw = record("100644", "a", b' ');
        raw.extend(record("100644", "b", 0));
        let tree = decode(&raw).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("b").unwrap().id().as_str(), "0".repeat(40));
    }

    #[test]
    fn names_with_spaces() {
        let raw = record("100644", "with space.txt", 0x06);
        let tree = decode(&raw).unwrap();
        assert!(tree.get("with space.txt").is_some());
    }

    #[test]
    fn empty_tree() {
        assert!(decode(b"").unwrap().is_empty());
    }

    #[test]
    fn missing_space_is_corrupt() {
        let err = decode(b"100644").unwrap_err();
        assert_eq!(err.reason, "missing space after mode");
    }

    #[test]
    fn missing_nul_is_corrupt() {
        let err = decode(b"100644 name-without-nul").unwrap_err();
        assert_eq!(err.reason, "missing NUL after name");
        assert_eq!(err.offset, 7);
    }

    #[test]
    fn truncated_id_is_corrupt() {
        let mut raw = b"100644 f\0".to_vec();
        raw.extend_from_slice(&[0xaa; 19]);
        let err = decode(&raw).unwrap_err();
        assert_eq!(err.reason, "truncated object id");
    }

    #[test]
    fn empty_mode_is_corrupt() {
        let mut raw = b" f\0".to_vec();
        raw.extend_from_slice(&[0xaa; 20]);
        assert_eq!(decode(&raw).unwrap_err().reason, "empty mode");
    }

    #[test]
    fn collect_into_tree() {
        let id = ContentId::new("ab".repeat(20)).unwrap();
        let tree: Tree = vec![TreeEntry::File {
            name: "x".into(),
            id,
        }]
        .into_iter()
        .collect();
        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["x"]);
    }
}
