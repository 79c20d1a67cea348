//! Property-based tests for decoding and path handling.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::BTreeMap;

use proptest::prelude::*;

use revfs::core::types::{ContentId, Revision};
use revfs::fs::{glob_match, is_escape, normalize};
use revfs::git::mock::{MODE_DIR, MODE_EXECUTABLE, MODE_FILE, MODE_GITLINK, MODE_SYMLINK};
use revfs::tree::{decode, TreeEntry};

/// Strategy for tree entry names: no `/`, no NUL, never `.` or `..`.
fn entry_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_. -]{1,24}".prop_filter("not a dot entry", |name| name != "." && name != "..")
}

fn mode() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(MODE_FILE),
        Just(MODE_EXECUTABLE),
        Just(MODE_DIR),
        Just(MODE_SYMLINK),
        Just(MODE_GITLINK),
    ]
}

/// Strategy for the entries of one tree, keyed by unique name.
fn entries() -> impl Strategy<Value = BTreeMap<String, (&'static str, [u8; 20])>> {
    prop::collection::btree_map(entry_name(), (mode(), any::<[u8; 20]>()), 0..32)
}

fn encode(entries: &BTreeMap<String, (&'static str, [u8; 20])>) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (name, (mode, id)) in entries {
        bytes.extend_from_slice(mode.as_bytes());
        bytes.push(b' ');
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(id);
    }
    bytes
}

/// Strategy for relative path segments, including `.` and `..`.
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,6}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
        1 => Just(String::new()),
    ]
}

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..8).prop_map(|segments| segments.join("/"))
}

proptest! {
    #[test]
    fn decode_recovers_every_entry(entries in entries()) {
        let tree = decode(&encode(&entries)).unwrap();
        prop_assert_eq!(tree.len(), entries.len());
        for (name, (mode, id)) in &entries {
            let entry = tree.get(name).unwrap();
            prop_assert_eq!(entry.name(), name.as_str());
            prop_assert_eq!(entry.id(), &ContentId::from_raw(id).unwrap());
            let kind_matches = match *mode {
                MODE_DIR => matches!(entry, TreeEntry::Directory { .. }),
                MODE_SYMLINK => matches!(entry, TreeEntry::Symlink { .. }),
                _ => matches!(entry, TreeEntry::File { .. }),
            };
            prop_assert!(kind_matches, "{} decoded as {:?}", mode, entry);
        }
    }

    #[test]
    fn truncated_tree_is_rejected(entries in entries(), cut in 1usize..21) {
        prop_assume!(!entries.is_empty());
        let bytes = encode(&entries);
        // Cutting into the final id always leaves a short record.
        let truncated = &bytes[..bytes.len() - cut];
        prop_assert!(decode(truncated).is_err());
    }

    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes);
    }

    #[test]
    fn normalize_is_idempotent(base in relative_path(), target in relative_path()) {
        let base = normalize("", &base);
        prop_assume!(!is_escape(&base));
        let once = normalize(&base, &target);
        prop_assert_eq!(normalize("", &once), once.clone());
    }

    #[test]
    fn normalize_leaves_no_dot_segments(base in "[a-z]{1,4}(/[a-z]{1,4}){0,3}", target in relative_path()) {
        let normalized = normalize(&base, &target);
        for segment in normalized.split('/') {
            prop_assert_ne!(segment, ".");
        }
        // A bare `..` is not an escape; it stays as a single segment.
        if !is_escape(&normalized) && normalized != ".." {
            prop_assert!(!normalized.split('/').any(|s| s == ".."));
            prop_assert!(!normalized.starts_with('/'));
        }
    }

    #[test]
    fn absolute_targets_stay_absolute(base in "[a-z]{0,4}", target in relative_path()) {
        let normalized = normalize(&base, &format!("/{}", target));
        prop_assert!(normalized.starts_with('/'));
        prop_assert!(is_escape(&normalized));
        prop_assert!(!normalized.contains("/../"));
    }

    #[test]
    fn star_matches_everything(name in "[a-zA-Z0-9_. -]{0,16}") {
        prop_assert!(glob_match("*", &name));
        let prefix = format!("{}*", name);
        prop_assert!(glob_match(&prefix, &name));
    }

    #[test]
    fn literal_pattern_matches_itself(name in "[a-zA-Z0-9_.-]{1,16}") {
        prop_assert!(glob_match(&name, &name));
        let longer = format!("{}x", name);
        prop_assert!(!glob_match(&name, &longer));
    }

    #[test]
    fn revision_rejects_line_breaks(prefix in "[a-z]{1,8}", suffix in "[a-z]{0,8}") {
        let with_newline = format!("{}\n{}", prefix, suffix);
        prop_assert!(Revision::new(with_newline).is_err());
        prop_assert!(Revision::new(prefix).is_ok());
    }
}
