//! Shared types and identifiers for Strata.
//!
//! This crate defines the core types used across the Strata workspace:
//! the content-addressed identifier ([`Hash`]), the manifest records
//! ([`BlockRef`], [`DirEntry`]), commits ([`Commit`]), and the change
//! records produced by the differ ([`Change`], [`ChangeAction`]).

use std::fmt;
use std::path::PathBuf;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// Content-addressed identifier: `sha256(bytes)` of the stored artifact.
///
/// Every artifact in the store (block, file manifest, directory manifest,
/// commit) is identified by the SHA-256 digest of the exact bytes stored
/// under it. Rendered as 64 lowercase hex characters wherever an id appears
/// in manifests, commits, or on-disk paths.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Hash([u8; 32]);

/// Error parsing a hex-encoded [`Hash`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseHashError {
    /// The input was not exactly 64 characters.
    #[error("invalid id length: expected 64 hex characters, got {0}")]
    InvalidLength(usize),

    /// The input contained a non-hexadecimal character.
    #[error("invalid hex character in id: {0:?}")]
    InvalidChar(char),
}

impl Hash {
    /// Create an id by hashing arbitrary data with SHA-256.
    pub fn from_data(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Return the raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a 64-character hex string.
    ///
    /// Uppercase hex digits are accepted; anything else is rejected.
    pub fn from_hex(hex: &str) -> Result<Self, ParseHashError> {
        if hex.len() != 64 {
            return Err(ParseHashError::InvalidLength(hex.len()));
        }
        let src = hex.as_bytes();
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = hex_nibble(src[i * 2])
                .ok_or(ParseHashError::InvalidChar(src[i * 2] as char))?;
            let lo = hex_nibble(src[i * 2 + 1])
                .ok_or(ParseHashError::InvalidChar(src[i * 2 + 1] as char))?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

// Ids travel through the canonical JSON encoding as hex strings, so the
// serde representation is the hex form rather than the raw bytes.

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = Hash;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 64-character hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Hash, E> {
                Hash::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

// ---------------------------------------------------------------------------
// Manifest records
// ---------------------------------------------------------------------------

/// Reference to one stored block inside a file manifest.
///
/// The concatenation of the referenced blocks, in order, equals the original
/// file's byte content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Content-addressed identifier of the block.
    pub id: Hash,
    /// Length of the block in bytes.
    pub size: u64,
}

/// Kind of a directory entry (and of the manifest its id resolves to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file, backed by a file manifest.
    File,
    /// Subdirectory, backed by a directory manifest.
    Dir,
}

impl EntryKind {
    /// The canonical string form (`"file"` / `"dir"`) used in the encoding
    /// and the relational schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry inside a directory manifest.
///
/// `name` is a single path component as read from the directory, never
/// containing separators. Entries within a manifest are strictly sorted by
/// `name`, byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (single path component).
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Id of the child file or directory manifest.
    pub id: Hash,
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// A commit naming a snapshot root and its predecessor.
///
/// `parent` is `None` for the first commit in a chain. In the canonical
/// encoding the parent is the empty string in that case, matching the
/// identifier format of every other field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Previously stored commit, or `None` for the first commit.
    #[serde(rename = "parent_id", with = "parent_id")]
    pub parent: Option<Hash>,
    /// Directory manifest id of the snapshot root.
    #[serde(rename = "root_id")]
    pub root: Hash,
    /// Seconds since the Unix epoch, supplied by the caller.
    pub timestamp: i64,
}

/// Serde adapter: `Option<Hash>` as hex, with `None` ⇔ `""`.
mod parent_id {
    use super::Hash;
    use serde::de::{Deserialize, Deserializer, Error};
    use serde::ser::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<Hash>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(hash) => serializer.collect_str(hash),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Hash>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            Ok(None)
        } else {
            Hash::from_hex(&s).map(Some).map_err(D::Error::custom)
        }
    }
}

// ---------------------------------------------------------------------------
// Diff output
// ---------------------------------------------------------------------------

/// What happened to a path between two snapshot roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// The path exists only in the new root.
    Added,
    /// The path exists only in the old root.
    Removed,
    /// The path is a file in both roots with differing content.
    Modified,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeAction::Added => "ADDED",
            ChangeAction::Removed => "REMOVED",
            ChangeAction::Modified => "MODIFIED",
        })
    }
}

/// One path-level change reported by the differ.
///
/// Paths are relative to the compared roots (the root's own name is
/// excluded), with components joined by the platform separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Path of the changed entry, relative to the root.
    pub path: PathBuf,
    /// The action that happened at this path.
    pub action: ChangeAction,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_from_data_deterministic() {
        let data = b"hello world";
        let id1 = Hash::from_data(data);
        let id2 = Hash::from_data(data);
        assert_eq!(id1, id2, "same data must produce same Hash");
    }

    #[test]
    fn test_hash_different_data_different_id() {
        let id1 = Hash::from_data(b"hello");
        let id2 = Hash::from_data(b"world");
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_display_outputs_lowercase_hex() {
        // Known SHA-256 of the empty input.
        let id = Hash::from_data(b"");
        assert_eq!(
            id.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(id.to_string().len(), 64);
    }

    #[test]
    fn test_from_hex_roundtrip() {
        let id = Hash::from_data(b"roundtrip");
        let parsed = Hash::from_hex(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_hex_accepts_uppercase() {
        let id = Hash::from_data(b"case");
        let upper = id.to_string().to_uppercase();
        assert_eq!(Hash::from_hex(&upper).unwrap(), id);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert_eq!(
            Hash::from_hex("abc"),
            Err(ParseHashError::InvalidLength(3))
        );
        assert_eq!(Hash::from_hex(""), Err(ParseHashError::InvalidLength(0)));
        assert!(Hash::from_hex(&"a".repeat(63)).is_err());
        assert!(Hash::from_hex(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = "g".repeat(64);
        assert_eq!(
            Hash::from_hex(&bad),
            Err(ParseHashError::InvalidChar('g'))
        );
    }

    #[test]
    fn test_debug_format() {
        let id = Hash::from([0u8; 32]);
        let debug = format!("{id:?}");
        assert!(debug.starts_with("Hash("));
        assert!(debug.ends_with(')'));
    }

    #[test]
    fn test_hash_ordering() {
        let low = Hash::from([0u8; 32]);
        let high = Hash::from([0xffu8; 32]);
        assert!(low < high);
    }

    #[test]
    fn test_hash_serializes_as_hex_string() {
        let id = Hash::from_data(b"json");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_block_ref_field_order() {
        let block = BlockRef {
            id: Hash::from_data(b"block"),
            size: 42,
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, format!("{{\"id\":\"{}\",\"size\":42}}", block.id));
    }

    #[test]
    fn test_dir_entry_field_order_and_kind() {
        let entry = DirEntry {
            name: "a.txt".to_string(),
            kind: EntryKind::File,
            id: Hash::from_data(b"child"),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            format!("{{\"name\":\"a.txt\",\"type\":\"file\",\"id\":\"{}\"}}", entry.id)
        );

        let back: DirEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_kind_strings() {
        assert_eq!(EntryKind::File.as_str(), "file");
        assert_eq!(EntryKind::Dir.as_str(), "dir");
        assert_eq!(
            serde_json::from_str::<EntryKind>("\"dir\"").unwrap(),
            EntryKind::Dir
        );
    }

    #[test]
    fn test_commit_first_commit_has_empty_parent() {
        let commit = Commit {
            parent: None,
            root: Hash::from_data(b"root"),
            timestamp: 1,
        };
        let json = serde_json::to_string(&commit).unwrap();
        assert_eq!(
            json,
            format!(
                "{{\"parent_id\":\"\",\"root_id\":\"{}\",\"timestamp\":1}}",
                commit.root
            )
        );

        let back: Commit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commit);
    }

    #[test]
    fn test_commit_with_parent_roundtrip() {
        let commit = Commit {
            parent: Some(Hash::from_data(b"parent")),
            root: Hash::from_data(b"root"),
            timestamp: -5,
        };
        let json = serde_json::to_string(&commit).unwrap();
        let back: Commit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commit);
        assert!(json.contains(&commit.parent.unwrap().to_string()));
    }

    #[test]
    fn test_commit_rejects_malformed_parent() {
        let json = "{\"parent_id\":\"nothex\",\"root_id\":\"\",\"timestamp\":0}";
        assert!(serde_json::from_str::<Commit>(json).is_err());
    }

    #[test]
    fn test_change_action_display() {
        assert_eq!(ChangeAction::Added.to_string(), "ADDED");
        assert_eq!(ChangeAction::Removed.to_string(), "REMOVED");
        assert_eq!(ChangeAction::Modified.to_string(), "MODIFIED");
    }
}
