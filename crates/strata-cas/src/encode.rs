//! Canonical JSON encoding of manifests and commits.
//!
//! Every artifact id in the store is the SHA-256 hash of the bytes this
//! module produces, so the encoding is deterministic by construction:
//! fixed struct field order, no insignificant whitespace, one string
//! escaping convention, integers in decimal, ids as lowercase hex.
//! Changing any of these rules invalidates all previously stored ids.
//!
//! Encodings:
//! - file manifest: array of [`BlockRef`] in chunker emission order
//! - directory manifest: array of [`DirEntry`] strictly sorted by name
//! - commit: `{"parent_id":...,"root_id":...,"timestamp":...}`
//!
//! Empty manifests encode as `[]`, so the empty file and the empty
//! directory each have one well-known id.

use std::cmp::Ordering;

use strata_types::{BlockRef, Commit, DirEntry, Hash};

use crate::error::CasError;

/// Encode a file manifest: the ordered block list of one file.
pub fn encode_file_manifest(blocks: &[BlockRef]) -> Result<Vec<u8>, CasError> {
    serde_json::to_vec(blocks).map_err(|e| CasError::Serialization(e.to_string()))
}

/// Decode a file manifest.
pub fn decode_file_manifest(bytes: &[u8]) -> Result<Vec<BlockRef>, CasError> {
    serde_json::from_slice(bytes).map_err(|e| CasError::Decode(e.to_string()))
}

/// Encode a directory manifest.
///
/// The entries must already be strictly sorted by name (byte-wise). A
/// duplicate or out-of-order name is an error, never silently repaired:
/// the sort order is what makes equal trees hash equal and what the
/// differ's merge walk relies on.
pub fn encode_dir_manifest(entries: &[DirEntry]) -> Result<Vec<u8>, CasError> {
    for pair in entries.windows(2) {
        match pair[0].name.as_bytes().cmp(pair[1].name.as_bytes()) {
            Ordering::Less => {}
            Ordering::Equal => return Err(CasError::DuplicateEntry(pair[1].name.clone())),
            Ordering::Greater => {
                return Err(CasError::UnsortedEntries {
                    before: pair[0].name.clone(),
                    after: pair[1].name.clone(),
                })
            }
        }
    }
    serde_json::to_vec(entries).map_err(|e| CasError::Serialization(e.to_string()))
}

/// Decode a directory manifest. Entries come back in stored (sorted) order.
pub fn decode_dir_manifest(bytes: &[u8]) -> Result<Vec<DirEntry>, CasError> {
    serde_json::from_slice(bytes).map_err(|e| CasError::Decode(e.to_string()))
}

/// Encode a commit record.
pub fn encode_commit(commit: &Commit) -> Result<Vec<u8>, CasError> {
    serde_json::to_vec(commit).map_err(|e| CasError::Serialization(e.to_string()))
}

/// Decode a commit record.
pub fn decode_commit(bytes: &[u8]) -> Result<Commit, CasError> {
    serde_json::from_slice(bytes).map_err(|e| CasError::Decode(e.to_string()))
}

/// Encode a directory manifest and return its id along with the bytes.
pub fn dir_manifest_id(entries: &[DirEntry]) -> Result<(Hash, Vec<u8>), CasError> {
    let bytes = encode_dir_manifest(entries)?;
    Ok((Hash::from_data(&bytes), bytes))
}

/// Encode a file manifest and return its id along with the bytes.
pub fn file_manifest_id(blocks: &[BlockRef]) -> Result<(Hash, Vec<u8>), CasError> {
    let bytes = encode_file_manifest(blocks)?;
    Ok((Hash::from_data(&bytes), bytes))
}

/// Encode a commit and return its id along with the bytes.
pub fn commit_id(commit: &Commit) -> Result<(Hash, Vec<u8>), CasError> {
    let bytes = encode_commit(commit)?;
    Ok((Hash::from_data(&bytes), bytes))
}
