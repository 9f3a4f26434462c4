//! Storage capability traits.
//!
//! The three capabilities are separate so that backends may be mixed:
//! an implementation satisfies one or several of them, and callers take
//! each dependency explicitly.

use bytes::Bytes;
use strata_types::{BlockRef, Commit, DirEntry, EntryKind, Hash};

use crate::error::StoreError;

/// Deduplicating persistence of opaque byte blobs keyed by hash.
///
/// All implementations must be `Send + Sync`; the core itself is
/// single-threaded but stores may be shared by callers.
pub trait BlockStore: Send + Sync {
    /// Store a block under its id. Idempotent: if the id is already
    /// present the stored bytes are left unchanged and the call succeeds.
    fn save_block(&self, id: Hash, data: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a block by id.
    ///
    /// An absent id is [`StoreError::BlockNotFound`], distinct from I/O
    /// failure.
    fn get_block(&self, id: Hash) -> Result<Bytes, StoreError>;

    /// Check whether a block exists.
    fn has_block(&self, id: Hash) -> Result<bool, StoreError>;
}

/// Deduplicating persistence of manifest records, keyed by `(id, kind)`.
///
/// The composite key means a file manifest and a dir manifest colliding on
/// id (astronomically unlikely) cannot cross-contaminate.
pub trait MetaStore: Send + Sync {
    /// Store an encoded manifest under `(id, kind)`. Idempotent.
    fn save_manifest(&self, id: Hash, kind: EntryKind, bytes: &[u8]) -> Result<(), StoreError>;

    /// Load and decode a directory manifest. Entries come back in stored
    /// (sorted) order.
    fn dir_entries(&self, id: Hash) -> Result<Vec<DirEntry>, StoreError>;

    /// Load and decode a file manifest. Block refs come back in stored
    /// (emission) order.
    fn file_blocks(&self, id: Hash) -> Result<Vec<BlockRef>, StoreError>;
}

/// Append-only log of commits keyed by hash.
///
/// Parent linkage is not verified here; callers are trusted to supply a
/// previously stored commit id or `None`.
pub trait CommitStore: Send + Sync {
    /// Canonically encode, hash, and idempotently insert a commit.
    /// Two calls with identical tuples return the same id.
    fn commit(&self, parent: Option<Hash>, root: Hash, timestamp: i64)
        -> Result<Hash, StoreError>;

    /// Retrieve a commit by id.
    fn get_commit(&self, id: Hash) -> Result<Commit, StoreError>;

    /// The root id of the commit with the greatest timestamp.
    ///
    /// Ties break toward the earliest inserted commit; callers wanting a
    /// strict order must supply monotonically increasing timestamps.
    fn latest_root(&self) -> Result<Hash, StoreError>;
}

/// Build the commit record and its content-addressed id.
pub(crate) fn commit_record(
    parent: Option<Hash>,
    root: Hash,
    timestamp: i64,
) -> Result<(Hash, Commit), StoreError> {
    let commit = Commit {
        parent,
        root,
        timestamp,
    };
    let (id, _) = strata_cas::encode::commit_id(&commit).map_err(StoreError::Encode)?;
    Ok((id, commit))
}
