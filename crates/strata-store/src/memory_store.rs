//! In-memory storage implementing all three capabilities.
//!
//! Used by tests and for ephemeral runs. Also counts manifest fetches so
//! tests can verify that the differ skips equal subtrees without loading
//! them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use bytes::Bytes;
use strata_cas::encode;
use strata_types::{BlockRef, Commit, DirEntry, EntryKind, Hash};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{commit_record, BlockStore, CommitStore, MetaStore};

/// In-memory store backed by `RwLock<HashMap>` maps.
///
/// Commits are kept in insertion order so `latest_root` tie-breaking
/// matches the SQLite backend (earliest inserted commit wins).
#[derive(Default)]
pub struct MemoryStore {
    blocks: RwLock<HashMap<Hash, Bytes>>,
    manifests: RwLock<HashMap<(Hash, EntryKind), Bytes>>,
    commits: RwLock<Vec<(Hash, Commit)>>,
    manifest_fetches: AtomicU64,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blocks stored.
    pub fn block_count(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Number of distinct `(id, kind)` manifests stored.
    pub fn manifest_count(&self) -> usize {
        self.manifests.read().expect("lock poisoned").len()
    }

    /// Number of distinct commits stored.
    pub fn commit_count(&self) -> usize {
        self.commits.read().expect("lock poisoned").len()
    }

    /// Total number of manifest loads served (dir and file combined).
    pub fn manifest_fetches(&self) -> u64 {
        self.manifest_fetches.load(Ordering::Relaxed)
    }

    fn manifest_bytes(&self, id: Hash, kind: EntryKind) -> Result<Bytes, StoreError> {
        self.manifest_fetches.fetch_add(1, Ordering::Relaxed);
        self.manifests
            .read()
            .expect("lock poisoned")
            .get(&(id, kind))
            .cloned()
            .ok_or(StoreError::ManifestNotFound { id, kind })
    }
}

impl BlockStore for MemoryStore {
    fn save_block(&self, id: Hash, data: &[u8]) -> Result<(), StoreError> {
        let mut map = self.blocks.write().expect("lock poisoned");
        map.entry(id)
            .or_insert_with(|| Bytes::copy_from_slice(data));
        Ok(())
    }

    fn get_block(&self, id: Hash) -> Result<Bytes, StoreError> {
        self.blocks
            .read()
            .expect("lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(StoreError::BlockNotFound(id))
    }

    fn has_block(&self, id: Hash) -> Result<bool, StoreError> {
        Ok(self.blocks.read().expect("lock poisoned").contains_key(&id))
    }
}

impl MetaStore for MemoryStore {
    fn save_manifest(&self, id: Hash, kind: EntryKind, bytes: &[u8]) -> Result<(), StoreError> {
        let mut map = self.manifests.write().expect("lock poisoned");
        map.entry((id, kind))
            .or_insert_with(|| Bytes::copy_from_slice(bytes));
        Ok(())
    }

    fn dir_entries(&self, id: Hash) -> Result<Vec<DirEntry>, StoreError> {
        let bytes = self.manifest_bytes(id, EntryKind::Dir)?;
        encode::decode_dir_manifest(&bytes).map_err(|source| StoreError::Decode {
            id: id.to_string(),
            source,
        })
    }

    fn file_blocks(&self, id: Hash) -> Result<Vec<BlockRef>, StoreError> {
        let bytes = self.manifest_bytes(id, EntryKind::File)?;
        encode::decode_file_manifest(&bytes).map_err(|source| StoreError::Decode {
            id: id.to_string(),
            source,
        })
    }
}

impl CommitStore for MemoryStore {
    fn commit(
        &self,
        parent: Option<Hash>,
        root: Hash,
        timestamp: i64,
    ) -> Result<Hash, StoreError> {
        let (id, commit) = commit_record(parent, root, timestamp)?;
        let mut commits = self.commits.write().expect("lock poisoned");
        if !commits.iter().any(|(existing, _)| *existing == id) {
            commits.push((id, commit));
            debug!(commit = %id, %root, timestamp, "recorded commit");
        }
        Ok(id)
    }

    fn get_commit(&self, id: Hash) -> Result<Commit, StoreError> {
        self.commits
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, commit)| *commit)
            .ok_or(StoreError::CommitNotFound(id))
    }

    fn latest_root(&self) -> Result<Hash, StoreError> {
        let commits = self.commits.read().expect("lock poisoned");
        commits
            .iter()
            // Strictly-greater keeps the earliest insert on timestamp ties.
            .fold(None::<&Commit>, |best, (_, commit)| match best {
                Some(current) if commit.timestamp > current.timestamp => Some(commit),
                Some(current) => Some(current),
                None => Some(commit),
            })
            .map(|commit| commit.root)
            .ok_or(StoreError::NoCommits)
    }
}
