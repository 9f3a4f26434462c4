//! The engine facade tying stores, chunker, and walks together.

use std::path::Path;
use std::sync::Arc;

use strata_cas::Chunker;
use strata_store::{BlockStore, CommitStore, MetaStore};
use strata_types::{Change, Commit, Hash};

use crate::builder::TreeBuilder;
use crate::differ::Differ;
use crate::error::EngineError;
use crate::restorer::Restorer;

/// Snapshot engine over a set of store capabilities.
///
/// The three capabilities are taken separately so backends can be mixed
/// (e.g. blocks on the filesystem, manifests and commits in SQLite). One
/// object satisfying several capabilities is passed as several `Arc`
/// clones.
pub struct Engine {
    blocks: Arc<dyn BlockStore>,
    meta: Arc<dyn MetaStore>,
    commits: Arc<dyn CommitStore>,
    chunker: Chunker,
}

impl Engine {
    /// Create an engine with the default chunker configuration.
    pub fn new(
        blocks: Arc<dyn BlockStore>,
        meta: Arc<dyn MetaStore>,
        commits: Arc<dyn CommitStore>,
    ) -> Self {
        Self {
            blocks,
            meta,
            commits,
            chunker: Chunker::new(),
        }
    }

    /// Replace the chunker configuration.
    ///
    /// Chunker parameters are part of the dedup contract: snapshots taken
    /// with different parameters do not share blocks.
    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest the directory tree at `path`; returns the root manifest id.
    pub fn snapshot(&self, path: &Path) -> Result<Hash, EngineError> {
        TreeBuilder::new(self.blocks.as_ref(), self.meta.as_ref())
            .with_chunker(self.chunker)
            .process_directory(path)
    }

    /// Record a commit for `root`; returns the commit id. Idempotent for
    /// identical `(parent, root, timestamp)` tuples.
    pub fn commit(
        &self,
        parent: Option<Hash>,
        root: Hash,
        timestamp: i64,
    ) -> Result<Hash, EngineError> {
        Ok(self.commits.commit(parent, root, timestamp)?)
    }

    /// Look up a commit by id.
    pub fn get_commit(&self, id: Hash) -> Result<Commit, EngineError> {
        Ok(self.commits.get_commit(id)?)
    }

    /// The root named by the commit with the greatest timestamp.
    pub fn latest_root(&self) -> Result<Hash, EngineError> {
        Ok(self.commits.latest_root()?)
    }

    /// Materialize the tree rooted at `root` under `dest`.
    pub fn restore(&self, root: Hash, dest: &Path) -> Result<(), EngineError> {
        Restorer::new(self.blocks.as_ref(), self.meta.as_ref()).restore(root, dest)
    }

    /// Restore the tree named by a commit.
    pub fn restore_commit(&self, commit_id: Hash, dest: &Path) -> Result<Hash, EngineError> {
        let commit = self.commits.get_commit(commit_id)?;
        if commit.timestamp < 0 {
            return Err(EngineError::NegativeTimestamp {
                commit: commit_id,
                timestamp: commit.timestamp,
            });
        }
        self.restore(commit.root, dest)?;
        Ok(commit.root)
    }

    /// Restore the tree named by the latest commit; returns its root id.
    pub fn restore_latest(&self, dest: &Path) -> Result<Hash, EngineError> {
        let root = self.commits.latest_root()?;
        self.restore(root, dest)?;
        Ok(root)
    }

    /// Report the path-level changes between two roots.
    pub fn diff(&self, old_root: Hash, new_root: Hash) -> Result<Vec<Change>, EngineError> {
        Differ::new(self.meta.as_ref()).diff(old_root, new_root)
    }
}
