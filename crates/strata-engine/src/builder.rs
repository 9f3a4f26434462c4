//! Post-order tree ingestion.

use std::fs;
use std::path::Path;

use strata_cas::{encode, Chunker};
use strata_store::{BlockStore, MetaStore};
use strata_types::{BlockRef, DirEntry, EntryKind, Hash};
use tracing::{debug, warn};

use crate::error::EngineError;

/// Walks a directory tree, chunks files, and persists blocks and manifests.
///
/// The walk is post-order: a manifest is only written after everything it
/// references (blocks for files, child manifests for directories) is
/// already in the store, so a stored manifest never dangles.
pub struct TreeBuilder<'a> {
    blocks: &'a dyn BlockStore,
    meta: &'a dyn MetaStore,
    chunker: Chunker,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder over the given stores with the default chunker.
    pub fn new(blocks: &'a dyn BlockStore, meta: &'a dyn MetaStore) -> Self {
        Self {
            blocks,
            meta,
            chunker: Chunker::new(),
        }
    }

    /// Replace the chunker configuration.
    pub fn with_chunker(mut self, chunker: Chunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest the directory at `path` and return its manifest id.
    ///
    /// Subdirectories are recursed into; regular files are chunked and
    /// stored; anything else (symlinks, sockets, …) is skipped with a
    /// warning. Enumeration order from the filesystem is irrelevant:
    /// identity comes from the byte-wise sort of the entry names.
    pub fn process_directory(&self, path: &Path) -> Result<Hash, EngineError> {
        let dir = fs::read_dir(path).map_err(|e| EngineError::io(path, e))?;
        let mut entries = Vec::new();

        for dirent in dir {
            let dirent = dirent.map_err(|e| EngineError::io(path, e))?;
            let entry_path = dirent.path();
            let file_type = dirent
                .file_type()
                .map_err(|e| EngineError::io(&entry_path, e))?;
            let name = dirent
                .file_name()
                .into_string()
                .map_err(|_| EngineError::NonUnicodeName(entry_path.clone()))?;

            if file_type.is_dir() {
                let id = self.process_directory(&entry_path)?;
                entries.push(DirEntry {
                    name,
                    kind: EntryKind::Dir,
                    id,
                });
            } else if file_type.is_file() {
                let id = self.process_file(&entry_path)?;
                entries.push(DirEntry {
                    name,
                    kind: EntryKind::File,
                    id,
                });
            } else {
                warn!(path = %entry_path.display(), "skipping non-regular file");
            }
        }

        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        let (id, bytes) = encode::dir_manifest_id(&entries)?;
        self.meta.save_manifest(id, EntryKind::Dir, &bytes)?;
        debug!(%id, entries = entries.len(), path = %path.display(), "stored dir manifest");
        Ok(id)
    }

    /// Chunk one regular file, persist its blocks, and return the id of its
    /// file manifest. An empty file yields a manifest with no blocks.
    pub fn process_file(&self, path: &Path) -> Result<Hash, EngineError> {
        let file = fs::File::open(path).map_err(|e| EngineError::io(path, e))?;

        let mut refs = Vec::new();
        for chunk in self.chunker.chunks(file) {
            let chunk = chunk?;
            self.blocks.save_block(chunk.id, &chunk.data)?;
            refs.push(BlockRef {
                id: chunk.id,
                size: chunk.data.len() as u64,
            });
        }

        let (id, bytes) = encode::file_manifest_id(&refs)?;
        self.meta.save_manifest(id, EntryKind::File, &bytes)?;
        debug!(%id, blocks = refs.len(), path = %path.display(), "stored file manifest");
        Ok(id)
    }
}
