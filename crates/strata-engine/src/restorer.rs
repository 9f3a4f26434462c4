//! Pre-order tree restoration.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use strata_store::{BlockStore, MetaStore};
use strata_types::{EntryKind, Hash};
use tracing::debug;

use crate::error::EngineError;

/// Reconstructs a directory tree from a root manifest id.
///
/// The walk is pre-order: a directory is created before its children are
/// materialized into it. Files are reassembled by concatenating their
/// blocks in manifest order. Any id that fails to resolve is a dangling
/// reference and aborts the restore; partially written output is left on
/// disk for the caller to inspect or remove.
pub struct Restorer<'a> {
    blocks: &'a dyn BlockStore,
    meta: &'a dyn MetaStore,
}

impl<'a> Restorer<'a> {
    /// Create a restorer over the given stores.
    pub fn new(blocks: &'a dyn BlockStore, meta: &'a dyn MetaStore) -> Self {
        Self { blocks, meta }
    }

    /// Materialize the tree rooted at `root` under `dest`.
    ///
    /// `dest` and any missing parents are created. File mtimes, ownership,
    /// and permission bits beyond the platform defaults are not restored.
    pub fn restore(&self, root: Hash, dest: &Path) -> Result<(), EngineError> {
        fs::create_dir_all(dest).map_err(|e| EngineError::io(dest, e))?;

        for entry in self.meta.dir_entries(root)? {
            let target = dest.join(&entry.name);
            match entry.kind {
                EntryKind::Dir => self.restore(entry.id, &target)?,
                EntryKind::File => self.restore_file(entry.id, &target)?,
            }
        }
        Ok(())
    }

    /// Reassemble one file from its manifest. Empty manifests produce a
    /// zero-length file.
    fn restore_file(&self, id: Hash, dest: &Path) -> Result<(), EngineError> {
        let refs = self.meta.file_blocks(id)?;

        let file = fs::File::create(dest).map_err(|e| EngineError::io(dest, e))?;
        let mut writer = BufWriter::new(file);
        for block in &refs {
            let data = self.blocks.get_block(block.id)?;
            writer
                .write_all(&data)
                .map_err(|e| EngineError::io(dest, e))?;
        }
        writer.flush().map_err(|e| EngineError::io(dest, e))?;

        debug!(%id, blocks = refs.len(), path = %dest.display(), "restored file");
        Ok(())
    }
}
