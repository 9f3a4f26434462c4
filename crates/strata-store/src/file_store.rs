//! Filesystem-backed block storage.
//!
//! Stores one file per block with a single-level fan-out directory:
//! `{base_dir}/{hex[0..2]}/{hex[2..]}`. The two-hex-char prefix caps
//! per-directory fan-out at 256.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use strata_types::Hash;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::BlockStore;

/// File-based block store with a fan-out directory layout.
///
/// Writes are create-if-absent: an existing block file short-circuits the
/// write, which is what makes dedup invisible to writers. New blocks are
/// written to a temporary file first and renamed into place, so a partial
/// write is never observable under the final path.
pub struct FsBlockStore {
    base_dir: PathBuf,
}

impl FsBlockStore {
    /// Create a block store rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Compute the on-disk path for a block id.
    fn block_path(&self, id: &Hash) -> PathBuf {
        let hex = id.to_string();
        self.base_dir.join(&hex[0..2]).join(&hex[2..])
    }
}

impl BlockStore for FsBlockStore {
    fn save_block(&self, id: Hash, data: &[u8]) -> Result<(), StoreError> {
        let path = self.block_path(&id);
        if path.exists() {
            debug!(%id, "block already stored");
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &path)?;

        debug!(%id, size = data.len(), "stored block");
        Ok(())
    }

    fn get_block(&self, id: Hash) -> Result<Bytes, StoreError> {
        match std::fs::read(self.block_path(&id)) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::BlockNotFound(id))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn has_block(&self, id: Hash) -> Result<bool, StoreError> {
        match std::fs::metadata(self.block_path(&id)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_store() -> (FsBlockStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FsBlockStore::new(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_save_get_roundtrip() {
        let (store, _dir) = make_store();
        let data = b"hello block";
        let id = Hash::from_data(data);

        store.save_block(id, data).unwrap();
        assert_eq!(store.get_block(id).unwrap().as_ref(), data);
    }

    #[test]
    fn test_get_missing_block_is_not_found() {
        let (store, _dir) = make_store();
        let id = Hash::from_data(b"never stored");
        let err = store.get_block(id).unwrap_err();
        assert!(matches!(err, StoreError::BlockNotFound(missing) if missing == id));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_has_block() {
        let (store, _dir) = make_store();
        let data = b"present";
        let id = Hash::from_data(data);

        assert!(!store.has_block(id).unwrap());
        store.save_block(id, data).unwrap();
        assert!(store.has_block(id).unwrap());
    }

    #[test]
    fn test_save_is_idempotent() {
        let (store, _dir) = make_store();
        let data = b"saved twice";
        let id = Hash::from_data(data);

        store.save_block(id, data).unwrap();
        store.save_block(id, data).unwrap();
        assert_eq!(store.get_block(id).unwrap().as_ref(), data);
    }

    #[test]
    fn test_existing_block_is_never_overwritten() {
        let (store, _dir) = make_store();
        let data = b"original";
        let id = Hash::from_data(data);

        store.save_block(id, data).unwrap();
        // A second write under the same id is a no-op, whatever the payload.
        store.save_block(id, b"imposter").unwrap();
        assert_eq!(store.get_block(id).unwrap().as_ref(), data);
    }

    #[test]
    fn test_fanout_directory_layout() {
        let (store, dir) = make_store();
        let data = b"fanout layout";
        let id = Hash::from_data(data);

        store.save_block(id, data).unwrap();

        let hex = id.to_string();
        let expected = dir.path().join(&hex[0..2]).join(&hex[2..]);
        assert!(
            expected.exists(),
            "block file should exist at fan-out path: {}",
            expected.display()
        );
        assert_eq!(std::fs::read(&expected).unwrap(), data);
    }

    #[test]
    fn test_no_tmp_file_left_after_write() {
        let (store, dir) = make_store();
        let data = b"atomic write";
        let id = Hash::from_data(data);

        store.save_block(id, data).unwrap();

        let hex = id.to_string();
        let tmp = dir
            .path()
            .join(&hex[0..2])
            .join(format!("{}.tmp", &hex[2..]));
        assert!(!tmp.exists(), "temp file should not remain after write");
    }

    #[test]
    fn test_empty_block_roundtrip() {
        let (store, _dir) = make_store();
        let id = Hash::from_data(b"");
        store.save_block(id, b"").unwrap();
        assert!(store.get_block(id).unwrap().is_empty());
    }
}
