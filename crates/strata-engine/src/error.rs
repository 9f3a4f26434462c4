//! Error types for engine operations.

use std::path::{Path, PathBuf};

use strata_cas::CasError;
use strata_store::StoreError;
use strata_types::Hash;

/// Errors that can occur during snapshot, restore, or diff.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A storage operation failed. A not-found store error during restore
    /// or diff means a dangling reference and aborts the operation.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Chunking or canonical encoding failed.
    #[error("content addressing error: {0}")]
    Cas(#[from] CasError),

    /// A filesystem operation failed.
    #[error("io error at {path}: {source}")]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A directory entry name is not valid Unicode and cannot appear in a
    /// manifest.
    #[error("file name is not valid Unicode: {0:?}")]
    NonUnicodeName(PathBuf),

    /// A commit selected for restore carries a negative timestamp.
    #[error("commit {commit} has negative timestamp {timestamp}")]
    NegativeTimestamp {
        /// The offending commit id.
        commit: Hash,
        /// The timestamp it carries.
        timestamp: i64,
    },
}

impl EngineError {
    /// Attach the path being worked on to an I/O failure.
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
