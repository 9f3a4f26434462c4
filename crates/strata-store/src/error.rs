//! Error types for storage operations.

use strata_cas::CasError;
use strata_types::{EntryKind, Hash};

/// Errors that can occur during storage operations.
///
/// Lookups of absent ids are distinct variants from I/O failure: for the
/// restorer and differ a not-found id means a dangling reference, which is
/// fatal to the operation but says nothing about the health of the backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block is not in the store.
    #[error("block not found: {0}")]
    BlockNotFound(Hash),

    /// The requested manifest is not in the store under this kind.
    #[error("{kind} manifest not found: {id}")]
    ManifestNotFound {
        /// The id that was looked up.
        id: Hash,
        /// The manifest kind that was requested.
        kind: EntryKind,
    },

    /// The requested commit is not in the store.
    #[error("commit not found: {0}")]
    CommitNotFound(Hash),

    /// The commit log is empty.
    #[error("no commits in store")]
    NoCommits,

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The SQLite backend reported an error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored bytes under an id failed to parse as the expected kind.
    #[error("failed to decode stored artifact {id}: {source}")]
    Decode {
        /// The id whose stored bytes are corrupt or of the wrong kind.
        id: String,
        /// The underlying decode failure.
        #[source]
        source: CasError,
    },

    /// Canonical encoding of a new artifact failed.
    #[error("failed to encode artifact: {0}")]
    Encode(#[source] CasError),
}

impl StoreError {
    /// Whether this error is an absent-id lookup rather than a backend
    /// failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::BlockNotFound(_)
                | StoreError::ManifestNotFound { .. }
                | StoreError::CommitNotFound(_)
                | StoreError::NoCommits
        )
    }
}
