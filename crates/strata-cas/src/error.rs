//! Error types for content addressing operations.

/// Errors that can occur while chunking or encoding artifacts.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// Serialization to the canonical form failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored bytes failed to parse as the expected record kind.
    #[error("decode error: {0}")]
    Decode(String),

    /// An I/O error occurred while reading the chunk source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying CDC engine reported a non-I/O failure.
    #[error("chunking error: {0}")]
    Chunking(String),

    /// Two directory entries share a name.
    #[error("duplicate directory entry name: {0:?}")]
    DuplicateEntry(String),

    /// Directory entries are not in strict byte-wise name order.
    #[error("directory entries out of order: {after:?} after {before:?}")]
    UnsortedEntries {
        /// The entry name that came first.
        before: String,
        /// The entry name that should have sorted before it.
        after: String,
    },
}
