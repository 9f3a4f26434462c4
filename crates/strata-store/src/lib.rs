//! Storage backends for Strata.
//!
//! Three capability traits cover persistence: [`BlockStore`] for opaque
//! chunk data, [`MetaStore`] for manifest records, and [`CommitStore`] for
//! the commit log. They are deliberately independent so backends can be
//! mixed: the default wiring keeps blocks as fan-out files
//! ([`FsBlockStore`]) and manifests/commits in SQLite ([`SqliteStore`]),
//! while [`MemoryStore`] serves tests and ephemeral use.
//!
//! All writes are idempotent: artifacts are content-addressed, so a second
//! write under an existing id is a no-op by construction.

mod error;
mod file_store;
mod memory_store;
mod sqlite_store;
mod traits;

pub use error::StoreError;
pub use file_store::FsBlockStore;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use traits::{BlockStore, CommitStore, MetaStore};
