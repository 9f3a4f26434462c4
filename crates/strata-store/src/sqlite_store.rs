//! SQLite-backed storage implementing all three capabilities.
//!
//! Schema:
//!
//! ```text
//! blocks   (id TEXT PRIMARY KEY, data BLOB)
//! metadata (id TEXT, obj_type TEXT, data BLOB, PRIMARY KEY (id, obj_type))
//! commits  (id TEXT PRIMARY KEY, parent_id TEXT, root_id TEXT, timestamp INTEGER)
//! ```
//!
//! All inserts are `INSERT OR IGNORE` on the primary key: dedup falls out
//! of content addressing, and SQLite's transactional discipline covers
//! write atomicity.

use std::path::Path;
use std::sync::Mutex;

use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use strata_cas::{encode, CasError};
use strata_types::{BlockRef, Commit, DirEntry, EntryKind, Hash};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{commit_record, BlockStore, CommitStore, MetaStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS blocks (
    id   TEXT PRIMARY KEY,
    data BLOB
);
CREATE TABLE IF NOT EXISTS metadata (
    id       TEXT,
    obj_type TEXT,
    data     BLOB,
    PRIMARY KEY (id, obj_type)
);
CREATE TABLE IF NOT EXISTS commits (
    id        TEXT PRIMARY KEY,
    parent_id TEXT,
    root_id   TEXT,
    timestamp INTEGER
);
";

/// SQLite store covering blocks, manifests, and commits.
///
/// The connection is mutex-guarded so the store is `Sync`; operations are
/// short single statements, single-owner per logical operation.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (dropped with the value).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn manifest_bytes(&self, id: Hash, kind: EntryKind) -> Result<Vec<u8>, StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.query_row(
            "SELECT data FROM metadata WHERE id = ?1 AND obj_type = ?2",
            params![id.to_string(), kind.as_str()],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()?
        .ok_or(StoreError::ManifestNotFound { id, kind })
    }
}

impl BlockStore for SqliteStore {
    fn save_block(&self, id: Hash, data: &[u8]) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.execute(
            "INSERT OR IGNORE INTO blocks (id, data) VALUES (?1, ?2)",
            params![id.to_string(), data],
        )?;
        debug!(%id, size = data.len(), "stored block");
        Ok(())
    }

    fn get_block(&self, id: Hash) -> Result<Bytes, StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.query_row(
            "SELECT data FROM blocks WHERE id = ?1",
            params![id.to_string()],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()?
        .map(Bytes::from)
        .ok_or(StoreError::BlockNotFound(id))
    }

    fn has_block(&self, id: Hash) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        let row = conn
            .query_row(
                "SELECT 1 FROM blocks WHERE id = ?1",
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(row.is_some())
    }
}

impl MetaStore for SqliteStore {
    fn save_manifest(&self, id: Hash, kind: EntryKind, bytes: &[u8]) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        conn.execute(
            "INSERT OR IGNORE INTO metadata (id, obj_type, data) VALUES (?1, ?2, ?3)",
            params![id.to_string(), kind.as_str(), bytes],
        )?;
        debug!(%id, %kind, size = bytes.len(), "stored manifest");
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

impl CommitStore for SqliteStore {
    fn commit(
        &self,
        parent: Option<Hash>,
        root: Hash,
        timestamp: i64,
    ) -> Result<Hash, StoreError> {
        let (id, commit) = commit_record(parent, root, timestamp)?;
        let parent_text = commit.parent.map(|p| p.to_string()).unwrap_or_default();

        let conn = self.conn.lock().expect("lock poisoned");
        conn.execute(
            "INSERT OR IGNORE INTO commits (id, parent_id, root_id, timestamp) \
             VALUES (?1, ?2, ?3, ?4)",
            params![id.to_string(), parent_text, root.to_string(), timestamp],
        )?;
        debug!(commit = %id, %root, timestamp, "recorded commit");
        Ok(id)
    }

    fn get_commit(&self, id: Hash) -> Result<Commit, StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        let row = conn
            .query_row(
                "SELECT parent_id, root_id, timestamp FROM commits WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?
            .ok_or(StoreError::CommitNotFound(id))?;

        let (parent_text, root_text, timestamp) = row;
        let owner = id.to_string();
        let parent = if parent_text.is_empty() {
            None
        } else {
            Some(parse_stored_hash(&owner, &parent_text)?)
        };
        Ok(Commit {
            parent,
            root: parse_stored_hash(&owner, &root_text)?,
            timestamp,
        })
    }

    fn latest_root(&self) -> Result<Hash, StoreError> {
        let conn = self.conn.lock().expect("lock poisoned");
        let root_text = conn
            .query_row(
                // Greatest timestamp wins; ties go to the earliest insert.
                "SELECT root_id FROM commits \
                 ORDER BY timestamp DESC, rowid ASC LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or(StoreError::NoCommits)?;

        parse_stored_hash(&root_text, &root_text)
    }
}

/// Parse a hex column value, reporting corruption against the owning id.
fn parse_stored_hash(owner: &str, text: &str) -> Result<Hash, StoreError> {
    Hash::from_hex(text).map_err(|e| StoreError::Decode {
        id: owner.to_string(),
        source: CasError::Decode(e.to_string()),
    })
}
