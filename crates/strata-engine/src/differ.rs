//! Structural comparison of two snapshot roots.

use std::cmp::Ordering;
use std::path::Path;

use strata_store::MetaStore;
use strata_types::{Change, ChangeAction, DirEntry, EntryKind, Hash};

use crate::error::EngineError;

/// Compares two Merkle roots and produces a flat, path-level change list.
///
/// The comparison is a merge-walk over the sorted entry lists of each
/// directory pair. Equal ids mean equal subtrees and are skipped without
/// loading anything, so the cost is linear in the entries actually visited
/// and O(1) for unchanged subtrees.
pub struct Differ<'a> {
    meta: &'a dyn MetaStore,
}

impl<'a> Differ<'a> {
    /// Create a differ over the given metadata store.
    pub fn new(meta: &'a dyn MetaStore) -> Self {
        Self { meta }
    }

    /// Report every path that differs between `old_root` and `new_root`.
    ///
    /// Paths are relative to the roots (the root's own name is excluded).
    /// An added or removed directory is expanded: one change for the
    /// directory itself, then one for every descendant in pre-order.
    pub fn diff(&self, old_root: Hash, new_root: Hash) -> Result<Vec<Change>, EngineError> {
        let mut changes = Vec::new();
        self.diff_dirs(old_root, new_root, Path::new(""), &mut changes)?;
        Ok(changes)
    }

    fn diff_dirs(
        &self,
        old_id: Hash,
        new_id: Hash,
        base: &Path,
        out: &mut Vec<Change>,
    ) -> Result<(), EngineError> {
        if old_id == new_id {
            // Equal ids, equal subtrees: nothing to load.
            return Ok(());
        }

        let old = self.meta.dir_entries(old_id)?;
        let new = self.meta.dir_entries(new_id)?;

        let (mut i, mut j) = (0, 0);
        while i < old.len() && j < new.len() {
            let (o, n) = (&old[i], &new[j]);
            match o.name.as_bytes().cmp(n.name.as_bytes()) {
                Ordering::Less => {
                    self.expand(o, base, ChangeAction::Removed, out)?;
                    i += 1;
                }
                Ordering::Greater => {
                    self.expand(n, base, ChangeAction::Added, out)?;
                    j += 1;
                }
                Ordering::Equal => {
                    if o.kind != n.kind {
                        // A file became a directory or vice versa: the old
                        // entry goes away entirely, the new one appears.
                        self.expand(o, base, ChangeAction::Removed, out)?;
                        self.expand(n, base, ChangeAction::Added, out)?;
                    } else if o.id != n.id {
                        match o.kind {
                            EntryKind::File => out.push(Change {
                                path: base.join(&o.name),
                                action: ChangeAction::Modified,
                            }),
                            EntryKind::Dir => {
                                self.diff_dirs(o.id, n.id, &base.join(&o.name), out)?;
                            }
                        }
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        for entry in &old[i..] {
            self.expand(entry, base, ChangeAction::Removed, out)?;
        }
        for entry in &new[j..] {
            self.expand(entry, base, ChangeAction::Added, out)?;
        }
        Ok(())
    }

    /// Emit a change for `entry` and, for directories, every descendant in
    /// pre-order.
    fn expand(
        &self,
        entry: &DirEntry,
        base: &Path,
        action: ChangeAction,
        out: &mut Vec<Change>,
    ) -> Result<(), EngineError> {
        let path = base.join(&entry.name);
        out.push(Change {
            path: path.clone(),
            action,
        });

        if entry.kind == EntryKind::Dir {
            for child in self.meta.dir_entries(entry.id)? {
                self.expand(&child, &path, action, out)?;
            }
        }
        Ok(())
    }
}
