//! Commit chains and commit-driven restores.

use std::fs;

use tempfile::TempDir;

use super::helpers::{memory_engine, write_file};
use crate::EngineError;

#[test]
fn test_commit_chain_and_latest_root() {
    let (engine, _store) = memory_engine();
    let src = TempDir::new().unwrap();

    write_file(src.path(), "v.txt", b"version 1");
    let r1 = engine.snapshot(src.path()).unwrap();
    write_file(src.path(), "v.txt", b"version 2");
    let r2 = engine.snapshot(src.path()).unwrap();

    let c1 = engine.commit(None, r1, 1).unwrap();
    let c2 = engine.commit(Some(c1), r2, 2).unwrap();
    assert_eq!(engine.latest_root().unwrap(), r2);

    // Re-issuing the same tuple returns the same commit unchanged.
    assert_eq!(engine.commit(Some(c1), r2, 2).unwrap(), c2);

    let commit = engine.get_commit(c2).unwrap();
    assert_eq!(commit.parent, Some(c1));
    assert_eq!(commit.root, r2);
    assert_eq!(commit.timestamp, 2);
}

#[test]
fn test_restore_commit_by_id() {
    let (engine, _store) = memory_engine();
    let src = TempDir::new().unwrap();

    write_file(src.path(), "old.txt", b"old state");
    let r1 = engine.snapshot(src.path()).unwrap();
    let c1 = engine.commit(None, r1, 10).unwrap();

    fs::remove_file(src.path().join("old.txt")).unwrap();
    write_file(src.path(), "new.txt", b"new state");
    let r2 = engine.snapshot(src.path()).unwrap();
    engine.commit(Some(c1), r2, 20).unwrap();

    // Restoring the older commit brings back the older tree.
    let dest = TempDir::new().unwrap();
    let restored = engine.restore_commit(c1, dest.path()).unwrap();
    assert_eq!(restored, r1);
    assert_eq!(fs::read(dest.path().join("old.txt")).unwrap(), b"old state");
    assert!(!dest.path().join("new.txt").exists());
}

#[test]
fn test_restore_commit_rejects_negative_timestamp() {
    let (engine, _store) = memory_engine();
    let src = TempDir::new().unwrap();
    write_file(src.path(), "f.txt", b"bytes");

    let root = engine.snapshot(src.path()).unwrap();
    let commit = engine.commit(None, root, -7).unwrap();

    let dest = TempDir::new().unwrap();
    let err = engine.restore_commit(commit, dest.path()).unwrap_err();
    assert!(matches!(
        err,
        EngineError::NegativeTimestamp { timestamp: -7, .. }
    ));
}

#[test]
fn test_restore_latest_without_commits_fails() {
    let (engine, _store) = memory_engine();
    let dest = TempDir::new().unwrap();

    let err = engine.restore_latest(dest.path()).unwrap_err();
    match err {
        EngineError::Store(e) => assert!(e.is_not_found()),
        other => panic!("expected not-found store error, got {other}"),
    }
}

#[test]
fn test_commits_share_snapshot_artifacts() {
    // Committing the same root twice at different timestamps stores two
    // commits but no new blocks or manifests.
    let (engine, store) = memory_engine();
    let src = TempDir::new().unwrap();
    write_file(src.path(), "f.txt", b"fixed");

    let root = engine.snapshot(src.path()).unwrap();
    let manifests = store.manifest_count();
    let blocks = store.block_count();

    let c1 = engine.commit(None, root, 1).unwrap();
    let c2 = engine.commit(Some(c1), root, 2).unwrap();
    assert_ne!(c1, c2);
    assert_eq!(store.commit_count(), 2);
    assert_eq!(store.manifest_count(), manifests);
    assert_eq!(store.block_count(), blocks);
}
