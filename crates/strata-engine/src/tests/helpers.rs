//! Shared test utilities for strata-engine tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use strata_cas::Chunker;
use strata_store::MemoryStore;

use crate::Engine;

/// Chunker with small bounds so small test files still span several chunks.
pub fn small_chunker() -> Chunker {
    Chunker::with_sizes(1024, 4096, 16_384)
}

/// Engine over a single in-memory store serving all three capabilities.
pub fn memory_engine() -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine =
        Engine::new(store.clone(), store.clone(), store.clone()).with_chunker(small_chunker());
    (engine, store)
}

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// Write a file under `root`, creating parent directories as needed.
pub fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Collect a tree as relative path → file contents. Directories appear as
/// `"<path>/" → []` so empty directories participate in comparisons.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    collect(root, Path::new(""), &mut out);
    out
}

fn collect(root: &Path, rel: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
    for dirent in fs::read_dir(root.join(rel)).unwrap() {
        let dirent = dirent.unwrap();
        let name = dirent.file_name().into_string().unwrap();
        let rel_child = rel.join(&name);
        if dirent.file_type().unwrap().is_dir() {
            out.insert(format!("{}/", rel_child.to_string_lossy()), Vec::new());
            collect(root, &rel_child, out);
        } else {
            out.insert(
                rel_child.to_string_lossy().into_owned(),
                fs::read(dirent.path()).unwrap(),
            );
        }
    }
}
