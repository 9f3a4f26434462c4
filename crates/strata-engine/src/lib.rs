//! The Strata engine: snapshot, restore, and diff over Merkle trees.
//!
//! Three recursive walks share the directory-manifest structure:
//! [`TreeBuilder`] ingests a filesystem tree bottom-up (post-order, so
//! manifests are written strictly after the blocks they reference),
//! [`Restorer`] materializes a tree top-down (pre-order, parents before
//! children), and [`Differ`] merge-walks two sorted manifest trees,
//! skipping equal subtrees by id.
//!
//! The [`Engine`] facade wires the three walks to a set of store
//! capabilities and a chunker.

pub mod builder;
pub mod differ;
pub mod error;
pub mod restorer;

mod engine;

pub use builder::TreeBuilder;
pub use differ::Differ;
pub use engine::Engine;
pub use error::EngineError;
pub use restorer::Restorer;

#[cfg(test)]
mod tests;
