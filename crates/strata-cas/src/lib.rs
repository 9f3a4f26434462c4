//! Content addressing for Strata: chunking and canonical encoding.
//!
//! This crate provides:
//! - [`Chunker`]: content-defined chunking using FastCDC, so that local
//!   edits disturb only nearby chunk boundaries.
//! - [`encode`]: the canonical JSON encoding of file manifests, directory
//!   manifests, and commits. These bytes are the preimage of every
//!   artifact id, so the encoding is the identity contract of the store:
//!   byte-identical logical input must produce byte-identical output.

pub mod encode;

mod chunker;
mod error;

pub use chunker::{Chunk, ChunkStream, Chunker, CDC_AVG_SIZE, CDC_MAX_SIZE, CDC_MIN_SIZE};
pub use error::CasError;
