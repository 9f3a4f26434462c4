//! Content-Defined Chunking (CDC) using FastCDC.
//!
//! Splits file content into variable-size chunks whose boundaries are
//! determined by content fingerprints. When a file is partially modified,
//! only the chunks around the edit change; unchanged regions keep the same
//! id, so re-snapshotting stores only the new chunks.
//!
//! **Parameters are part of the dedup contract**: changing them makes the
//! same data chunk differently, so previously stored blocks stop matching.

use std::io::Read;

use fastcdc::v2020::{FastCDC, StreamCDC};
use strata_types::Hash;

use crate::error::CasError;

/// Default minimum chunk size (256 KiB).
pub const CDC_MIN_SIZE: u32 = 262_144;

/// Default target average chunk size (1 MiB).
pub const CDC_AVG_SIZE: u32 = 1_048_576;

/// Default maximum chunk size (4 MiB).
pub const CDC_MAX_SIZE: u32 = 4_194_304;

/// A single chunk of data with its content-addressed id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Content-addressed identifier: `sha256(data)`.
    pub id: Hash,
    /// Byte offset within the original file.
    pub offset: u64,
    /// The raw chunk data.
    pub data: Vec<u8>,
}

/// Content-defined chunker using the FastCDC algorithm.
///
/// Chunk boundaries are declared where a gear rolling hash matches a
/// position-dependent mask, producing chunks between `min_size` and
/// `max_size` bytes with an average of `avg_size`. A chunk shorter than
/// `min_size` is only ever emitted as the final chunk at end of input;
/// `max_size` is a hard ceiling, where a chunk is cut even without a
/// natural boundary.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    min_size: u32,
    avg_size: u32,
    max_size: u32,
}

impl Chunker {
    /// Create a chunker with the default parameters (256 KiB / 1 MiB / 4 MiB).
    pub fn new() -> Self {
        Self::with_sizes(CDC_MIN_SIZE, CDC_AVG_SIZE, CDC_MAX_SIZE)
    }

    /// Create a chunker with explicit size bounds.
    ///
    /// # Panics
    ///
    /// Panics if the sizes are not ordered `min <= avg <= max` or fall
    /// outside the FastCDC limits (min >= 64, avg >= 256, max >= 1024).
    pub fn with_sizes(min_size: u32, avg_size: u32, max_size: u32) -> Self {
        assert!(min_size >= 64, "min_size must be >= 64 (got {min_size})");
        assert!(avg_size >= 256, "avg_size must be >= 256 (got {avg_size})");
        assert!(max_size >= 1024, "max_size must be >= 1024 (got {max_size})");
        assert!(
            min_size <= avg_size && avg_size <= max_size,
            "chunk sizes must be ordered min <= avg <= max \
             (got {min_size}/{avg_size}/{max_size})"
        );

        Self {
            min_size,
            avg_size,
            max_size,
        }
    }

    /// Return the configured average chunk size.
    pub fn avg_size(&self) -> u32 {
        self.avg_size
    }

    /// Split an in-memory buffer into content-defined chunks.
    ///
    /// Each chunk's id is the SHA-256 hash of its raw data.
    /// Returns an empty vec for empty input.
    pub fn chunk(&self, data: &[u8]) -> Vec<Chunk> {
        if data.is_empty() {
            return Vec::new();
        }

        let chunker = FastCDC::new(data, self.min_size, self.avg_size, self.max_size);
        let mut chunks = Vec::new();

        for entry in chunker {
            let chunk_data = &data[entry.offset..entry.offset + entry.length];
            chunks.push(Chunk {
                id: Hash::from_data(chunk_data),
                offset: entry.offset as u64,
                data: chunk_data.to_vec(),
            });
        }

        chunks
    }

    /// Split a byte stream into content-defined chunks, lazily.
    ///
    /// The returned iterator yields chunks in emission order and holds the
    /// reader for its own lifetime; a new stream is created per file. Read
    /// failures surface as errors from the iterator; end of input simply
    /// terminates it.
    pub fn chunks<R: Read>(&self, source: R) -> ChunkStream<R> {
        ChunkStream {
            inner: StreamCDC::new(source, self.min_size, self.avg_size, self.max_size),
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy chunk iterator over a byte stream.
///
/// Created by [`Chunker::chunks`]. Not restartable.
pub struct ChunkStream<R: Read> {
    inner: StreamCDC<R>,
}

impl<R: Read> Iterator for ChunkStream<R> {
    type Item = Result<Chunk, CasError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next()? {
            Ok(entry) => Some(Ok(Chunk {
                id: Hash::from_data(&entry.data),
                offset: entry.offset,
                data: entry.data,
            })),
            Err(fastcdc::v2020::Error::IoError(e)) => Some(Err(CasError::Io(e))),
            Err(e) => Some(Err(CasError::Chunking(e.to_string()))),
        }
    }
}
