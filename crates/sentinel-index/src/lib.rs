//! Sentinel Index: similarity-search collaborator for the pipeline.
//!
//! Provides the `VectorIndex` contract the retrieval stage depends on, an
//! in-memory term-frequency implementation, and the `Ingestor` that chunks
//! raw documents into indexed records.

pub mod index;
pub mod ingest;

pub use index::{InMemoryIndex, IndexError, VectorIndex};
pub use ingest::{chunk_text, Ingestor, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
