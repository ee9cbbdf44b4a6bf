//! Document ingestion: chunk raw text into indexed records.
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use sentinel_core::data_model::DocumentRecord;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::index::{IndexError, InMemoryIndex};

pub const DEFAULT_CHUNK_SIZE: usize = 1500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Turns files or raw text into indexed chunk records.
pub struct Ingestor {
    index: Arc<InMemoryIndex>,
    chunk_size: usize,
    overlap: usize,
}

impl Ingestor {
    pub fn new(index: Arc<InMemoryIndex>) -> Self {
        Self::with_chunking(index, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }

    pub fn with_chunking(index: Arc<InMemoryIndex>, chunk_size: usize, overlap: usize) -> Self {
        Self {
            index,
            chunk_size,
            overlap,
        }
    }

    /// Chunk `text` and add every chunk to the index with the caller's
    /// metadata. Returns the ids of the new records.
    pub fn ingest_text(
        &self,
        text: &str,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Vec<String>, IndexError> {
        let chunks = chunk_text(text, self.chunk_size, self.overlap);
        let mut ids = Vec::with_capacity(chunks.len());
        for (position, content) in chunks.into_iter().enumerate() {
            let id = Uuid::new_v4().to_string();
            let mut metadata = metadata.clone();
            metadata.insert("chunk".to_string(), json!(position));
            self.index.add(DocumentRecord {
                id: id.clone(),
                content,
                metadata,
                distance: None,
            })?;
            ids.push(id);
        }
        info!(chunks = ids.len(), "ingested document");
        Ok(ids)
    }

    /// Read and ingest a file, stamping the file name as `source` when the
    /// metadata does not already carry one.
    pub fn ingest_file(
        &self,
        path: &Path,
        mut metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Vec<String>, IndexError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| IndexError::SourceNotFound(format!("{}: {e}", path.display())))?;
        if !metadata.contains_key("source") {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            metadata.insert("source".to_string(), json!(name));
        }
        self.ingest_text(&text, metadata)
    }
}

/// Split text into character chunks of at most `chunk_size`, each chunk
/// overlapping the previous one by `overlap` characters.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    // A degenerate overlap would stall the window.
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VectorIndex;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = chunk_text("short text", 1500, 150);
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_chunks_overlap() {
        let text = "abcdefghij";
        let chunks = chunk_text(text, 4, 2);
        assert_eq!(chunks[0], "abcd");
        assert_eq!(chunks[1], "cdef");
        // Every character of the input appears in some chunk
        let joined: String = chunks.concat();
        for c in text.chars() {
            assert!(joined.contains(c));
        }
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(chunk_text("", 1500, 150).is_empty());
    }

    #[test]
    fn test_ingest_text_indexes_chunks() {
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::with_chunking(Arc::clone(&index), 10, 2);

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), json!("notes.txt"));
        let ids = ingestor
            .ingest_text("cfdi rules repeated cfdi rules", metadata)
            .unwrap();

        assert!(!ids.is_empty());
        assert_eq!(index.len(), ids.len());

        let results = index.search("cfdi", 10).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].source(), "notes.txt");
    }

    #[test]
    fn test_ingest_missing_file_fails() {
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(index);
        let err = ingestor
            .ingest_file(Path::new("/nonexistent/file.txt"), HashMap::new())
            .unwrap_err();
        assert!(matches!(err, IndexError::SourceNotFound(_)));
    }
}
