//! In-memory similarity index over term-frequency vectors.
use std::collections::HashMap;
use std::sync::RwLock;

use sentinel_core::data_model::DocumentRecord;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// The store cannot be reached. Distinct from "no matches", which is
    /// an `Ok` empty result.
    #[error("INDEX/UNAVAILABLE: {0}")]
    Unavailable(String),

    #[error("INDEX/SOURCE: {0}")]
    SourceNotFound(String),
}

/// Similarity-search collaborator used by the retrieval stage.
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` records ranked ascending by distance (lower is
    /// more similar). Must fail with [`IndexError::Unavailable`] when the
    /// underlying store is unreachable rather than returning an empty
    /// list.
    fn search(&self, query: &str, k: usize) -> Result<Vec<DocumentRecord>, IndexError>;
}

struct IndexedDocument {
    record: DocumentRecord,
    vector: HashMap<String, f64>,
    norm: f64,
}

struct IndexState {
    documents: Vec<IndexedDocument>,
    open: bool,
}

/// Deterministic in-memory index: documents are embedded as lowercase
/// token frequency vectors and ranked by cosine distance.
///
/// Searches take a read lock so concurrent queries proceed in parallel;
/// ingestion takes the write lock, so a search never observes a
/// half-written index.
pub struct InMemoryIndex {
    state: RwLock<IndexState>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(IndexState {
                documents: Vec::new(),
                open: true,
            }),
        }
    }

    /// Embed and store one record. The stored copy carries no distance;
    /// distances are computed per query.
    pub fn add(&self, record: DocumentRecord) -> Result<(), IndexError> {
        let (vector, norm) = embed(&record.content);
        let mut state = self.write_state()?;
        if !state.open {
            return Err(IndexError::Unavailable("index is closed".to_string()));
        }
        state.documents.push(IndexedDocument {
            record,
            vector,
            norm,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        match self.state.read() {
            Ok(state) => state.documents.len(),
            Err(poisoned) => poisoned.into_inner().documents.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close the index; subsequent searches and writes report
    /// `Unavailable`.
    pub fn close(&self) {
        if let Ok(mut state) = self.state.write() {
            state.open = false;
        }
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, IndexState>, IndexError> {
        self.state
            .write()
            .map_err(|_| IndexError::Unavailable("index lock poisoned".to_string()))
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorIndex for InMemoryIndex {
    fn search(&self, query: &str, k: usize) -> Result<Vec<DocumentRecord>, IndexError> {
        let state = self
            .state
            .read()
            .map_err(|_| IndexError::Unavailable("index lock poisoned".to_string()))?;
        if !state.open {
            return Err(IndexError::Unavailable("index is closed".to_string()));
        }

        let (query_vector, query_norm) = embed(query);
        if query_vector.is_empty() {
            debug!(query, "query produced no tokens, returning no matches");
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, &DocumentRecord)> = state
            .documents
            .iter()
            .map(|doc| {
                let distance = cosine_distance(&query_vector, query_norm, &doc.vector, doc.norm);
                (distance, &doc.record)
            })
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let results = scored
            .into_iter()
            .take(k)
            .map(|(distance, record)| {
                let mut record = record.clone();
                record.distance = Some(distance);
                record
            })
            .collect();
        Ok(results)
    }
}

/// Lowercase alphanumeric token frequencies plus the vector's Euclidean
/// norm.
fn embed(text: &str) -> (HashMap<String, f64>, f64) {
    let mut vector: HashMap<String, f64> = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *vector.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    let norm = vector.values().map(|v| v * v).sum::<f64>().sqrt();
    (vector, norm)
}

/// `1 - cosine similarity`, clamped to [0, 1]. Documents with no tokens
/// sit at the maximum distance.
fn cosine_distance(
    query: &HashMap<String, f64>,
    query_norm: f64,
    doc: &HashMap<String, f64>,
    doc_norm: f64,
) -> f64 {
    if query_norm == 0.0 || doc_norm == 0.0 {
        return 1.0;
    }
    let dot: f64 = query
        .iter()
        .filter_map(|(token, weight)| doc.get(token).map(|d| weight * d))
        .sum();
    (1.0 - dot / (query_norm * doc_norm)).clamp(0.0, 1.0)
}
