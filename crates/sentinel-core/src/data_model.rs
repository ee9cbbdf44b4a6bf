//! Data model: records exchanged between stages and the final aggregate.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::trace::TraceEntry;

/// How retrieval should run. A single strategy exists today; the enum is
/// the seam for keyword or hybrid retrieval later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    Semantic,
}

/// Rough effort grade for a question. Placeholder until planning learns
/// to grade questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatedComplexity {
    Standard,
}

/// Output of the planning stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub original_question: String,
    /// Lower-cased question with interrogative words stripped. May be empty.
    pub reformulated_query: String,
    pub retrieval_strategy: RetrievalStrategy,
    /// Tool names this question needs, in table order, no duplicates.
    pub requires_tools: Vec<String>,
    pub estimated_complexity: EstimatedComplexity,
}

/// One indexed document as returned by the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Similarity distance, lower is more similar. Absent when the index
    /// cannot provide one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl DocumentRecord {
    /// Source attribution, `"unknown"` when the metadata lacks one.
    pub fn source(&self) -> &str {
        self.metadata
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }
}

/// Output of the retrieval stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query_used: String,
    pub documents_found: usize,
    /// Ranked ascending by distance, exactly as the index returned them.
    pub documents: Vec<DocumentRecord>,
}

/// Output of the analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub response: String,
    /// Tool name → result or error string. Keyed deterministically so
    /// completion order never changes the serialized output.
    pub tool_results: BTreeMap<String, String>,
    /// Source of every retrieved document, order preserved, duplicates kept.
    pub sources: Vec<String>,
    /// Always within [0.0, 1.0].
    pub confidence: f64,
}

/// Output of the guard stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardResult {
    /// Content safety: false only when a sensitive term was found.
    pub policy_approved: bool,
    pub policy_violations: Vec<String>,
    /// Set by any violation, including the length cap. Kept independent of
    /// `policy_approved` on purpose.
    pub requires_human_review: bool,
    /// Currently always equals the candidate response; kept as the seam
    /// for future redaction.
    pub modified_response: String,
}

/// Aggregate produced by every run, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResult {
    pub conversation_id: String,
    pub question: String,
    pub response: String,
    pub sources: Vec<String>,
    pub tool_results: BTreeMap<String, String>,
    pub confidence: f64,
    pub requires_human_review: bool,
    pub trace: Vec<TraceEntry>,
    pub processing_ms: u64,
}
