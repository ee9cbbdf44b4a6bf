//! Analysis stage: response synthesis, confidence scoring, and tool
//! execution.
use std::collections::BTreeMap;
use std::sync::Arc;

use sentinel_core::data_model::{AnalysisResult, DocumentRecord};
use sentinel_core::{agent, Stage, StageError, StageUpdate, WorkflowContext};
use sentinel_tools::ToolRegistry;
use tracing::debug;

/// Documents quoted in the synthesized response.
const MAX_SYNTHESIS_DOCS: usize = 3;
/// Characters quoted from each document.
const MAX_SNIPPET_CHARS: usize = 200;
/// Stand-in distance for documents the index could not score.
const DEFAULT_DISTANCE: f64 = 0.5;

pub struct AnalysisStage {
    registry: Arc<ToolRegistry>,
}

impl AnalysisStage {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Run every required tool, recording each tool's result or error
    /// under its name. One tool's fault never aborts the others.
    fn run_tools(&self, ctx: &WorkflowContext) -> BTreeMap<String, String> {
        let mut results = BTreeMap::new();
        let Some(plan) = &ctx.plan else {
            return results;
        };

        for name in &plan.requires_tools {
            if !self.registry.contains(name) {
                results.insert(name.clone(), format!("error: tool '{name}' is not registered"));
                continue;
            }
            let outcome = match extract_params(name, ctx) {
                Some(params) => match self.registry.invoke(name, &params) {
                    Ok(result) => result,
                    Err(err) => format!("error: {err}"),
                },
                None => "needs parameters".to_string(),
            };
            debug!(tool = %name, "tool executed");
            results.insert(name.clone(), outcome);
        }
        results
    }
}

impl Stage for AnalysisStage {
    fn id(&self) -> &'static str {
        agent::ANALYSIS
    }

    fn process(&self, ctx: &WorkflowContext) -> Result<StageUpdate, StageError> {
        let documents: &[DocumentRecord] = ctx
            .retrieval
            .as_ref()
            .map(|r| r.documents.as_slice())
            .unwrap_or(&[]);

        let analysis = AnalysisResult {
            response: synthesize_response(&ctx.question, documents),
            tool_results: self.run_tools(ctx),
            sources: documents.iter().map(|d| d.source().to_string()).collect(),
            confidence: score_confidence(documents),
        };
        Ok(StageUpdate {
            analysis: Some(analysis),
            next_agent: Some(agent::GUARD.to_string()),
            ..Default::default()
        })
    }
}

/// Best-effort parameter extraction from the context. Only the CFDI
/// lookup has a rule today; every other tool reports missing parameters.
/// Known extension point, not a gap to paper over.
fn extract_params(tool: &str, ctx: &WorkflowContext) -> Option<serde_json::Value> {
    match tool {
        "consultar_cfdi" => Some(serde_json::json!({ "question": ctx.question })),
        _ => None,
    }
}

/// Fixed-text synthesis over the top-ranked documents. The template is
/// frozen; golden tests assert it verbatim.
pub fn synthesize_response(question: &str, documents: &[DocumentRecord]) -> String {
    if documents.is_empty() {
        return format!(
            "I couldn't find relevant information in the indexed documents to answer: \"{question}\""
        );
    }

    let mut response =
        format!("Based on the retrieved documents, here is what I found about \"{question}\":");
    for doc in documents.iter().take(MAX_SYNTHESIS_DOCS) {
        let snippet: String = doc.content.chars().take(MAX_SNIPPET_CHARS).collect();
        response.push_str(&format!("\n\nFrom {}:\n{}", doc.source(), snippet));
    }
    response
}

/// Deterministic confidence over the retrieved set:
///
/// ```text
/// base            = min(0.2 * document_count, 1.0)
/// distance_factor = max(0.1, 1.0 - avg_distance)
/// confidence      = min(base * distance_factor, 1.0)
/// ```
///
/// Exactly 0.0 only for an empty set, which is short-circuited because an
/// empty list has no meaningful average.
pub fn score_confidence(documents: &[DocumentRecord]) -> f64 {
    if documents.is_empty() {
        return 0.0;
    }
    let count = documents.len() as f64;
    let base = (0.2 * count).min(1.0);
    let avg_distance = documents
        .iter()
        .map(|d| d.distance.unwrap_or(DEFAULT_DISTANCE))
        .sum::<f64>()
        / count;
    let distance_factor = (1.0 - avg_distance).max(0.1);
    (base * distance_factor).min(1.0)
}
