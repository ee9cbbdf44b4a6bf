//! Retrieval stage: thin wrapper over the vector index.
use std::sync::Arc;

use sentinel_core::data_model::RetrievalResult;
use sentinel_core::{agent, Stage, StageError, StageUpdate, WorkflowContext};
use sentinel_index::{IndexError, VectorIndex};
use tracing::debug;

/// Result count used when the request carries no usable `k`.
pub const DEFAULT_K: usize = 5;

pub struct RetrievalStage {
    index: Arc<dyn VectorIndex>,
}

impl RetrievalStage {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }
}

impl Stage for RetrievalStage {
    fn id(&self) -> &'static str {
        agent::RETRIEVAL
    }

    fn process(&self, ctx: &WorkflowContext) -> Result<StageUpdate, StageError> {
        let query = ctx
            .plan
            .as_ref()
            .map(|p| p.reformulated_query.clone())
            .unwrap_or_else(|| ctx.question.clone());

        // Non-positive k means "use the default", not an error.
        let k = if ctx.k > 0 {
            ctx.k as usize
        } else {
            debug!(k = ctx.k, "non-positive k, using default");
            DEFAULT_K
        };

        let documents = self.index.search(&query, k).map_err(|e| match e {
            IndexError::Unavailable(msg) => StageError::RetrievalUnavailable(msg),
            other => StageError::ExecutionFailed(other.to_string()),
        })?;

        let retrieval = RetrievalResult {
            query_used: query,
            documents_found: documents.len(),
            documents,
        };
        Ok(StageUpdate {
            retrieval: Some(retrieval),
            next_agent: Some(agent::ANALYSIS.to_string()),
            ..Default::default()
        })
    }
}
