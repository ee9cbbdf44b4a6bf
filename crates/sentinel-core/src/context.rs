//! Workflow context: accumulating per-request state threaded through stages.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data_model::{AnalysisResult, GuardResult, Plan, RetrievalResult};

/// Per-request state owned by exactly one engine run.
///
/// Stages only ever add or overwrite fields, never clear them, so the
/// context grows monotonically across a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowContext {
    pub conversation_id: String,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    /// Requested result count. Non-positive values fall back to the
    /// retrieval default rather than failing.
    pub k: i64,
    pub plan: Option<Plan>,
    pub retrieval: Option<RetrievalResult>,
    pub analysis: Option<AnalysisResult>,
    pub guard: Option<GuardResult>,
}

impl WorkflowContext {
    pub fn new(question: impl Into<String>, k: i64) -> Self {
        Self {
            conversation_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            question: question.into(),
            k,
            plan: None,
            retrieval: None,
            analysis: None,
            guard: None,
        }
    }

    /// Merge a stage's partial update, overwriting on collision.
    pub fn merge(&mut self, update: StageUpdate) {
        if let Some(plan) = update.plan {
            self.plan = Some(plan);
        }
        if let Some(retrieval) = update.retrieval {
            self.retrieval = Some(retrieval);
        }
        if let Some(analysis) = update.analysis {
            self.analysis = Some(analysis);
        }
        if let Some(guard) = update.guard {
            self.guard = Some(guard);
        }
    }
}

/// Partial update produced by one stage invocation.
#[derive(Debug, Clone, Default)]
pub struct StageUpdate {
    pub plan: Option<Plan>,
    pub retrieval: Option<RetrievalResult>,
    pub analysis: Option<AnalysisResult>,
    pub guard: Option<GuardResult>,
    /// Identifier of the stage to run next; `None` means the run is done.
    pub next_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{EstimatedComplexity, Plan, RetrievalStrategy};

    fn plan(query: &str) -> Plan {
        Plan {
            original_question: "q".to_string(),
            reformulated_query: query.to_string(),
            retrieval_strategy: RetrievalStrategy::Semantic,
            requires_tools: vec![],
            estimated_complexity: EstimatedComplexity::Standard,
        }
    }

    #[test]
    fn test_merge_adds_fields() {
        let mut ctx = WorkflowContext::new("question", 5);
        assert!(ctx.plan.is_none());

        ctx.merge(StageUpdate {
            plan: Some(plan("first")),
            ..Default::default()
        });
        assert_eq!(ctx.plan.as_ref().unwrap().reformulated_query, "first");
    }

    #[test]
    fn test_merge_overwrites_on_collision() {
        let mut ctx = WorkflowContext::new("question", 5);
        ctx.merge(StageUpdate {
            plan: Some(plan("first")),
            ..Default::default()
        });
        ctx.merge(StageUpdate {
            plan: Some(plan("second")),
            ..Default::default()
        });
        assert_eq!(ctx.plan.as_ref().unwrap().reformulated_query, "second");
    }

    #[test]
    fn test_merge_never_clears() {
        let mut ctx = WorkflowContext::new("question", 5);
        ctx.merge(StageUpdate {
            plan: Some(plan("kept")),
            ..Default::default()
        });
        // An empty update leaves earlier outputs in place.
        ctx.merge(StageUpdate::default());
        assert!(ctx.plan.is_some());
    }

    #[test]
    fn test_conversation_ids_are_unique() {
        let a = WorkflowContext::new("q", 5);
        let b = WorkflowContext::new("q", 5);
        assert_ne!(a.conversation_id, b.conversation_id);
    }
}
