//! End-to-end pipeline tests: real engine, real in-memory index, built-in
//! tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use sentinel_core::{
    agent, Stage, StageError, StageUpdate, TraceAction, WorkflowContext, WorkflowEngine,
};
use sentinel_index::{InMemoryIndex, Ingestor, VectorIndex};
use sentinel_stages::{default_stages, AnalysisStage, GuardStage, PlanningStage, RetrievalStage};
use sentinel_tools::{Tool, ToolError, ToolRegistry};
use serde_json::json;

fn engine_with_index(index: Arc<InMemoryIndex>) -> WorkflowEngine {
    let registry = Arc::new(ToolRegistry::with_builtin_tools());
    WorkflowEngine::new(default_stages(index as Arc<dyn VectorIndex>, registry))
}

fn seeded_index() -> Arc<InMemoryIndex> {
    let index = Arc::new(InMemoryIndex::new());
    let ingestor = Ingestor::new(Arc::clone(&index));
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), json!("guia_cfdi.pdf"));
    ingestor
        .ingest_text(
            "A CFDI is the electronic invoice format required by the SAT. \
             Cancellation of a CFDI must be requested through the SAT portal.",
            metadata,
        )
        .unwrap();
    index
}

#[tokio::test]
async fn test_happy_path_reaches_complete() {
    let engine = engine_with_index(seeded_index());
    let result = engine.run(WorkflowContext::new("What is CFDI?", 5)).await;

    // planning → retrieval → analysis → guard, all processed
    assert_eq!(result.trace.len(), 4);
    assert!(result.trace.iter().all(|e| e.action == TraceAction::Processed));
    assert_eq!(result.trace[3].agent, agent::GUARD);

    assert!(result.response.contains("guia_cfdi.pdf"));
    assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    assert!(!result.requires_human_review);
    assert_eq!(result.sources[0], "guia_cfdi.pdf");
    assert!(result.tool_results["consultar_cfdi"].contains("What is CFDI?"));
}

#[tokio::test]
async fn test_empty_retrieval_end_to_end() {
    let engine = engine_with_index(Arc::new(InMemoryIndex::new()));
    let result = engine
        .run(WorkflowContext::new("anything about nothing", 5))
        .await;

    assert_eq!(
        result.response,
        "I couldn't find relevant information in the indexed documents to answer: \"anything about nothing\""
    );
    assert_eq!(result.confidence, 0.0);
    assert!(!result.requires_human_review);
    assert!(result.sources.is_empty());
    // Guard approves and the run ends at complete
    assert_eq!(result.trace.last().unwrap().agent, agent::GUARD);
    assert_eq!(result.trace.last().unwrap().action, TraceAction::Processed);
}

#[tokio::test]
async fn test_sensitive_document_routes_to_human() {
    let index = Arc::new(InMemoryIndex::new());
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), json!("leak.txt"));
    index
        .add(sentinel_core::DocumentRecord {
            id: "d1".to_string(),
            content: "the admin password is hunter2".to_string(),
            metadata,
            distance: None,
        })
        .unwrap();

    let engine = engine_with_index(index);
    let result = engine
        .run(WorkflowContext::new("what is the admin password", 5))
        .await;

    assert!(result.requires_human_review);
    let last = result.trace.last().unwrap();
    assert_eq!(last.action, TraceAction::HumanReviewRequired);
    assert_eq!(last.agent, agent::HUMAN);
    // 4 processed stages + the human halt
    assert_eq!(result.trace.len(), 5);
}

#[tokio::test]
async fn test_failing_tool_among_two_still_completes() {
    // Replace the RFC tool with one that always fails at invocation and
    // give it an extraction rule via a custom analysis wrapper: simplest
    // is a registry whose cfdi tool fails while the custom echo works.
    let mut registry = ToolRegistry::new();
    registry.register(Tool::new(
        "consultar_cfdi",
        "always fails",
        json!({ "type": "object" }),
        |_params| Err(ToolError::ExecutionFailed("backend down".to_string())),
    ));
    registry.register(Tool::new(
        "validar_rfc",
        "never invoked without params",
        json!({ "type": "object" }),
        |_params| Ok("ok".to_string()),
    ));

    let index = seeded_index();
    let registry = Arc::new(registry);
    let engine = WorkflowEngine::new(default_stages(index as Arc<dyn VectorIndex>, registry));

    let result = engine
        .run(WorkflowContext::new("check cfdi and rfc data", 5))
        .await;

    assert_eq!(result.tool_results.len(), 2);
    assert!(result.tool_results["consultar_cfdi"].starts_with("error:"));
    assert_eq!(result.tool_results["validar_rfc"], "needs parameters");
    // The run still reached the guard and completed
    assert_eq!(result.trace.last().unwrap().agent, agent::GUARD);
    assert_eq!(result.trace.last().unwrap().action, TraceAction::Processed);
}

#[tokio::test]
async fn test_unavailable_index_halts_with_error_trace() {
    struct DownIndex;
    impl VectorIndex for DownIndex {
        fn search(
            &self,
            _query: &str,
            _k: usize,
        ) -> Result<Vec<sentinel_core::DocumentRecord>, sentinel_index::IndexError> {
            Err(sentinel_index::IndexError::Unavailable(
                "store unreachable".to_string(),
            ))
        }
    }

    let registry = Arc::new(ToolRegistry::with_builtin_tools());
    let engine = WorkflowEngine::new(default_stages(Arc::new(DownIndex), registry));
    let result = engine.run(WorkflowContext::new("any question", 5)).await;

    // planning processed, retrieval errored, run halted with a result
    assert_eq!(result.trace.len(), 2);
    assert_eq!(result.trace[1].agent, agent::RETRIEVAL);
    assert_eq!(result.trace[1].action, TraceAction::Error);
    assert!(result.trace[1]
        .error
        .as_deref()
        .unwrap()
        .contains("RETRIEVAL/UNAVAILABLE"));
    assert_eq!(result.response, "");
    assert_eq!(result.confidence, 0.0);
}

#[tokio::test]
async fn test_cyclic_stage_never_exceeds_budget() {
    struct SelfLoop;
    impl Stage for SelfLoop {
        fn id(&self) -> &'static str {
            agent::PLANNING
        }
        fn process(&self, _ctx: &WorkflowContext) -> Result<StageUpdate, StageError> {
            Ok(StageUpdate {
                next_agent: Some(agent::PLANNING.to_string()),
                ..Default::default()
            })
        }
    }

    let engine = WorkflowEngine::new(vec![Box::new(SelfLoop)]);
    let result = engine.run(WorkflowContext::new("loop forever", 5)).await;
    assert!(result.trace.iter().all(|e| e.step <= 10));
    assert_eq!(result.trace.len(), 10);
}

#[tokio::test]
async fn test_stage_set_ids_cover_the_pipeline() {
    let index: Arc<dyn VectorIndex> = Arc::new(InMemoryIndex::new());
    let registry = Arc::new(ToolRegistry::with_builtin_tools());

    let ids: Vec<&str> = default_stages(index, registry).iter().map(|s| s.id()).collect();
    assert_eq!(
        ids,
        vec![agent::PLANNING, agent::RETRIEVAL, agent::ANALYSIS, agent::GUARD]
    );

    // The concrete types report the same ids
    assert_eq!(PlanningStage.id(), agent::PLANNING);
    assert_eq!(GuardStage::new().id(), agent::GUARD);
    assert_eq!(
        RetrievalStage::new(Arc::new(InMemoryIndex::new())).id(),
        agent::RETRIEVAL
    );
    assert_eq!(
        AnalysisStage::new(Arc::new(ToolRegistry::new())).id(),
        agent::ANALYSIS
    );
}
