//! API handlers and request DTOs.
use std::collections::HashMap;
use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use sentinel_core::{FinalResult, WorkflowContext, SENTINEL_VERSION};
use sentinel_index::{IndexError, VectorIndex};
use sentinel_tools::ToolError;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub k: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub k: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Path of a file to ingest; mutually exclusive with `text`.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Raw text to ingest directly.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    pub tool: String,
    #[serde(default)]
    pub params: Value,
}

pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> (StatusCode, Json<FinalResult>) {
    state.metrics.asks_total.inc();
    let ctx = WorkflowContext::new(req.question, req.k.unwrap_or(5));
    let result = state.engine.run(ctx).await;
    if result.requires_human_review {
        state.metrics.human_reviews_total.inc();
    }
    state.history.record(result.clone());
    (StatusCode::OK, Json(result))
}

pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> (StatusCode, Json<Value>) {
    state.metrics.searches_total.inc();
    let k = req.k.filter(|k| *k > 0).unwrap_or(5) as usize;
    match state.index.search(&req.query, k) {
        Ok(documents) => (
            StatusCode::OK,
            Json(json!({
                "query": req.query,
                "documents_found": documents.len(),
                "documents": documents,
            })),
        ),
        Err(err) => index_error(err),
    }
}

pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> (StatusCode, Json<Value>) {
    state.metrics.ingests_total.inc();
    let outcome = match (&req.file_path, &req.text) {
        (Some(path), _) => state.ingestor.ingest_file(Path::new(path), req.metadata),
        (None, Some(text)) => state.ingestor.ingest_text(text, req.metadata),
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "either file_path or text is required" })),
            )
        }
    };
    match outcome {
        Ok(ids) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "chunks": ids.len(), "ids": ids })),
        ),
        Err(err) => index_error(err),
    }
}

pub async fn list_tools(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "tools": state.registry.describe() })),
    )
}

pub async fn call_tool(
    State(state): State<AppState>,
    Json(req): Json<ToolCallRequest>,
) -> (StatusCode, Json<Value>) {
    state.metrics.tool_calls_total.inc();
    match state.registry.invoke(&req.tool, &req.params) {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({ "tool": req.tool, "result": result })),
        ),
        Err(err) => {
            let status = match err {
                ToolError::NotRegistered(_) => StatusCode::NOT_FOUND,
                ToolError::InvalidParams(_) => StatusCode::BAD_REQUEST,
                ToolError::ExecutionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "tool": req.tool, "error": err.to_string() })))
        }
    }
}

pub async fn history(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "conversations": state.history.recent(50) })),
    )
}

pub async fn get_conversation(
    State(state): State<AppState>,
    UrlPath(conversation_id): UrlPath<String>,
) -> (StatusCode, Json<Value>) {
    match state.history.find(&conversation_id) {
        Some(result) => (StatusCode::OK, Json(json!(result))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no conversation {conversation_id}") })),
        ),
    }
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": SENTINEL_VERSION })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    match state.metrics.encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn index_error(err: IndexError) -> (StatusCode, Json<Value>) {
    let status = match err {
        IndexError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        IndexError::SourceNotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
