//! Sentinel API /v1: REST endpoints over the workflow engine.
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use sentinel_core::{ConversationHistory, WorkflowEngine};
use sentinel_index::{InMemoryIndex, Ingestor, VectorIndex};
use sentinel_stages::default_stages;
use sentinel_tools::ToolRegistry;

/// Retained conversation results.
const HISTORY_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<WorkflowEngine>,
    pub index: Arc<InMemoryIndex>,
    pub ingestor: Arc<Ingestor>,
    pub registry: Arc<ToolRegistry>,
    pub history: Arc<ConversationHistory>,
    pub metrics: Arc<metrics::ApiMetrics>,
}

impl AppState {
    /// Wire the default pipeline: in-memory index, built-in tools,
    /// bounded history.
    pub fn new() -> Result<Self, prometheus::Error> {
        let index = Arc::new(InMemoryIndex::new());
        let registry = Arc::new(ToolRegistry::with_builtin_tools());
        let engine = Arc::new(WorkflowEngine::new(default_stages(
            Arc::clone(&index) as Arc<dyn VectorIndex>,
            Arc::clone(&registry),
        )));
        Ok(Self {
            engine,
            ingestor: Arc::new(Ingestor::new(Arc::clone(&index))),
            index,
            registry,
            history: Arc::new(ConversationHistory::new(HISTORY_CAPACITY)),
            metrics: Arc::new(metrics::ApiMetrics::new()?),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/ask", post(handlers::ask))
        .route("/v1/search", post(handlers::search))
        .route("/v1/ingest", post(handlers::ingest))
        .route("/v1/tools", get(handlers::list_tools))
        .route("/v1/tools/call", post(handlers::call_tool))
        .route("/v1/history", get(handlers::history))
        .route("/v1/history/{conversation_id}", get(handlers::get_conversation))
        .route("/v1/health", get(handlers::health))
        .route("/v1/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(addr: &str) {
    let state = AppState::new().expect("Failed to build application state");
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Sentinel API listening on {}", addr);
    axum::serve(listener, app).await.expect("Server error");
}
