//! Sentinel Stages: the pipeline's stage implementations.
//!
//! Each stage is small and deterministic; anything with side effects
//! (search, tool execution) goes through an injected collaborator.
//!
//! # Pipeline Flow
//!
//! ```text
//! question → planning → retrieval → analysis → guard → {complete | human}
//!               ↓           ↓           ↓         ↓
//!             Plan      Documents   Response   Verdict
//! ```

mod analysis;
mod guard;
mod planning;
mod retrieval;

pub use analysis::{score_confidence, synthesize_response, AnalysisStage};
pub use guard::{GuardStage, PolicyProfile};
pub use planning::{detect_required_tools, reformulate, PlanningStage};
pub use retrieval::{RetrievalStage, DEFAULT_K};

use std::sync::Arc;

use sentinel_core::Stage;
use sentinel_index::VectorIndex;
use sentinel_tools::ToolRegistry;

/// The default stage set in pipeline order:
/// `planning → retrieval → analysis → guard`.
pub fn default_stages(
    index: Arc<dyn VectorIndex>,
    registry: Arc<ToolRegistry>,
) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(PlanningStage),
        Box::new(RetrievalStage::new(index)),
        Box::new(AnalysisStage::new(registry)),
        Box::new(GuardStage::new()),
    ]
}
