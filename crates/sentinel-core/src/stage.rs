//! Stage trait: the single contract every pipeline stage implements.
use thiserror::Error;

use crate::context::{StageUpdate, WorkflowContext};

/// Well-known stage identifiers used by the engine's dispatch table.
pub mod agent {
    pub const PLANNING: &str = "planning";
    pub const RETRIEVAL: &str = "retrieval";
    pub const ANALYSIS: &str = "analysis";
    pub const GUARD: &str = "guard";
    /// Terminal marker: the run finished normally.
    pub const COMPLETE: &str = "complete";
    /// Terminal marker: the run halts for asynchronous human review.
    pub const HUMAN: &str = "human";
}

/// One step of the orchestration pipeline.
///
/// A stage reads the accumulated context and produces a partial update
/// plus the identifier of the stage that should run next. Stages must not
/// hold per-request state; the same instance serves concurrent runs.
pub trait Stage: Send + Sync {
    /// Unique stage identifier (ex: "planning").
    fn id(&self) -> &'static str;

    /// Process the context, producing a partial update and the next stage.
    fn process(&self, ctx: &WorkflowContext) -> Result<StageUpdate, StageError>;
}

/// Fault raised by a stage. Caught at the engine boundary and recorded in
/// the trace; never escapes `WorkflowEngine::run`.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("STAGE/EXEC: {0}")]
    ExecutionFailed(String),

    #[error("RETRIEVAL/UNAVAILABLE: {0}")]
    RetrievalUnavailable(String),
}
