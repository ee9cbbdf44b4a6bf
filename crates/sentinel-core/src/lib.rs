//! Sentinel Core: stage contract, workflow engine, and data model.
//!
//! The pipeline is a bounded state machine over four stages:
//!
//! ```text
//! planning → retrieval → analysis → guard → {complete | human}
//!     ↓          ↓           ↓         ↓
//!   Plan    Documents    Response   Verdict
//! ```
//!
//! Stage implementations live in `sentinel-stages`; this crate owns the
//! contract (`Stage`), the accumulating per-request state
//! (`WorkflowContext`), the engine that drives the loop, and the record
//! types the stages exchange.

pub mod context;
pub mod data_model;
pub mod engine;
pub mod history;
pub mod stage;
pub mod trace;

pub use context::{StageUpdate, WorkflowContext};
pub use data_model::{
    AnalysisResult, DocumentRecord, EstimatedComplexity, FinalResult, GuardResult, Plan,
    RetrievalResult, RetrievalStrategy,
};
pub use engine::{WorkflowEngine, DEFAULT_MAX_STEPS};
pub use history::ConversationHistory;
pub use stage::{agent, Stage, StageError};
pub use trace::{TraceAction, TraceEntry};

/// Engine version reported by the health endpoint.
pub const SENTINEL_VERSION: &str = "0.1.0";
