//! Trace: append-only audit log of stage executions for one run.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::agent;

/// What happened at one step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceAction {
    Processed,
    Error,
    HumanReviewRequired,
}

/// One entry in a run's trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// 1-based step number, incremented once per engine iteration.
    pub step: u32,
    /// Stage identifier that executed (or failed to resolve).
    pub agent: String,
    pub action: TraceAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TraceEntry {
    pub fn processed(step: u32, agent: &str) -> Self {
        Self {
            step,
            agent: agent.to_string(),
            action: TraceAction::Processed,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(step: u32, agent: &str, message: impl Into<String>) -> Self {
        Self {
            step,
            agent: agent.to_string(),
            action: TraceAction::Error,
            error: Some(message.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn human_review(step: u32) -> Self {
        Self {
            step,
            agent: agent::HUMAN.to_string(),
            action: TraceAction::HumanReviewRequired,
            error: None,
            timestamp: Utc::now(),
        }
    }
}
