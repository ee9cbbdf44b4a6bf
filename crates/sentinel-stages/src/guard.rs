//! Guard stage: policy gate over the candidate response.
//!
//! Evaluation is a pure function of the response text. Two independent
//! flags come out of it: `policy_approved` tracks content safety
//! (sensitive terms only), while `requires_human_review` tracks either
//! safety or operational caution (the length cap).
use serde::{Deserialize, Serialize};

use sentinel_core::data_model::GuardResult;
use sentinel_core::{agent, Stage, StageError, StageUpdate, WorkflowContext};

/// Policy profile the guard evaluates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyProfile {
    /// Case-insensitive substrings that mark a response as unsafe.
    pub sensitive_terms: Vec<String>,
    /// Responses longer than this require human review.
    pub max_response_chars: usize,
}

impl Default for PolicyProfile {
    fn default() -> Self {
        Self {
            sensitive_terms: [
                "password",
                "contraseña",
                "api key",
                "secret key",
                "credit card",
                "tarjeta de crédito",
                "ssn",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_response_chars: 2000,
        }
    }
}

impl PolicyProfile {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

pub struct GuardStage {
    profile: PolicyProfile,
}

impl GuardStage {
    pub fn new() -> Self {
        Self::with_profile(PolicyProfile::default())
    }

    pub fn with_profile(profile: PolicyProfile) -> Self {
        Self { profile }
    }
}

impl Default for GuardStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for GuardStage {
    fn id(&self) -> &'static str {
        agent::GUARD
    }

    fn process(&self, ctx: &WorkflowContext) -> Result<StageUpdate, StageError> {
        let response = ctx
            .analysis
            .as_ref()
            .map(|a| a.response.clone())
            .unwrap_or_default();
        let lowered = response.to_lowercase();

        let mut violations = Vec::new();
        let mut unsafe_content = false;
        for term in &self.profile.sensitive_terms {
            if lowered.contains(&term.to_lowercase()) {
                violations.push(format!("response contains sensitive term \"{term}\""));
                unsafe_content = true;
            }
        }

        let length = response.chars().count();
        if length > self.profile.max_response_chars {
            violations.push(format!(
                "response length {length} exceeds maximum of {} characters",
                self.profile.max_response_chars
            ));
        }

        let requires_human_review = !violations.is_empty();
        let next = if requires_human_review {
            agent::HUMAN
        } else {
            agent::COMPLETE
        };

        let guard = GuardResult {
            policy_approved: !unsafe_content,
            policy_violations: violations,
            requires_human_review,
            // No active redaction in scope; the response passes unchanged.
            modified_response: response,
        };
        Ok(StageUpdate {
            guard: Some(guard),
            next_agent: Some(next.to_string()),
            ..Default::default()
        })
    }
}
