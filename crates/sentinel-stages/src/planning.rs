//! Planning stage: question reformulation and tool-requirement detection.
use once_cell::sync::Lazy;

use sentinel_core::data_model::{EstimatedComplexity, Plan, RetrievalStrategy};
use sentinel_core::{agent, Stage, StageError, StageUpdate, WorkflowContext};

/// Interrogative words stripped during reformulation.
const INTERROGATIVES: [&str; 7] = ["what", "how", "why", "when", "where", "who", "which"];

/// Ordered keyword table: a tool is required when any of its keywords
/// occurs in the lower-cased question. Output order follows table order.
static TOOL_KEYWORDS: Lazy<Vec<(&'static str, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        ("consultar_cfdi", vec!["cfdi", "factura", "comprobante"]),
        ("validar_rfc", vec!["rfc"]),
        ("calcular_impuestos", vec!["impuesto", "iva", "isr"]),
    ]
});

#[derive(Default)]
pub struct PlanningStage;

impl Stage for PlanningStage {
    fn id(&self) -> &'static str {
        agent::PLANNING
    }

    fn process(&self, ctx: &WorkflowContext) -> Result<StageUpdate, StageError> {
        let plan = Plan {
            original_question: ctx.question.clone(),
            reformulated_query: reformulate(&ctx.question),
            retrieval_strategy: RetrievalStrategy::Semantic,
            requires_tools: detect_required_tools(&ctx.question),
            estimated_complexity: EstimatedComplexity::Standard,
        };
        Ok(StageUpdate {
            plan: Some(plan),
            next_agent: Some(agent::RETRIEVAL.to_string()),
            ..Default::default()
        })
    }
}

/// Lower-case the question, drop every occurrence of an interrogative word
/// followed by a space, and trim. Idempotent; an empty question stays
/// empty.
pub fn reformulate(question: &str) -> String {
    let mut query = question.to_lowercase();
    for word in INTERROGATIVES {
        query = query.replace(&format!("{word} "), "");
    }
    query.trim().to_string()
}

/// Tools the question needs, in table order, each listed once.
pub fn detect_required_tools(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    TOOL_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(tool, _)| (*tool).to_string())
        .collect()
}
