//! Workflow engine: bounded state machine over the stage dispatch table.
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::context::WorkflowContext;
use crate::data_model::FinalResult;
use crate::stage::{agent, Stage};
use crate::trace::TraceEntry;

/// Step budget applied when none is configured. Guarantees liveness even
/// when a stage keeps naming itself as `next_agent`.
pub const DEFAULT_MAX_STEPS: u32 = 10;

/// Drives one request through the stage pipeline.
///
/// The engine owns the dispatch table (stage id → implementation), the
/// trace, and the step budget. Each run starts at `planning` and ends at
/// `complete`, at `human`, on a stage fault, or when the budget runs out.
pub struct WorkflowEngine {
    stages: HashMap<&'static str, Box<dyn Stage>>,
    max_steps: u32,
}

impl WorkflowEngine {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self::with_max_steps(stages, DEFAULT_MAX_STEPS)
    }

    pub fn with_max_steps(stages: Vec<Box<dyn Stage>>, max_steps: u32) -> Self {
        let stages = stages.into_iter().map(|s| (s.id(), s)).collect();
        Self { stages, max_steps }
    }

    /// Process one request end to end.
    ///
    /// Never fails: stage faults are caught here, recorded in the trace,
    /// and the run ends with a best-effort result built from whatever the
    /// context holds at halt time.
    pub async fn run(&self, mut ctx: WorkflowContext) -> FinalResult {
        let started = Instant::now();
        let mut trace: Vec<TraceEntry> = Vec::new();
        let mut current = agent::PLANNING.to_string();
        let mut step: u32 = 0;

        info!(
            conversation_id = %ctx.conversation_id,
            question = %ctx.question,
            "starting workflow run"
        );

        while current != agent::COMPLETE && step < self.max_steps {
            step += 1;

            if current == agent::HUMAN {
                info!(conversation_id = %ctx.conversation_id, step, "halting for human review");
                trace.push(TraceEntry::human_review(step));
                break;
            }

            let Some(stage) = self.stages.get(current.as_str()) else {
                warn!(conversation_id = %ctx.conversation_id, agent = %current, "unknown agent, halting");
                trace.push(TraceEntry::error(
                    step,
                    &current,
                    format!("unknown agent: {current}"),
                ));
                break;
            };

            match stage.process(&ctx) {
                Ok(update) => {
                    let next = update
                        .next_agent
                        .clone()
                        .unwrap_or_else(|| agent::COMPLETE.to_string());
                    ctx.merge(update);
                    trace.push(TraceEntry::processed(step, &current));
                    debug!(
                        conversation_id = %ctx.conversation_id,
                        from = %current,
                        to = %next,
                        step,
                        "stage processed"
                    );
                    current = next;
                }
                Err(err) => {
                    warn!(
                        conversation_id = %ctx.conversation_id,
                        agent = %current,
                        error = %err,
                        "stage failed, halting run"
                    );
                    trace.push(TraceEntry::error(step, &current, err.to_string()));
                    break;
                }
            }
        }

        self.finalize(ctx, trace, started)
    }

    fn finalize(&self, ctx: WorkflowContext, trace: Vec<TraceEntry>, started: Instant) -> FinalResult {
        let (analysis_response, tool_results, sources, confidence) = match ctx.analysis {
            Some(analysis) => (
                analysis.response,
                analysis.tool_results,
                analysis.sources,
                analysis.confidence,
            ),
            None => (String::new(), BTreeMap::new(), Vec::new(), 0.0),
        };

        // The guard may substitute the response; when it never ran, the
        // analysis text (possibly empty) stands.
        let (response, requires_human_review) = match ctx.guard {
            Some(guard) => (guard.modified_response, guard.requires_human_review),
            None => (analysis_response, false),
        };

        FinalResult {
            conversation_id: ctx.conversation_id,
            question: ctx.question,
            response,
            sources,
            tool_results,
            confidence,
            requires_human_review,
            trace,
            processing_ms: started.elapsed().as_millis() as u64,
        }
    }
}
