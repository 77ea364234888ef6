use anyhow::Context;
use serde::Serialize;
use tracing::{info, instrument};

use super::model::{Plan, PlanBody};
use crate::generation::TextGenerator;

#[derive(Debug, Serialize)]
pub struct PlanAnalysis<S> {
    pub summary: S,
    pub feedback: String,
}

/// Aggregates the plan and asks the generator for a critique. A generator
/// failure is returned unchanged; nothing is retried.
#[instrument(skip(generator, plan), fields(plan_id = %plan.id, kind = D::LABEL))]
pub async fn analyze<D: PlanBody>(
    generator: &dyn TextGenerator,
    plan: &Plan<D>,
) -> anyhow::Result<PlanAnalysis<D::Summary>> {
    let summary = plan.days.summarize();
    let prompt = D::prompt(&plan.title, &summary);
    let feedback = generator
        .generate(&prompt)
        .await
        .with_context(|| format!("{} analysis failed", D::LABEL))?;
    info!(chars = feedback.len(), "plan analysed");
    Ok(PlanAnalysis { summary, feedback })
}
