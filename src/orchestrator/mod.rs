pub mod controller;
pub mod outcome;
pub mod termination;

use tracing::{info, instrument};

pub use controller::HandoffController;
pub use outcome::{CampaignOutcome, StopReason};

/// Seeds a transcript with the brief and drives the controller to completion.
#[instrument(skip_all, fields(brief_len = brief.len(), max_steps = controller.max_steps()))]
pub async fn run_campaign(
    controller: &HandoffController,
    brief: &str,
) -> anyhow::Result<CampaignOutcome> {
    let state = controller.start(brief);
    let outcome = controller.run(state).await?;

    info!(
        steps = outcome.steps,
        role_messages = outcome.transcript.role_messages().count(),
        stop_reason = ?outcome.stop_reason,
        has_proposal = outcome.final_artifact.is_some(),
        elapsed_ms = (outcome.finished_at - outcome.started_at).num_milliseconds(),
        "Campaign run finished"
    );

    Ok(outcome)
}
