use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The Brand Manager emitted the completion marker.
    Terminated,
    /// The step ceiling ran out first.
    StepCeiling,
}

/// Everything a caller gets back from one campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub transcript: Transcript,
    pub final_artifact: Option<String>,
    pub stop_reason: StopReason,
    pub steps: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CampaignOutcome {
    pub const NO_FINAL_ANSWER: &'static str = "No final answer was generated.";

    /// The proposal, or the explicit no-answer notice.
    pub fn proposal_or_notice(&self) -> &str {
        self.final_artifact
            .as_deref()
            .unwrap_or(Self::NO_FINAL_ANSWER)
    }
}
