use std::fmt;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::agents::{AgentTurn, RoleName, RoleTable, SharedAgent};
use crate::orchestrator::termination;
use crate::transcript::{Author, Transcript};

use super::outcome::{CampaignOutcome, StopReason};

/// Where the conversation goes after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goto {
    Role(RoleName),
    Terminate,
}

impl fmt::Display for Goto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goto::Role(role) => write!(f, "{role}"),
            Goto::Terminate => f.write_str("TERMINATE"),
        }
    }
}

/// Routing produced once per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub goto: Goto,
    pub marker_seen: bool,
}

/// Static transition table. The marker only ends the run when the role holds
/// terminal authority; everyone else hands off as usual.
pub fn route(role: RoleName, marker_seen: bool) -> RoutingDecision {
    let goto = match (role, marker_seen) {
        (RoleName::ContentWriter, _) => Goto::Role(RoleName::GraphicDesigner),
        (RoleName::GraphicDesigner, _) => Goto::Role(RoleName::DataAnalyst),
        (RoleName::DataAnalyst, _) => Goto::Role(RoleName::BrandManager),
        (RoleName::BrandManager, true) => Goto::Terminate,
        (RoleName::BrandManager, false) => Goto::Role(RoleName::ContentWriter),
    };
    debug_assert!(
        match goto {
            Goto::Terminate => marker_seen && role.has_terminal_authority(),
            Goto::Role(next) => next == role.default_next(),
        },
        "transition table disagrees with role defaults"
    );

    RoutingDecision { goto, marker_seen }
}

/// Mutable state of one run. Lives only as long as the request.
#[derive(Debug, Clone)]
pub struct RunState {
    transcript: Transcript,
    current: Option<RoleName>,
    step_count: usize,
    final_artifact: Option<String>,
    started_at: chrono::DateTime<Utc>,
}

impl RunState {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// `None` once the run has terminated.
    #[cfg(test)]
    pub fn current_role(&self) -> Option<RoleName> {
        self.current
    }

    #[cfg(test)]
    pub fn final_artifact(&self) -> Option<&str> {
        self.final_artifact.as_deref()
    }
}

/// Result of a single `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A role ran and handed off to the named role.
    HandedOff { from: RoleName, to: RoleName },
    /// The Brand Manager produced the final proposal.
    Terminated,
    /// Nothing ran because the step ceiling is spent.
    CeilingReached,
}

/// Drives the cyclic handoff between the four campaign roles.
pub struct HandoffController {
    agents: RoleTable<SharedAgent>,
    max_steps: usize,
}

impl HandoffController {
    pub fn new(agents: RoleTable<SharedAgent>, max_steps: usize) -> Self {
        Self { agents, max_steps }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn start(&self, brief: impl Into<String>) -> RunState {
        RunState {
            transcript: Transcript::seeded(brief),
            current: Some(RoleName::INITIAL),
            step_count: 0,
            final_artifact: None,
            started_at: Utc::now(),
        }
    }

    /// Runs exactly one role turn, or none if the run is over.
    #[instrument(skip_all, fields(step = state.step_count + 1))]
    pub async fn advance(&self, state: &mut RunState) -> anyhow::Result<StepOutcome> {
        let Some(role) = state.current else {
            return Ok(StepOutcome::Terminated);
        };
        if state.step_count >= self.max_steps {
            return Ok(StepOutcome::CeilingReached);
        }

        state.step_count += 1;
        let step = state.step_count;
        let turn = self
            .agents
            .get(role)
            .invoke(&state.transcript)
            .await
            .with_context(|| format!("{role} turn failed at step {step}"))?;

        let (author, content) = attribute(role, turn);
        let message = state.transcript.append(author, content);
        let decision = route(role, termination::is_final(message));
        debug!(%role, goto = %decision.goto, marker_seen = decision.marker_seen, "Routing decision");

        match decision.goto {
            Goto::Terminate => {
                state.final_artifact = Some(message.content().to_string());
                state.current = None;
                info!(from = %role, step, "Final proposal received; run terminated");
                Ok(StepOutcome::Terminated)
            }
            Goto::Role(next) => {
                if decision.marker_seen {
                    info!(role = %role, step, "Completion marker ignored for non-terminal role");
                }
                state.current = Some(next);
                Ok(StepOutcome::HandedOff { from: role, to: next })
            }
        }
    }

    /// Drives the loop until termination or the step ceiling.
    pub async fn run(&self, mut state: RunState) -> anyhow::Result<CampaignOutcome> {
        let stop_reason = loop {
            match self.advance(&mut state).await? {
                StepOutcome::HandedOff { from, to } => {
                    info!(%from, %to, step = state.step_count, "Handoff");
                }
                StepOutcome::Terminated => break StopReason::Terminated,
                StepOutcome::CeilingReached => {
                    warn!(
                        max_steps = self.max_steps,
                        "Step ceiling reached without a final proposal"
                    );
                    break StopReason::StepCeiling;
                }
            }
        };

        Ok(CampaignOutcome {
            steps: state.step_count,
            final_artifact: state.final_artifact,
            transcript: state.transcript,
            stop_reason,
            started_at: state.started_at,
            finished_at: Utc::now(),
        })
    }
}

/// Turns a role's raw output into an attributed entry. The role's own label is
/// discarded in favour of its canonical name.
fn attribute(role: RoleName, turn: AgentTurn) -> (Author, String) {
    if let Some(label) = turn.self_label.as_deref() {
        if label != role.canonical_name() {
            debug!(%role, self_label = label, "Relabeling role output");
        }
    }
    (Author::Role(role), turn.content)
}
