use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;

/// Raw output of one role turn, before the controller attributes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTurn {
    pub content: String,
    /// Whatever name the generation step gave itself. Never trusted for attribution.
    pub self_label: Option<String>,
}

impl AgentTurn {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            self_label: None,
        }
    }

    pub fn labeled(content: impl Into<String>, self_label: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            self_label: Some(self_label.into()),
        }
    }
}

/// A participant that reads the whole transcript and produces the next message.
#[async_trait]
pub trait AgentBehavior: Send + Sync {
    async fn invoke(&self, transcript: &Transcript) -> anyhow::Result<AgentTurn>;
}
