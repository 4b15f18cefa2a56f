pub mod brand_book;
pub mod copy;
pub mod design;
pub mod research;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, warn};

pub use brand_book::BrandBookReader;
pub use copy::{CopyInspo, RewriteTone};
pub use design::{FontSuggester, PaletteGenerator};
pub use research::{DataSearch, TrendData};

/// A callable a role may use during its turn. Takes one text argument.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn call(&self, input: &str) -> anyhow::Result<String>;
}

pub type SharedTool = Arc<dyn Tool>;

/// A role's capability set. Calls through here never fail: errors, unknown
/// names and timeouts come back as `Error: ...` text for the role to narrate.
#[derive(Clone)]
pub struct ToolSet {
    tools: Vec<SharedTool>,
    timeout: Duration,
}

impl ToolSet {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools: Vec::new(),
            timeout,
        }
    }

    pub fn with_tool<T>(mut self, tool: T) -> Self
    where
        T: Tool + 'static,
    {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Bullet list of tools for prompt rendering.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn find(&self, name: &str) -> Option<&SharedTool> {
        let wanted = name.trim();
        self.tools
            .iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(wanted))
    }

    #[instrument(skip(self, input), fields(input_len = input.len()))]
    pub async fn call(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.find(name) else {
            warn!(tool = name, "Role requested a tool outside its capability set");
            return format!(
                "Error: unknown tool '{name}'. Available tools: {}",
                self.names().join(", ")
            );
        };

        match tokio::time::timeout(self.timeout, tool.call(input)).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                warn!(?err, tool = tool.name(), "Tool call failed");
                format!("Error: {err:#}")
            }
            Err(_) => {
                warn!(
                    tool = tool.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Tool call timed out"
                );
                format!(
                    "Error: {} timed out after {} ms",
                    tool.name(),
                    self.timeout.as_millis()
                )
            }
        }
    }
}

/// Lookup key normalisation shared by the table-backed tools.
pub(crate) fn normalize_key(input: &str) -> String {
    input.trim().to_lowercase()
}
