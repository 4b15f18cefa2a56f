use anyhow::{anyhow, Context};
use async_trait::async_trait;

use crate::llm_client::SharedLlmClient;

use super::Tool;

/// Summarises a brand guideline document that has already been extracted to text.
/// Pages are separated by form feeds, the way text extractors emit them.
pub struct BrandBookReader {
    llm_client: SharedLlmClient,
}

impl BrandBookReader {
    const MAX_PAGES: usize = 5;
    const SYSTEM: &'static str = "You summarize brand guidelines for a marketing team.";

    pub fn new(llm_client: SharedLlmClient) -> Self {
        Self { llm_client }
    }

    fn leading_pages(text: &str) -> String {
        text.split('\u{c}')
            .take(Self::MAX_PAGES)
            .map(str::trim)
            .filter(|page| !page.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Tool for BrandBookReader {
    fn name(&self) -> &'static str {
        "BrandBookReader"
    }

    fn description(&self) -> &'static str {
        "Read a brand book and get a summarized overview. Input must be the file path string of the extracted text."
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        let path = input.trim();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Error reading brand book at {path}"))?;

        let text = Self::leading_pages(&raw);
        if text.is_empty() {
            return Err(anyhow!("Brand book at {path} is empty"));
        }

        let prompt = format!("Summarize the following brand guideline:\n\n{text}");
        self.llm_client.complete(Self::SYSTEM, &prompt).await
    }
}
