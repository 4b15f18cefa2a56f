use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::llm_client::SharedLlmClient;

use super::Tool;

#[derive(Debug, Deserialize)]
struct RewriteToneInput {
    #[serde(default)]
    text: String,
    #[serde(default)]
    product_description: String,
    #[serde(default)]
    target_audience: String,
}

/// Picks a tone for the product and audience, then rewrites copy in it.
pub struct RewriteTone {
    llm_client: SharedLlmClient,
}

impl RewriteTone {
    const SYSTEM: &'static str = "You are a tone analyst and copywriter.";

    pub fn new(llm_client: SharedLlmClient) -> Self {
        Self { llm_client }
    }

    fn compose_prompt(input: &RewriteToneInput) -> String {
        format!(
            "1. Decide the appropriate tone (bold, minimalist, emotional, fun, luxurious, etc.) based on the product and target audience.\n\
             2. Rewrite the given copy in the decided tone.\n\n\
             Product: {product}\n\
             Target Audience: {audience}\n\n\
             Original Copy:\n{text}\n\n\
             Return only the rewritten copy.",
            product = input.product_description.trim(),
            audience = input.target_audience.trim(),
            text = input.text.trim(),
        )
    }
}

#[async_trait]
impl Tool for RewriteTone {
    fn name(&self) -> &'static str {
        "RewriteTone"
    }

    fn description(&self) -> &'static str {
        "Rewrite text for the campaign. Input must be a JSON string: {\"text\": ..., \"product_description\": ..., \"target_audience\": ...}"
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        let parsed: RewriteToneInput =
            serde_json::from_str(input.trim()).context("RewriteTone input must be a JSON object")?;
        let prompt = Self::compose_prompt(&parsed);
        self.llm_client.complete(Self::SYSTEM, &prompt).await
    }
}

#[derive(Debug, Deserialize)]
struct WikiquoteResponse {
    #[serde(default)]
    query: Option<WikiquoteQuery>,
}

#[derive(Debug, Deserialize)]
struct WikiquoteQuery {
    #[serde(default)]
    search: Vec<WikiquoteHit>,
}

#[derive(Debug, Deserialize)]
struct WikiquoteHit {
    #[serde(default)]
    snippet: String,
}

/// Fetches short advertising quotes from Wikiquote search.
pub struct CopyInspo {
    http: reqwest::Client,
    base_url: String,
}

impl CopyInspo {
    const DEFAULT_BASE_URL: &'static str = "https://en.wikiquote.org/w/api.php";
    const MAX_QUOTE_CHARS: usize = 180;
    const MAX_QUOTES: usize = 3;

    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Wikiquote HTTP client")?;

        Ok(Self {
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    fn pick_quotes(hits: Vec<WikiquoteHit>) -> Vec<String> {
        hits.into_iter()
            .map(|hit| strip_markup(&hit.snippet))
            .filter(|quote| !quote.is_empty() && quote.chars().count() < Self::MAX_QUOTE_CHARS)
            .take(Self::MAX_QUOTES)
            .collect()
    }
}

#[async_trait]
impl Tool for CopyInspo {
    fn name(&self) -> &'static str {
        "CopyInspo"
    }

    fn description(&self) -> &'static str {
        "Fetch catchy advertising quotes. Input must be the product/topic string."
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        let search = format!("{} advertising", input.trim());
        let response: WikiquoteResponse = self
            .http
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srlimit", "10"),
                ("srsearch", search.as_str()),
            ])
            .send()
            .await
            .context("Error fetching quotes")?
            .error_for_status()
            .context("Error fetching quotes")?
            .json()
            .await
            .context("Wikiquote returned an unreadable payload")?;

        let hits = response.query.map(|query| query.search).unwrap_or_default();
        let quotes = Self::pick_quotes(hits);
        if quotes.is_empty() {
            return Ok("No good quotes found.".to_string());
        }

        Ok(quotes
            .iter()
            .map(|quote| format!("- {quote}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Drops HTML tags and decodes the handful of entities search snippets use.
fn strip_markup(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
