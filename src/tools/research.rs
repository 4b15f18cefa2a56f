use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::Tool;

fn build_http(timeout: Duration, label: &str) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .with_context(|| format!("Failed to build {label} HTTP client"))
}

#[derive(Debug, Deserialize)]
struct TrendsResponse {
    #[serde(default)]
    interest_over_time: Option<InterestOverTime>,
}

#[derive(Debug, Deserialize)]
struct InterestOverTime {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    date: String,
    #[serde(default)]
    values: Vec<TimelineValue>,
}

#[derive(Debug, Deserialize)]
struct TimelineValue {
    #[serde(default)]
    extracted_value: Option<f64>,
}

/// Keyword interest over the last three months, via SerpAPI's Google Trends engine.
pub struct TrendData {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TrendData {
    const DEFAULT_BASE_URL: &'static str = "https://serpapi.com/search.json";
    const TIMEFRAME: &'static str = "today 3-m";

    pub fn new(api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http(timeout, "trends")?,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    fn render(keyword: &str, response: TrendsResponse) -> String {
        let points: Vec<String> = response
            .interest_over_time
            .map(|interest| interest.timeline_data)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|point| {
                let value = point.values.first()?.extracted_value?;
                Some(format!("{}: {}", point.date, value))
            })
            .collect();

        if points.is_empty() {
            return "No trend data found.".to_string();
        }

        format!(
            "Interest over time for '{keyword}' (0-100):\n{}",
            points.join("\n")
        )
    }
}

#[async_trait]
impl Tool for TrendData {
    fn name(&self) -> &'static str {
        "TrendData"
    }

    fn description(&self) -> &'static str {
        "Fetch recent Google Trends data for a given keyword. Input is the keyword as a simple string."
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Set SERPAPI_API_KEY to enable trend lookups"))?;
        let keyword = input.trim();
        if keyword.is_empty() {
            return Err(anyhow!("TrendData needs a keyword"));
        }

        let response: TrendsResponse = self
            .http
            .get(&self.base_url)
            .query(&[
                ("engine", "google_trends"),
                ("data_type", "TIMESERIES"),
                ("date", Self::TIMEFRAME),
                ("q", keyword),
                ("api_key", api_key),
            ])
            .send()
            .await
            .context("Trend request failed")?
            .error_for_status()
            .context("Trend service rejected the request")?
            .json()
            .await
            .context("Trend service returned an unreadable payload")?;

        Ok(Self::render(keyword, response))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Web search for news, reports and customer insight, via the Tavily API.
pub struct DataSearch {
    http: reqwest::Client,
    api_key: Option<String>,
    max_results: usize,
    base_url: String,
}

impl DataSearch {
    const DEFAULT_BASE_URL: &'static str = "https://api.tavily.com/search";

    pub fn new(
        api_key: Option<String>,
        max_results: usize,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http(timeout, "search")?,
            api_key,
            max_results: max_results.max(1),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    fn render(response: SearchResponse) -> String {
        if response.results.is_empty() {
            return "No search results found.".to_string();
        }

        response
            .results
            .iter()
            .map(|hit| format!("- {} ({})\n  {}", hit.title.trim(), hit.url, hit.content.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Tool for DataSearch {
    fn name(&self) -> &'static str {
        "DataSearch"
    }

    fn description(&self) -> &'static str {
        "Use this tool to get relevant data and insights. Input is the search query."
    }

    async fn call(&self, input: &str) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Set TAVILY_API_KEY to enable web search"))?;

        let payload = json!({
            "api_key": api_key,
            "query": input.trim(),
            "max_results": self.max_results,
        });

        let response: SearchResponse = self
            .http
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
            .context("Search request failed")?
            .error_for_status()
            .context("Search service rejected the request")?
            .json()
            .await
            .context("Search service returned an unreadable payload")?;

        Ok(Self::render(response))
    }
}
