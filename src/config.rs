use std::env;
use std::time::Duration;

use anyhow::bail;

/// Runtime knobs for a campaign run, resolved from the environment.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub max_steps: usize,
    pub tool_timeout_ms: u64,
    pub max_tool_rounds: usize,
    pub search_max_results: usize,
    pub tavily_api_key: Option<String>,
    pub serpapi_api_key: Option<String>,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            max_steps: Self::DEFAULT_MAX_STEPS,
            tool_timeout_ms: 20_000,
            max_tool_rounds: 3,
            search_max_results: 2,
            tavily_api_key: None,
            serpapi_api_key: None,
        }
    }
}

impl CampaignConfig {
    pub const DEFAULT_MAX_STEPS: usize = 50;

    const MAX_STEPS_VARS: [&'static str; 1] = ["CAMPAIGN_MAX_STEPS"];
    const TOOL_TIMEOUT_VARS: [&'static str; 1] = ["CAMPAIGN_TOOL_TIMEOUT_MS"];
    const TOOL_ROUNDS_VARS: [&'static str; 1] = ["CAMPAIGN_MAX_TOOL_ROUNDS"];
    const SEARCH_RESULTS_VARS: [&'static str; 1] = ["CAMPAIGN_SEARCH_MAX_RESULTS"];
    const TAVILY_KEY_VARS: [&'static str; 1] = ["TAVILY_API_KEY"];
    const SERPAPI_KEY_VARS: [&'static str; 2] = ["SERPAPI_API_KEY", "SERPAPI_KEY"];

    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            max_steps: Self::read_parsed(&Self::MAX_STEPS_VARS)?.unwrap_or(defaults.max_steps),
            tool_timeout_ms: Self::read_parsed(&Self::TOOL_TIMEOUT_VARS)?
                .unwrap_or(defaults.tool_timeout_ms),
            max_tool_rounds: Self::read_parsed(&Self::TOOL_ROUNDS_VARS)?
                .unwrap_or(defaults.max_tool_rounds),
            search_max_results: Self::read_parsed(&Self::SEARCH_RESULTS_VARS)?
                .unwrap_or(defaults.search_max_results),
            tavily_api_key: Self::read_env(&Self::TAVILY_KEY_VARS),
            serpapi_api_key: Self::read_env(&Self::SERPAPI_KEY_VARS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_steps == 0 {
            bail!("Step ceiling must allow at least one agent turn");
        }
        if self.tool_timeout_ms == 0 {
            bail!("Tool timeout must be greater than zero");
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    fn read_env(candidates: &[&'static str]) -> Option<String> {
        first_non_blank(candidates, |key| env::var(key).ok())
    }

    fn read_parsed<T>(candidates: &[&'static str]) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = Self::read_env(candidates) else {
            return Ok(None);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(err) => bail!("Invalid value '{raw}' for {}: {err}", candidates[0]),
        }
    }
}

/// First candidate whose value is set and not blank. A blank earlier alias does
/// not hide a later one.
fn first_non_blank<F>(candidates: &[&str], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    candidates
        .iter()
        .filter_map(|key| lookup(*key))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = CampaignConfig::default();
        assert_eq!(config.max_steps, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_step_ceiling_is_rejected() {
        let config = CampaignConfig::default().with_max_steps(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn tool_timeout_converts_to_duration() {
        let config = CampaignConfig {
            tool_timeout_ms: 1_500,
            ..CampaignConfig::default()
        };
        assert_eq!(config.tool_timeout(), Duration::from_millis(1_500));
    }

    #[test]
    fn blank_alias_falls_through_to_the_next_one() {
        let vars = HashMap::from([("SERPAPI_API_KEY", "  "), ("SERPAPI_KEY", "serp-123")]);
        let value = first_non_blank(&CampaignConfig::SERPAPI_KEY_VARS, |key| {
            vars.get(key).map(|value| value.to_string())
        });
        assert_eq!(value.as_deref(), Some("serp-123"));
    }

    #[test]
    fn unset_and_blank_candidates_read_as_none() {
        let vars = HashMap::from([("CAMPAIGN_MAX_STEPS", "")]);
        let value = first_non_blank(&["CAMPAIGN_MAX_STEPS", "UNSET"], |key| {
            vars.get(key).map(|value| value.to_string())
        });
        assert!(value.is_none());
    }

    #[test]
    fn step_ceiling_reads_only_the_prefixed_name() {
        assert_eq!(CampaignConfig::MAX_STEPS_VARS, ["CAMPAIGN_MAX_STEPS"]);
        assert_eq!(CampaignConfig::TOOL_TIMEOUT_VARS, ["CAMPAIGN_TOOL_TIMEOUT_MS"]);
    }
}
