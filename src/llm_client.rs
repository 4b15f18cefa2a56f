use std::env;
use std::sync::Arc;

use anyhow::Context;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client as AsyncOpenAiClient};
use async_trait::async_trait;
use tracing::instrument;

pub type SharedLlmClient = Arc<dyn LlmClient>;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Offline stand-in that never reaches a model. It never emits the completion
/// marker, so a run against it ends at the step ceiling.
#[derive(Debug, Default, Clone)]
pub struct EchoLlmClient;

#[async_trait]
impl LlmClient for EchoLlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let persona = system
            .lines()
            .find_map(|line| line.strip_prefix("Role instructions:"))
            .and_then(|rest| rest.split('.').next())
            .map(str::trim)
            .unwrap_or("an assistant");
        let last_line = prompt.lines().rev().find(|line| !line.trim().is_empty());
        Ok(format!(
            "[offline response]\n{persona}.\nLast thing I read: {}",
            last_line.unwrap_or("").trim()
        ))
    }
}

impl EchoLlmClient {
    pub fn shared() -> SharedLlmClient {
        Arc::new(Self)
    }
}

/// OpenAI-compatible client that can point at OpenAI, vLLM, or any HTTP-compatible backend.
pub struct OpenAiLlmClient {
    client: AsyncOpenAiClient<OpenAIConfig>,
    model: String,
}

impl OpenAiLlmClient {
    const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn shared_from_env() -> anyhow::Result<SharedLlmClient> {
        let client = Self::from_env()?;
        Ok(Arc::new(client))
    }

    fn from_env() -> anyhow::Result<Self> {
        let config = Self::build_config_from_env()?;
        let model =
            env::var("CAMPAIGN_LLM_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        Ok(Self {
            client: AsyncOpenAiClient::with_config(config),
            model,
        })
    }

    fn build_config_from_env() -> anyhow::Result<OpenAIConfig> {
        let api_key = env::var("OPENAI_API_KEY")
            .or_else(|_| env::var("CAMPAIGN_OPENAI_API_KEY"))
            .context("Set OPENAI_API_KEY (or CAMPAIGN_OPENAI_API_KEY) to use the OpenAI client")?;

        let mut config = OpenAIConfig::new().with_api_key(api_key);

        if let Ok(base_url) =
            env::var("OPENAI_BASE_URL").or_else(|_| env::var("CAMPAIGN_OPENAI_BASE_URL"))
        {
            config = config.with_api_base(base_url);
        }

        Ok(config)
    }

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn chat(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()?;
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.0)
            .messages(vec![system_message.into(), user_message.into()])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let choice = response
            .choices
            .first()
            .context("LLM response did not contain any choices")?;

        let output = choice
            .message
            .content
            .clone()
            .unwrap_or_else(|| String::from("[empty LLM response]"));

        Ok(output)
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        self.chat(system, prompt).await
    }
}

/// Attempt to build an OpenAI-compatible client, optionally falling back to the echo client.
pub fn build_llm_client_from_env(default_to_echo: bool) -> anyhow::Result<SharedLlmClient> {
    match OpenAiLlmClient::shared_from_env() {
        Ok(client) => Ok(client),
        Err(err) if default_to_echo => {
            tracing::warn!(?err, "Falling back to EchoLlmClient");
            Ok(EchoLlmClient::shared())
        }
        Err(err) => Err(err),
    }
}
