use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::CampaignConfig;
use crate::llm_client::SharedLlmClient;
use crate::tools::{
    BrandBookReader, CopyInspo, DataSearch, FontSuggester, PaletteGenerator, RewriteTone,
    ToolSet, TrendData,
};
use crate::transcript::Transcript;

use super::roles::{RoleName, RoleTable};
use super::traits::{AgentBehavior, AgentTurn};

pub type SharedAgent = Arc<dyn AgentBehavior>;

const PREAMBLE: &str = "You are a helpful AI assistant collaborating with other assistants. Use your expertise to advance the campaign design. If you or any colleague have the final campaign proposal, prefix your response with FINAL ANSWER so the team stops.";

const TOOL_PREFIX: &str = "TOOL:";

fn role_directive(role: RoleName) -> &'static str {
    match role {
        RoleName::ContentWriter => "You are the Content Writer. Analyze the product and audience. Generate creative ideas for slogans, tone, and copy. Do NOT plan the full campaign.",
        RoleName::GraphicDesigner => "You are the Graphic Designer. Propose visual themes, color schemes, and layout ideas for the campaign. If you disagree with a proposal (e.g., you prefer a minimalist look), state your reasoning.",
        RoleName::DataAnalyst => "You are the Data Analyst. Validate the marketing campaign using real-world data.\n\nInstructions:\n- Use data to validate whether the proposed campaign matches customer interest.\n- If the campaign idea seems weak based on data, suggest improvements politely.\n- Only provide factual validation or corrections. Do NOT rewrite or replan the entire campaign.\n\nPass your findings to the Brand Manager after validation.",
        RoleName::BrandManager => "You are the Brand Manager. You must evaluate and finalize the campaign. Structure your FINAL ANSWER with these sections:\n- Campaign Name\n- Executive Summary\n- Target Audience\n- Strategy\n- Content Plan\n- Creative Execution (include visual theme and color scheme)\n- Budget\n- Key Messages\n- Influencers\n- Timeline\n- Creative Concepts\n- Landing Page\n- KPIs\n\nOutput a clean, organized campaign plan with clear headings.",
    }
}

/// Builds the static instruction prompt for a role, including its tool protocol.
pub fn instruction_prompt(role: RoleName, tools: &ToolSet) -> String {
    let mut prompt = format!("{PREAMBLE}\nRole instructions: {}", role_directive(role));

    if !tools.is_empty() {
        prompt.push_str("\n\nYou have access to these tools:\n");
        prompt.push_str(&tools.describe());
        prompt.push_str(&format!(
            "\n\nTo call a tool, respond exactly with: {TOOL_PREFIX}<ToolName> <input> and nothing else. \
             The result will be shared with you before you write your contribution."
        ));
    }

    prompt
}

#[derive(Debug, PartialEq, Eq)]
struct ToolRequest<'a> {
    name: &'a str,
    input: &'a str,
}

/// Finds the first line opening with a `TOOL:<Name> <input>` directive. Everything
/// after the name is the input, so multi-line JSON arguments survive.
fn parse_tool_request(reply: &str) -> Option<ToolRequest<'_>> {
    let mut line_start = 0;
    let idx = reply.split_inclusive('\n').find_map(|line| {
        let body = line.trim_start();
        let at = line_start + (line.len() - body.len());
        line_start += line.len();
        body.starts_with(TOOL_PREFIX).then_some(at)
    })?;

    let rest = reply[idx + TOOL_PREFIX.len()..].trim_start();
    let (name, input) = match rest.split_once(char::is_whitespace) {
        Some((name, input)) => (name, input.trim()),
        None => (rest.trim(), ""),
    };

    (!name.is_empty()).then_some(ToolRequest { name, input })
}

/// LLM-backed campaign role with a fixed prompt and capability set.
pub struct CampaignAgent {
    role: RoleName,
    llm_client: SharedLlmClient,
    tools: ToolSet,
    instructions: String,
    max_tool_rounds: usize,
}

impl CampaignAgent {
    pub fn new(
        role: RoleName,
        llm_client: SharedLlmClient,
        tools: ToolSet,
        max_tool_rounds: usize,
    ) -> Self {
        let instructions = instruction_prompt(role, &tools);
        Self {
            role,
            llm_client,
            tools,
            instructions,
            max_tool_rounds,
        }
    }

    fn compose_prompt(
        &self,
        transcript: &Transcript,
        scratchpad: &[String],
        tools_closed: bool,
    ) -> String {
        let mut prompt = String::from("Conversation so far:\n");
        prompt.push_str(&transcript.render());

        if !scratchpad.is_empty() {
            prompt.push_str("\n\nYour tool results this turn:\n");
            prompt.push_str(&scratchpad.join("\n\n"));
        }

        if tools_closed {
            prompt.push_str(&format!(
                "\n\nTools are no longer available this turn. Do not reply with {TOOL_PREFIX}; \
                 use what you already have."
            ));
        }

        prompt.push_str(&format!(
            "\n\nWrite your contribution as the {}.",
            self.role.canonical_name()
        ));
        prompt
    }
}

#[async_trait]
impl AgentBehavior for CampaignAgent {
    #[instrument(skip_all, fields(role = %self.role, transcript_len = transcript.len()))]
    async fn invoke(&self, transcript: &Transcript) -> anyhow::Result<AgentTurn> {
        let mut scratchpad = Vec::new();
        let mut rounds = 0;
        let mut tools_closed = false;

        loop {
            let prompt = self.compose_prompt(transcript, &scratchpad, tools_closed);
            let reply = self.llm_client.complete(&self.instructions, &prompt).await?;

            let Some(request) = parse_tool_request(&reply) else {
                return Ok(AgentTurn::labeled(reply, "assistant"));
            };

            // A directive must never reach the transcript as the role's contribution.
            if tools_closed {
                bail!(
                    "{} kept requesting {} after its tool budget was spent",
                    self.role,
                    request.name
                );
            }
            if rounds >= self.max_tool_rounds || self.tools.is_empty() {
                info!(tool = request.name, rounds, "Tool budget spent; asking for a contribution");
                tools_closed = true;
                continue;
            }

            info!(tool = request.name, round = rounds + 1, "Role requested a tool");
            let output = self.tools.call(request.name, request.input).await;
            debug!(tool = request.name, output_len = output.len(), "Tool returned");
            scratchpad.push(format!("Tool {} returned:\n{}", request.name, output));
            rounds += 1;
        }
    }
}

fn tools_for(
    role: RoleName,
    llm_client: &SharedLlmClient,
    config: &CampaignConfig,
) -> anyhow::Result<ToolSet> {
    let timeout = config.tool_timeout();
    let tools = match role {
        RoleName::ContentWriter => ToolSet::new(timeout)
            .with_tool(RewriteTone::new(llm_client.clone()))
            .with_tool(CopyInspo::new(timeout)?),
        RoleName::GraphicDesigner => ToolSet::new(timeout)
            .with_tool(PaletteGenerator)
            .with_tool(FontSuggester),
        RoleName::DataAnalyst => ToolSet::new(timeout)
            .with_tool(TrendData::new(config.serpapi_api_key.clone(), timeout)?)
            .with_tool(DataSearch::new(
                config.tavily_api_key.clone(),
                config.search_max_results,
                timeout,
            )?),
        RoleName::BrandManager => {
            ToolSet::new(timeout).with_tool(BrandBookReader::new(llm_client.clone()))
        }
    };
    Ok(tools)
}

/// Wires every role with its own capability set.
pub fn build_crew(
    llm_client: SharedLlmClient,
    config: &CampaignConfig,
) -> anyhow::Result<RoleTable<SharedAgent>> {
    RoleTable::try_from_fn(|role| {
        let tools = tools_for(role, &llm_client, config)?;
        let agent: SharedAgent = Arc::new(CampaignAgent::new(
            role,
            llm_client.clone(),
            tools,
            config.max_tool_rounds,
        ));
        Ok(agent)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmClient;
    use crate::transcript::Author;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned replies and records every prompt it was given.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
            self.prompts
                .lock()
                .expect("lock")
                .push((system.to_string(), prompt.to_string()));
            self.replies
                .lock()
                .expect("lock")
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    fn designer_tools() -> ToolSet {
        ToolSet::new(Duration::from_secs(1))
            .with_tool(PaletteGenerator)
            .with_tool(FontSuggester)
    }

    #[test]
    fn tool_request_parses_name_and_multiline_input() {
        let reply = "TOOL:RewriteTone {\"text\": \"hi\",\n \"target_audience\": \"students\"}";
        let request = parse_tool_request(reply).expect("directive present");
        assert_eq!(request.name, "RewriteTone");
        assert_eq!(request.input, "{\"text\": \"hi\",\n \"target_audience\": \"students\"}");
    }

    #[test]
    fn tool_prefix_mid_sentence_is_not_a_request() {
        assert!(parse_tool_request("I considered TOOL:PaletteGenerator but skipped it").is_none());
        assert!(parse_tool_request("Ideas first.\nTOOL:PaletteGenerator calm").is_some());
        assert!(parse_tool_request("TOOL:").is_none());
    }

    #[test]
    fn directive_on_a_later_line_is_found_past_a_mention() {
        let request = parse_tool_request("Avoid TOOL: spam.\n  TOOL:PaletteGenerator calm")
            .expect("second line is a directive");
        assert_eq!(request.name, "PaletteGenerator");
        assert_eq!(request.input, "calm");
    }

    #[test]
    fn instruction_prompt_lists_tools_and_role() {
        let prompt = instruction_prompt(RoleName::GraphicDesigner, &designer_tools());
        assert!(prompt.starts_with(PREAMBLE));
        assert!(prompt.contains("Role instructions: You are the Graphic Designer."));
        assert!(prompt.contains("- PaletteGenerator:"));
        assert!(prompt.contains("- FontSuggester:"));
    }

    #[test]
    fn brand_manager_prompt_demands_final_answer_sections() {
        let prompt = instruction_prompt(RoleName::BrandManager, &ToolSet::new(Duration::from_secs(1)));
        assert!(prompt.contains("Structure your FINAL ANSWER"));
        assert!(prompt.contains("- KPIs"));
        assert!(!prompt.contains("You have access to these tools"));
    }

    #[tokio::test]
    async fn tool_results_fold_into_content_not_transcript() {
        let llm = ScriptedLlm::new(&[
            "TOOL:PaletteGenerator calm",
            "Use a calm palette: #A8DADC, #457B9D, #1D3557.",
        ]);
        let agent = CampaignAgent::new(RoleName::GraphicDesigner, llm.clone(), designer_tools(), 3);
        let mut transcript = Transcript::seeded("Create a marketing campaign for a SmartBottle.");
        transcript.append(Author::Role(RoleName::ContentWriter), "Slogan: Sip smarter.");

        let turn = agent.invoke(&transcript).await.expect("turn succeeds");

        assert_eq!(turn.content, "Use a calm palette: #A8DADC, #457B9D, #1D3557.");
        assert_eq!(transcript.len(), 2);
        let prompts = llm.prompts.lock().expect("lock");
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].1.contains("Tool PaletteGenerator returned:\n#A8DADC, #457B9D, #1D3557"));
        assert!(prompts[1].1.contains("ContentWriter: Slogan: Sip smarter."));
    }

    #[tokio::test]
    async fn tool_rounds_are_bounded() {
        let llm = ScriptedLlm::new(&[
            "TOOL:PaletteGenerator calm",
            "TOOL:FontSuggester modern",
            "TOOL:PaletteGenerator bold",
            "Visual theme: bold primaries on white.",
        ]);
        let agent = CampaignAgent::new(RoleName::GraphicDesigner, llm.clone(), designer_tools(), 2);

        let turn = agent
            .invoke(&Transcript::seeded("brief"))
            .await
            .expect("turn succeeds");

        assert_eq!(turn.content, "Visual theme: bold primaries on white.");
        assert!(parse_tool_request(&turn.content).is_none());
        let prompts = llm.prompts.lock().expect("lock");
        assert_eq!(prompts.len(), 4);
        assert!(prompts[3].1.contains("Tools are no longer available this turn."));
        assert!(!prompts[2].1.contains("Tools are no longer available this turn."));
    }

    #[tokio::test]
    async fn role_that_keeps_requesting_tools_fails_its_turn() {
        let llm = ScriptedLlm::new(&[
            "TOOL:PaletteGenerator calm",
            "TOOL:PaletteGenerator calm",
            "TOOL:PaletteGenerator calm",
            "TOOL:PaletteGenerator calm",
        ]);
        let agent = CampaignAgent::new(RoleName::ContentWriter, llm.clone(), designer_tools(), 2);

        let err = agent
            .invoke(&Transcript::seeded("brief"))
            .await
            .expect_err("directive never becomes content");

        assert!(err
            .to_string()
            .contains("ContentWriter kept requesting PaletteGenerator"));
        assert_eq!(llm.prompts.lock().expect("lock").len(), 4);
    }

    #[tokio::test]
    async fn zero_tool_budget_asks_for_contribution_without_calling() {
        let llm = ScriptedLlm::new(&["TOOL:FontSuggester modern", "Typography: Futura headlines."]);
        let agent = CampaignAgent::new(RoleName::GraphicDesigner, llm.clone(), designer_tools(), 0);

        let turn = agent
            .invoke(&Transcript::seeded("brief"))
            .await
            .expect("turn succeeds");

        assert_eq!(turn.content, "Typography: Futura headlines.");
        let prompts = llm.prompts.lock().expect("lock");
        assert!(!prompts[1].1.contains("Tool FontSuggester returned"));
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let llm = ScriptedLlm::new(&[]);
        let agent = CampaignAgent::new(RoleName::DataAnalyst, llm, ToolSet::new(Duration::from_secs(1)), 3);

        let err = agent
            .invoke(&Transcript::seeded("brief"))
            .await
            .expect_err("empty script fails");
        assert!(err.to_string().contains("script exhausted"));
    }

    #[test]
    fn each_role_gets_its_own_capability_set() {
        let llm = crate::llm_client::EchoLlmClient::shared();
        let config = CampaignConfig::default();
        let names = |role| tools_for(role, &llm, &config).expect("tools build").names();

        assert_eq!(names(RoleName::ContentWriter), vec!["RewriteTone", "CopyInspo"]);
        assert_eq!(names(RoleName::GraphicDesigner), vec!["PaletteGenerator", "FontSuggester"]);
        assert_eq!(names(RoleName::DataAnalyst), vec!["TrendData", "DataSearch"]);
        assert_eq!(names(RoleName::BrandManager), vec!["BrandBookReader"]);
        assert!(build_crew(llm.clone(), &config).is_ok());
    }
}
