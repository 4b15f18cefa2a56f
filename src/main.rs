mod agents;
mod campaign;
mod config;
mod llm_client;
mod orchestrator;
mod tools;
mod transcript;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};

use agents::build_crew;
use campaign::CampaignBrief;
use config::CampaignConfig;
use llm_client::build_llm_client_from_env;
use orchestrator::{run_campaign, CampaignOutcome, HandoffController};

#[derive(Parser, Debug)]
#[command(
    name = "campaign-crew",
    about = "Generate a marketing campaign proposal with a content writer, designer, analyst and brand manager"
)]
struct Cli {
    /// Raw campaign brief; skips the form fields entirely.
    #[arg(short, long, conflicts_with_all = ["product", "description", "audience", "region", "budget", "attachment"])]
    brief: Option<String>,

    /// Product name.
    #[arg(long)]
    product: Option<String>,

    /// Product description.
    #[arg(long)]
    description: Option<String>,

    /// Target audience.
    #[arg(long)]
    audience: Option<String>,

    /// Place or region the campaign runs in.
    #[arg(long)]
    region: Option<String>,

    /// Campaign budget in dollars.
    #[arg(long)]
    budget: Option<u64>,

    /// Text file with extra brief material (already extracted from a PDF).
    #[arg(long)]
    attachment: Option<PathBuf>,

    /// Maximum agent turns before the run is stopped.
    #[arg(long)]
    max_steps: Option<usize>,

    /// Use the offline echo model when no LLM credentials are configured.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Print the full outcome as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Cli {
    fn has_form_fields(&self) -> bool {
        self.product.is_some()
            || self.description.is_some()
            || self.audience.is_some()
            || self.region.is_some()
            || self.budget.is_some()
    }

    fn brief_from_flags(&self) -> anyhow::Result<CampaignBrief> {
        let brief = CampaignBrief {
            product_name: self.product.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            target_audience: self.audience.clone().unwrap_or_default(),
            region: self.region.clone().unwrap_or_default(),
            budget: self.budget.unwrap_or(0),
            attachment: None,
        };
        match &self.attachment {
            Some(path) => brief.with_attachment_file(path),
            None => Ok(brief),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let mut config = CampaignConfig::from_env().context("Invalid campaign configuration")?;
    if let Some(max_steps) = cli.max_steps {
        config = config.with_max_steps(max_steps);
        config.validate()?;
    }

    let seed = resolve_brief(&cli)?;

    let llm_client =
        build_llm_client_from_env(cli.offline).context("LLM client initialization failed")?;
    let crew = build_crew(llm_client, &config).context("Failed to assemble campaign roles")?;
    let controller = HandoffController::new(crew, config.max_steps);

    info!(max_steps = config.max_steps, "Starting campaign run");
    let outcome = run_campaign(&controller, &seed).await.map_err(|err| {
        error!(?err, "Campaign run aborted");
        err
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_brief(cli: &Cli) -> anyhow::Result<String> {
    if let Some(raw) = cli.brief.as_deref() {
        if raw.trim().is_empty() {
            bail!("--brief must not be empty");
        }
        return Ok(raw.to_string());
    }

    let brief = if cli.has_form_fields() {
        cli.brief_from_flags()?
    } else {
        let stdin = io::stdin();
        let mut form = stdin.lock();
        let brief = prompt_form(&mut form, &mut io::stdout())?;
        match &cli.attachment {
            Some(path) => brief.with_attachment_file(path)?,
            None => brief,
        }
    };

    brief.validate()?;
    Ok(brief.render())
}

/// Collects the campaign form interactively.
fn prompt_form<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> anyhow::Result<CampaignBrief> {
    writeln!(output, "Campaign Details")?;
    let product_name = ask(input, output, "Product Name")?;
    let description = ask(input, output, "Product Description")?;
    let target_audience = ask(input, output, "Target Audience")?;
    let region = ask(input, output, "Place/Region")?;
    let budget_raw = ask(input, output, "Campaign Budget ($)")?;
    let budget = budget_raw
        .replace([',', '_', '$'], "")
        .parse::<u64>()
        .with_context(|| format!("Budget must be a whole number of dollars, got '{budget_raw}'"))?;

    Ok(CampaignBrief {
        product_name,
        description,
        target_audience,
        region,
        budget,
        attachment: None,
    })
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> anyhow::Result<String> {
    write!(output, "{label} > ")?;
    output.flush()?;

    let mut buffer = String::new();
    if input.read_line(&mut buffer)? == 0 {
        bail!("Input closed before '{label}' was provided");
    }
    Ok(buffer.trim().to_string())
}

fn print_outcome(outcome: &CampaignOutcome) {
    println!("\nConversation:\n");
    for message in outcome.transcript.messages() {
        println!("{}: {}\n", message.author(), message.content().trim());
    }

    println!("Final Campaign Proposal:\n{}\n", outcome.proposal_or_notice());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Cursor;

    #[test]
    fn cli_accepts_raw_brief_headlessly() {
        let cli = Cli::parse_from(["campaign-crew", "--brief", "Create a marketing campaign for a SmartBottle."]);
        assert_eq!(
            resolve_brief(&cli).expect("brief resolves"),
            "Create a marketing campaign for a SmartBottle."
        );
    }

    #[test]
    fn cli_form_flags_render_the_seed() {
        let cli = Cli::parse_from([
            "campaign-crew",
            "--product",
            "SmartBottle",
            "--description",
            "Tracks hydration",
            "--audience",
            "Students",
            "--region",
            "India",
            "--budget",
            "5000",
            "--max-steps",
            "12",
        ]);

        let seed = resolve_brief(&cli).expect("form is complete");
        assert!(seed.starts_with("Create a marketing campaign for a SmartBottle.\n"));
        assert!(seed.contains("Budget: $5000"));
        assert_eq!(cli.max_steps, Some(12));
    }

    #[test]
    fn incomplete_form_flags_are_rejected() {
        let cli = Cli::parse_from(["campaign-crew", "--product", "SmartBottle"]);
        let err = resolve_brief(&cli).expect_err("fields missing");
        assert!(err.to_string().contains("Please fill all required fields"));
    }

    #[test]
    fn brief_conflicts_with_form_fields() {
        let err = Cli::command()
            .try_get_matches_from(["campaign-crew", "--brief", "x", "--product", "y"])
            .expect_err("conflicting inputs");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn cli_help_is_emitted_as_error_kind() {
        let err = Cli::command()
            .try_get_matches_from(["campaign-crew", "--help"])
            .expect_err("help should short-circuit");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn interactive_form_reads_each_field() {
        let mut input = Cursor::new("SmartBottle\nTracks hydration\nStudents\nIndia\n$5,000\n");
        let mut output = Vec::new();

        let brief = prompt_form(&mut input, &mut output).expect("form completes");

        assert_eq!(brief.product_name, "SmartBottle");
        assert_eq!(brief.region, "India");
        assert_eq!(brief.budget, 5000);
        let shown = String::from_utf8(output).expect("utf8");
        assert!(shown.contains("Campaign Budget ($) > "));
    }

    #[test]
    fn interactive_form_fails_on_closed_input() {
        let mut input = Cursor::new("SmartBottle\n");
        let err = prompt_form(&mut input, &mut Vec::new()).expect_err("input ends early");
        assert!(err.to_string().contains("Product Description"));
    }
}
