//! CLI command definitions for prompt-forge.

use std::fmt::Write as _;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::assembler::{
    GeneratedPrompt, Principle, PromptAnalysis, PromptAssembler, SectionSource,
};
use crate::config::AssemblerConfig;
use crate::input::{OutputFormat, PromptRequest, RawPromptInput, TaskComplexity};

/// Assemble five-principle prompts from a task description.
#[derive(Parser)]
#[command(name = "prompt-forge")]
#[command(about = "Assemble five-principle prompts from structured task descriptions")]
#[command(version)]
#[command(
    long_about = "prompt-forge turns a task description into a ready-to-use prompt built from five principles: direction, format, examples, quality criteria and task decomposition.\n\nSections are written by an OpenAI-compatible model when an API key is available and fall back to templates otherwise.\n\nExample usage:\n  prompt-forge generate \"Write a blog post about sustainable gardening\" --audience \"beginner gardeners\" --tone \"friendly and encouraging\""
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a prompt for a task.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// List the five principles in assembly order.
    Principles(PrinciplesArgs),
}

/// Arguments for `prompt-forge generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// What the prompt should get done.
    pub task: String,

    /// Who the output is for.
    #[arg(short, long)]
    pub audience: Option<String>,

    /// Desired tone, e.g. "formal" or "friendly and encouraging".
    #[arg(short, long)]
    pub tone: Option<String>,

    /// Output format: text, json, email, list, code, essay, report, creative-writing, other.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Task complexity: simple, moderate, complex, very-complex.
    #[arg(short, long)]
    pub complexity: Option<String>,

    /// A constraint on the output. Repeat for several.
    #[arg(short = 'r', long = "constraint")]
    pub constraints: Vec<String>,

    /// Background the model should know about.
    #[arg(long)]
    pub context: Option<String>,

    /// Replace the examples section with a placeholder.
    #[arg(long)]
    pub no_examples: bool,

    /// Use templates only, even if an API key is set.
    #[arg(long)]
    pub offline: bool,

    /// API key for the chat-completions endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for section generation.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Per-section timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// YAML configuration file.
    #[arg(long)]
    pub config: Option<String>,

    /// Output JSON to stdout.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `prompt-forge principles`.
#[derive(Parser, Debug)]
pub struct PrinciplesArgs {
    /// Output JSON to stdout.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate_command(args).await,
        Commands::Principles(args) => run_principles_command(&args),
    }
}

// ============================================================================
// Generate
// ============================================================================

#[derive(Serialize)]
struct GenerateOutput<'a> {
    request: &'a PromptRequest,
    prompt: &'a GeneratedPrompt,
    analysis: &'a PromptAnalysis,
}

async fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let base = match &args.config {
        Some(path) => {
            info!(path = %path, "Loading configuration file");
            AssemblerConfig::from_yaml_file(path)?
                .merge_vars(|key| std::env::var(key).ok())?
        }
        None => AssemblerConfig::from_env()?,
    };
    let config = apply_overrides(base, &args);

    let request = build_request(&args, &config)?;
    let assembler = PromptAssembler::from_config(config)?;

    let prompt = assembler.assemble(&request).await;
    let analysis = PromptAnalysis::from_prompt(&prompt);

    if args.json {
        let output = GenerateOutput {
            request: &request,
            prompt: &prompt,
            analysis: &analysis,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_report(&prompt, &analysis));
    }

    Ok(())
}

/// Applies command-line flags on top of file and environment settings.
fn apply_overrides(mut config: AssemblerConfig, args: &GenerateArgs) -> AssemblerConfig {
    if let Some(key) = &args.api_key {
        config = config.with_api_key(key.clone());
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(Duration::from_secs(timeout));
    }
    if args.offline {
        config = config.with_offline(true);
    }
    config
}

fn build_request(args: &GenerateArgs, config: &AssemblerConfig) -> anyhow::Result<PromptRequest> {
    let raw = RawPromptInput {
        task: args.task.clone(),
        audience: args.audience.clone(),
        tone: args.tone.clone(),
        format: args.format.clone(),
        complexity: args.complexity.clone(),
        constraints: (!args.constraints.is_empty()).then(|| args.constraints.join("\n")),
        context: args.context.clone(),
        examples_needed: Some(!args.no_examples),
    };
    Ok(raw.into_request(&config.defaults)?)
}

/// Human-readable report: every section, the final prompt and the analysis.
fn render_report(prompt: &GeneratedPrompt, analysis: &PromptAnalysis) -> String {
    let mut out = String::new();

    for section in prompt.sections() {
        let _ = writeln!(
            out,
            "=== {} ({}) ===",
            section.principle.title(),
            match section.source {
                SectionSource::Collaborator => "generated",
                SectionSource::Fallback => "template",
            }
        );
        let _ = writeln!(out, "{}\n", section.text);
    }

    let _ = writeln!(out, "=== Final Prompt ===");
    let _ = writeln!(out, "{}\n", prompt.final_prompt());

    let _ = writeln!(
        out,
        "Confidence: {}% ({})",
        analysis.confidence_percent,
        analysis.band.message()
    );
    let _ = writeln!(
        out,
        "Completeness: {:.0}% overall",
        analysis.overall_completeness() * 100.0
    );
    for item in &analysis.completeness {
        let _ = writeln!(
            out,
            "  {:<18} {:>3.0}%",
            item.principle.title(),
            item.completeness * 100.0
        );
    }
    let _ = writeln!(
        out,
        "Words: {} (direction {}, format {}, quality {})",
        analysis.word_counts.final_prompt,
        analysis.word_counts.direction,
        analysis.word_counts.format_specification,
        analysis.word_counts.quality_criteria
    );

    if !prompt.warnings().is_empty() {
        let _ = writeln!(out, "Warnings:");
        for warning in prompt.warnings() {
            let _ = writeln!(out, "  ⚠ {warning}");
        }
    }

    out
}

// ============================================================================
// Principles
// ============================================================================

#[derive(Serialize)]
struct PrincipleInfo {
    principle: Principle,
    title: &'static str,
    summary: &'static str,
}

fn run_principles_command(args: &PrinciplesArgs) -> anyhow::Result<()> {
    if args.json {
        let infos: Vec<PrincipleInfo> = Principle::ALL
            .iter()
            .map(|p| PrincipleInfo {
                principle: *p,
                title: p.title(),
                summary: p.summary(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for (i, principle) in Principle::ALL.iter().enumerate() {
        println!("{}. {}: {}", i + 1, principle.title(), principle.summary());
    }
    println!();
    println!(
        "Formats: {}",
        OutputFormat::ALL
            .iter()
            .map(|f| f.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "Complexity levels: {}",
        TaskComplexity::ALL
            .iter()
            .map(|c| c.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}
