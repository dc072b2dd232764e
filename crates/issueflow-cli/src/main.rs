//! issueflow - turn a GitHub issue into a pull request
//!
//! ## Commands
//!
//! - `run`: analyze an issue, generate files, open a pull request
//! - `demo`: run the pipeline once against in-memory collaborators

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use issueflow_anthropic::{AnthropicBackend, AnthropicConfig};
use issueflow_core::demo::DemoHarness;
use issueflow_core::{
    AnalysisStage, GenerationConfig, GenerationStage, Orchestrator, RepoRef, RunReport,
    SubmissionConfig, SubmissionStage,
};
use issueflow_github::{GithubClient, GithubConfig};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "issueflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn a GitHub issue into a pull request", long_about = None)]
struct Cli {
    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one issue end to end
    Run(RunArgs),

    /// Run the pipeline against in-memory collaborators and the fallback generator
    Demo {
        /// Print the full run report as JSON
        #[arg(long)]
        report: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Issue number to process
    #[arg(long, env = "ISSUEFLOW_ISSUE")]
    issue: Option<u64>,

    /// Target repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// GitHub REST API root, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL", default_value = issueflow_github::DEFAULT_API_URL)]
    github_api_url: String,

    /// GitHub token used for issue reads and pull request writes
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Anthropic API key; absent or "mock" selects the fallback generator
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Always use the fallback generator. The environment value is false for
    /// empty, 0, false, no, off, f or n, and true otherwise
    #[arg(long, env = "ISSUEFLOW_MOCK", value_parser = FalseyValueParser::new())]
    mock: bool,

    /// Model identifier for live generation
    #[arg(long, default_value = issueflow_core::config::DEFAULT_MODEL)]
    model: String,

    /// Output token ceiling for live generation
    #[arg(long, default_value_t = issueflow_core::config::DEFAULT_MAX_OUTPUT_TOKENS)]
    max_tokens: u32,

    /// Branch the pull request targets
    #[arg(long, default_value = issueflow_core::config::DEFAULT_BASE_BRANCH)]
    base_branch: String,

    /// Maximum parallel issues (reserved; issues are processed one at a time)
    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    /// Print the full run report as JSON
    #[arg(long)]
    report: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Info,
    Debug,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Validated `run` settings.
#[derive(Debug)]
struct RunSettings {
    issue: u64,
    repo: RepoRef,
    github: GithubConfig,
    generation: GenerationConfig,
    submission: SubmissionConfig,
    concurrency: usize,
    report: bool,
}

fn resolve(args: RunArgs) -> Result<RunSettings> {
    let Some(issue) = args.issue else {
        bail!("no issue number given; pass --issue or set ISSUEFLOW_ISSUE");
    };
    let Some(repository) = args.repository else {
        bail!("no repository given; pass --repository or set GITHUB_REPOSITORY");
    };
    let repo = RepoRef::parse(&repository).context("invalid repository")?;
    let github_token = match args.github_token {
        Some(token) if !token.trim().is_empty() => token,
        _ => bail!("no GitHub token given; pass --github-token or set GITHUB_TOKEN"),
    };

    let mut generation = GenerationConfig::default()
        .with_mock_mode(args.mock)
        .with_model(args.model)
        .with_max_output_tokens(args.max_tokens);
    if let Some(key) = args.api_key {
        generation = generation.with_credential(key);
    }

    Ok(RunSettings {
        issue,
        repo,
        github: GithubConfig::new(github_token).with_api_url(args.github_api_url),
        generation,
        submission: SubmissionConfig::default().with_base_branch(args.base_branch),
        concurrency: args.concurrency,
        report: args.report,
    })
}

fn print_outcome(report: &RunReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    match &report.submission {
        Some(url) => println!("Opened pull request for issue #{}: {}", report.issue, url),
        None => println!(
            "No files generated for issue #{}; nothing submitted",
            report.issue
        ),
    }
    Ok(())
}

async fn cmd_run(args: RunArgs) -> Result<()> {
    let settings = resolve(args)?;
    info!(
        issue = settings.issue,
        repo = %settings.repo,
        concurrency = settings.concurrency,
        "starting run"
    );

    let github = Arc::new(
        GithubClient::new(settings.github.clone())
            .context("failed to create GitHub client")?,
    );
    let backend = Arc::new(
        AnthropicBackend::new(AnthropicConfig::new(
            settings.generation.credential.clone().unwrap_or_default(),
        ))
        .context("failed to create Anthropic client")?,
    );

    let mut orchestrator = Orchestrator::new(
        AnalysisStage::new(github.clone(), settings.repo.clone()),
        GenerationStage::new(settings.generation.clone(), backend),
        SubmissionStage::new(github, settings.repo.clone(), settings.submission.clone()),
    );

    let report = orchestrator
        .run(settings.issue)
        .await
        .with_context(|| format!("failed to process issue #{}", settings.issue))?;
    print_outcome(&report, settings.report)
}

async fn cmd_demo(report: bool) -> Result<RunReport> {
    let mut harness = DemoHarness::new();
    let run = harness.run().await.context("demo run failed")?;
    print_outcome(&run, report)?;
    Ok(run)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    issueflow_core::init_tracing(cli.json, cli.log_level.into());

    match cli.command {
        Commands::Run(args) => cmd_run(args).await,
        Commands::Demo { report } => cmd_demo(report).await.map(|_| ()),
    }
}
