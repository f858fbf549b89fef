//! Command-line interface for shiprun.
//!
//! Run parameters double as CI-style environment configuration: every
//! `run` argument is bound to an environment variable, so a CI job can
//! export RELEASE_VERSION / ENVIRONMENT / ... instead of passing flags.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use crate::adapters::{HttpMailer, Toolchain};
use crate::config::{load_config, ResolvedConfig};
use crate::core::{stage_plan, ReleasePipeline, StageRunner};
use crate::domain::{Environment, PipelineRun, ReleaseParameters, RunStatus, StageOutcome};
use crate::notify::NotificationDispatcher;
use crate::report::{FsArtifactStore, ReportPublisher};

/// shiprun - release pipeline runner
#[derive(Parser, Debug)]
#[command(name = "shiprun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a release run
    Run {
        /// Version being released (MAJOR.MINOR.PATCH)
        #[arg(long, env = "RELEASE_VERSION")]
        release_version: String,

        /// Git repository to check out
        #[arg(long, env = "GIT_REPO_URL")]
        repo_url: String,

        /// Branch to build
        #[arg(long, env = "BRANCH", default_value = "main")]
        branch: String,

        /// Target deployment environment
        #[arg(long, env = "ENVIRONMENT", value_enum)]
        environment: Environment,

        /// Whether to send the outcome notification
        #[arg(long, env = "SEND_EMAIL", default_value_t = true, action = ArgAction::Set)]
        send_email: bool,

        /// Print the finalized run as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the declared stage plan
    Stages,

    /// Show resolved configuration (secrets redacted)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                release_version,
                repo_url,
                branch,
                environment,
                send_email,
                json,
            } => {
                let parameters = ReleaseParameters::new(release_version, repo_url, environment)
                    .with_branch(branch)
                    .with_send_email(send_email);
                run_release(parameters, json).await
            }
            Commands::Stages => {
                show_stages();
                Ok(())
            }
            Commands::Config => show_config(),
        }
    }
}

/// Build the standard pipeline and execute one release run
async fn run_release(parameters: ReleaseParameters, json: bool) -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    let pipeline = build_pipeline(config);

    let run = pipeline.run(parameters).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run);
    }

    if run.status == RunStatus::Failure {
        std::process::exit(1);
    }

    Ok(())
}

/// Wire the standard collaborators into a pipeline
fn build_pipeline(config: ResolvedConfig) -> ReleasePipeline {
    let publisher = ReportPublisher::new(
        Box::new(FsArtifactStore::new(&config.home)),
        config.scanner.report_file.clone(),
    );

    let notifier = NotificationDispatcher::new(
        Box::new(HttpMailer::new(
            config.mail.endpoint.clone(),
            config.mail.token.clone(),
        )),
        config.mail.from.clone(),
        config.mail.to.clone(),
        config.build.clone(),
    );

    let runner = StageRunner::new(Toolchain::standard(), config);

    ReleasePipeline::new(runner, publisher, notifier)
}

/// Print a human-readable run summary
fn print_summary(run: &PipelineRun) {
    println!("{:<20} {:<14} {:>11}", "STAGE", "OUTCOME", "DURATION");
    println!("{}", "-".repeat(47));

    for record in &run.records {
        let (outcome, reason) = match &record.outcome {
            StageOutcome::Success => ("ok".to_string(), None),
            StageOutcome::SoftFailure { reason } => ("soft-failure".to_string(), Some(reason)),
            StageOutcome::HardFailure { reason } => ("hard-failure".to_string(), Some(reason)),
        };

        println!(
            "{:<20} {:<14} {:>9}ms",
            record.stage.to_string(),
            outcome,
            record.duration_ms
        );
        if let Some(reason) = reason {
            println!("{:<20} {}", "", reason);
        }
    }

    if let Some(ref report) = run.report_artifact {
        println!("\nScan report: {}", report.display());
    }

    eprintln!("\n[Run {} finished: {}]", run.id, run.status.label());
}

/// Print the declared stage plan
fn show_stages() {
    println!("{:<20} {:<10}", "STAGE", "POLICY");
    println!("{}", "-".repeat(30));

    for spec in stage_plan() {
        let policy = match spec.policy {
            crate::core::FailurePolicy::Strict => "strict",
            crate::core::FailurePolicy::Tolerant => "tolerant",
        };
        println!("{:<20} {:<10}", spec.id.to_string(), policy);
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    print!("{}", config);
    Ok(())
}
