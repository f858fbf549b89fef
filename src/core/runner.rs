//! Stage execution and run composition.
//!
//! `StageRunner` walks the declared plan, invoking one collaborator per
//! stage and applying the stage's failure policy. `ReleasePipeline` wraps
//! a whole run: stages, then report publication, then notification — the
//! last two exactly once regardless of how the stages ended.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::adapters::{AnalysisRequest, ToolError, Toolchain};
use crate::config::ResolvedConfig;
use crate::core::stages::{stage_plan, FailurePolicy, StageId};
use crate::core::version::{validate_version, InvalidVersionError};
use crate::domain::{PipelineRun, ReleaseParameters, StageOutcome};
use crate::notify::NotificationDispatcher;
use crate::report::{PublishResult, ReportPublisher};

/// Failure of a single stage, before its policy is applied
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    InvalidVersion(#[from] InvalidVersionError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("failed to prepare workspace {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Executes the declared stage sequence against a run
pub struct StageRunner {
    tools: Toolchain,
    config: ResolvedConfig,
}

impl StageRunner {
    /// Create a runner over the given collaborators and configuration
    pub fn new(tools: Toolchain, config: ResolvedConfig) -> Self {
        Self { tools, config }
    }

    /// Per-run checkout directory
    fn workdir(&self, run: &PipelineRun) -> PathBuf {
        self.config.workspace_dir().join(run.id.to_string())
    }

    /// Where the scan stage writes its report for this run
    pub fn report_path(&self, run: &PipelineRun) -> PathBuf {
        self.workdir(run).join(&self.config.scanner.report_file)
    }

    /// Execute the full stage plan for `parameters`.
    ///
    /// Strict failures truncate the sequence; tolerant failures are
    /// recorded and skipped over. The returned run is finalized.
    #[instrument(skip(self, parameters), fields(version = %parameters.release_version, environment = %parameters.environment))]
    pub async fn execute(&self, parameters: ReleaseParameters) -> PipelineRun {
        let mut run = PipelineRun::new(parameters, &self.config.image.base_name);
        info!(run_id = %run.id, image = %run.image_name, "starting release run");

        for spec in stage_plan() {
            let stage_start = Instant::now();
            let result = self.invoke(spec.id, &run).await;
            let duration_ms = stage_start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    info!(stage = %spec.id, duration_ms, "stage completed");
                    run.record(spec.id, StageOutcome::Success, duration_ms);
                }
                Err(e) => match spec.policy {
                    FailurePolicy::Strict => {
                        error!(stage = %spec.id, error = %e, "stage failed, aborting run");
                        run.record(
                            spec.id,
                            StageOutcome::HardFailure {
                                reason: e.to_string(),
                            },
                            duration_ms,
                        );
                        break;
                    }
                    FailurePolicy::Tolerant => {
                        warn!(stage = %spec.id, error = %e, "stage failed, continuing");
                        run.record(
                            spec.id,
                            StageOutcome::SoftFailure {
                                reason: e.to_string(),
                            },
                            duration_ms,
                        );
                    }
                },
            }
        }

        run.finalize();
        info!(run_id = %run.id, status = run.status.label(), "run finalized");
        run
    }

    /// Invoke the collaborator behind one stage
    async fn invoke(&self, stage: StageId, run: &PipelineRun) -> Result<(), StageError> {
        let limit = Duration::from_secs(self.config.limits.stage_timeout_seconds);
        let workdir = self.workdir(run);

        match stage {
            StageId::VersionCheck => {
                // Pure check: a bad version aborts before any tool runs
                validate_version(&run.parameters.release_version)?;
                Ok(())
            }

            StageId::Checkout => {
                let parent = self.config.workspace_dir();
                tokio::fs::create_dir_all(&parent)
                    .await
                    .map_err(|source| StageError::Workspace {
                        path: parent.clone(),
                        source,
                    })?;

                self.tools
                    .source_control
                    .checkout(&run.parameters.repo_url, &run.parameters.branch, &workdir, limit)
                    .await?;
                Ok(())
            }

            StageId::Install => {
                self.tools.package_manager.install(&workdir, limit).await?;
                Ok(())
            }

            StageId::Test => {
                self.tools.test_runner.run_tests(&workdir, limit).await?;
                Ok(())
            }

            StageId::StaticAnalysis => {
                let request = AnalysisRequest {
                    project_key: self.config.analysis.project_key.clone(),
                    project_name: self.config.analysis.project_name.clone(),
                    server_url: self.config.analysis.server_url.clone(),
                    auth_token: self.config.analysis.token.clone(),
                    sources: workdir.join(&self.config.analysis.sources),
                    exclusions: self.config.analysis.exclusions.clone(),
                };
                self.tools.static_analysis.scan(&request, limit).await?;
                Ok(())
            }

            StageId::ImageBuild => {
                let context = workdir.join(&self.config.image.context_dir);
                self.tools
                    .image_builder
                    .build(&run.image_name, &run.parameters.release_version, &context, limit)
                    .await?;
                Ok(())
            }

            StageId::VulnerabilityScan => {
                self.tools
                    .vulnerability_scanner
                    .scan(
                        &run.image_name,
                        &run.parameters.release_version,
                        &self.config.scanner.template,
                        &self.report_path(run),
                        limit,
                    )
                    .await?;
                Ok(())
            }
        }
    }
}

/// One end-to-end release: stages, then publication, then notification
pub struct ReleasePipeline {
    runner: StageRunner,
    publisher: ReportPublisher,
    notifier: NotificationDispatcher,
}

impl ReleasePipeline {
    /// Compose a pipeline from its three parts
    pub fn new(
        runner: StageRunner,
        publisher: ReportPublisher,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            runner,
            publisher,
            notifier,
        }
    }

    /// Run the pipeline to completion.
    ///
    /// Publication and notification run once each, for success and failure
    /// alike; neither can change the finalized status.
    pub async fn run(&self, parameters: ReleaseParameters) -> PipelineRun {
        let send_email = parameters.send_email;

        let mut run = self.runner.execute(parameters).await;

        let report_path = self.runner.report_path(&run);
        if let PublishResult::Published { report, .. } =
            self.publisher.publish(&report_path, run.id).await
        {
            run.report_artifact = Some(report);
        }

        self.notifier.dispatch(&run, send_email).await;

        run
    }
}
