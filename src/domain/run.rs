//! Run state for a single pipeline execution.
//!
//! A `PipelineRun` is created when a run starts, grows an ordered record
//! per executed stage, and is finalized exactly once when the stage
//! sequence ends or aborts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::params::ReleaseParameters;
use crate::core::stages::StageId;

/// Outcome of one executed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StageOutcome {
    /// Stage completed successfully
    Success,

    /// Stage failed but its policy allows the run to continue
    SoftFailure { reason: String },

    /// Stage failed and aborted the remaining sequence
    HardFailure { reason: String },
}

impl StageOutcome {
    /// True for either failure variant
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Record of one executed stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// Which stage ran
    pub stage: StageId,

    /// How it ended
    pub outcome: StageOutcome,

    /// Time taken in milliseconds
    pub duration_ms: u64,

    /// When the stage finished
    pub completed_at: DateTime<Utc>,
}

impl StageRecord {
    /// Create a record stamped with the current time
    pub fn new(stage: StageId, outcome: StageOutcome, duration_ms: u64) -> Self {
        Self {
            stage,
            outcome,
            duration_ms,
            completed_at: Utc::now(),
        }
    }
}

/// A single end-to-end pipeline execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique identifier for this run
    pub id: Uuid,

    /// Parameters the run was started with
    pub parameters: ReleaseParameters,

    /// Image name resolved from environment + base name at run creation
    pub image_name: String,

    /// Ordered records of executed stages
    pub records: Vec<StageRecord>,

    /// Current status (frozen by `finalize`)
    pub status: RunStatus,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (if finalized)
    pub completed_at: Option<DateTime<Utc>>,

    /// Published vulnerability report, when one was produced
    pub report_artifact: Option<PathBuf>,
}

impl PipelineRun {
    /// Start a run. The image name is resolved here, once, from the
    /// target environment and the configured base name.
    pub fn new(parameters: ReleaseParameters, image_base_name: &str) -> Self {
        let image_name = parameters.environment.qualified_image_name(image_base_name);

        Self {
            id: Uuid::new_v4(),
            parameters,
            image_name,
            records: Vec::new(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            report_artifact: None,
        }
    }

    /// Append a stage record
    pub fn record(&mut self, stage: StageId, outcome: StageOutcome, duration_ms: u64) {
        self.records.push(StageRecord::new(stage, outcome, duration_ms));
    }

    /// Freeze the final status: `Failure` iff any stage hard-failed,
    /// otherwise `Success`.
    pub fn finalize(&mut self) {
        let failed = self
            .records
            .iter()
            .any(|r| matches!(r.outcome, StageOutcome::HardFailure { .. }));

        self.status = if failed {
            RunStatus::Failure
        } else {
            RunStatus::Success
        };
        self.completed_at = Some(Utc::now());
    }

    /// True while the run has not been finalized
    pub fn is_running(&self) -> bool {
        matches!(self.status, RunStatus::Running)
    }

    /// Outcome recorded for a stage, if it executed
    pub fn outcome_of(&self, stage: StageId) -> Option<&StageOutcome> {
        self.records
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }
}

/// Status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Currently executing
    Running,

    /// Finished with no hard failures
    Success,

    /// Aborted by a hard failure
    Failure,
}

impl RunStatus {
    /// Uppercase label used in notifications and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::params::Environment;

    fn params() -> ReleaseParameters {
        ReleaseParameters::new("1.2.3", "https://example.com/app.git", Environment::Dev)
    }

    #[test]
    fn test_run_resolves_image_name_at_creation() {
        let run = PipelineRun::new(params(), "hello-world-nodejs");

        assert_eq!(run.image_name, "dev-hello-world-nodejs");
        assert!(run.is_running());
        assert!(run.records.is_empty());
    }

    #[test]
    fn test_finalize_success_without_hard_failures() {
        let mut run = PipelineRun::new(params(), "app");
        run.record(StageId::Checkout, StageOutcome::Success, 10);
        run.record(
            StageId::VulnerabilityScan,
            StageOutcome::SoftFailure {
                reason: "scanner unavailable".to_string(),
            },
            5,
        );
        run.finalize();

        assert_eq!(run.status, RunStatus::Success);
        assert!(run.completed_at.is_some());
    }

    #[test]
    fn test_finalize_failure_on_hard_failure() {
        let mut run = PipelineRun::new(params(), "app");
        run.record(
            StageId::Install,
            StageOutcome::HardFailure {
                reason: "npm ci exited 1".to_string(),
            },
            42,
        );
        run.finalize();

        assert_eq!(run.status, RunStatus::Failure);
    }

    #[test]
    fn test_outcome_lookup() {
        let mut run = PipelineRun::new(params(), "app");
        run.record(StageId::Checkout, StageOutcome::Success, 1);

        assert_eq!(run.outcome_of(StageId::Checkout), Some(&StageOutcome::Success));
        assert_eq!(run.outcome_of(StageId::ImageBuild), None);
    }

    #[test]
    fn test_run_serialization() {
        let mut run = PipelineRun::new(params(), "app");
        run.record(StageId::VersionCheck, StageOutcome::Success, 0);
        run.finalize();

        let json = serde_json::to_string(&run).unwrap();
        let parsed: PipelineRun = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.status, RunStatus::Success);
        assert_eq!(parsed.records.len(), 1);
    }
}
