//! shiprun - release pipeline runner
//!
//! A single invocation performs one release run: validate the version,
//! check out and test the project, run static analysis, build an
//! environment-qualified container image, scan it for vulnerabilities,
//! publish the scan report if one exists, and send an outcome
//! notification.
//!
//! # Architecture
//!
//! The pipeline is a fixed linear stage sequence; each stage carries a
//! failure policy:
//! - strict stages abort the remaining sequence on error
//! - the tolerant vulnerability scan is logged and skipped over on error
//!
//! Report publication and the outcome notification run after the stage
//! sequence, once per run, for success and failure alike.
//!
//! # Modules
//!
//! - `adapters`: external tool integrations (git, npm, sonar-scanner,
//!   docker, trivy, mail gateway)
//! - `core`: version gate, stage plan, stage runner
//! - `domain`: data structures (ReleaseParameters, PipelineRun)
//! - `notify`: notification rendering and dispatch
//! - `report`: scan report archiving and publication
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Execute a release run
//! shiprun run --release-version 1.2.3 --repo-url https://example.com/app.git --environment dev
//!
//! # Same thing, CI-style
//! RELEASE_VERSION=1.2.3 GIT_REPO_URL=https://example.com/app.git ENVIRONMENT=dev shiprun run
//!
//! # Inspect the stage plan
//! shiprun stages
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod notify;
pub mod report;

// Re-export main types at crate root for convenience
pub use crate::core::{ReleasePipeline, StageRunner};
pub use domain::{Environment, PipelineRun, ReleaseParameters, RunStatus, StageOutcome};
pub use notify::{NotificationContext, NotificationDispatcher};
pub use report::{PublishResult, ReportPublisher};
