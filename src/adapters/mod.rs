//! Adapter interfaces for external collaborators.
//!
//! Each stage of the pipeline calls out to exactly one of these traits;
//! the concrete implementations wrap the corresponding CLI tool via a
//! shared subprocess helper. Tests substitute counting fakes.

pub mod docker;
pub mod git;
pub mod mailer;
pub mod npm;
pub(crate) mod process;
pub mod sonar;
pub mod trivy;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the concrete adapters
pub use docker::DockerCli;
pub use git::GitCli;
pub use mailer::{HttpMailer, MailError, MailMessage, Mailer};
pub use npm::NpmCli;
pub use sonar::SonarScannerCli;
pub use trivy::TrivyCli;

/// Failure of an external tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with code {code}: {stderr}")]
    NonZeroExit {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: &'static str, seconds: u64 },
}

/// Everything the static-analysis scan needs, passed explicitly per call
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub project_key: String,
    pub project_name: String,
    pub server_url: String,
    pub auth_token: String,
    pub sources: PathBuf,
    pub exclusions: Vec<String>,
}

/// Source repository checkout
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn checkout(
        &self,
        repo_url: &str,
        branch: &str,
        dest: &Path,
        limit: Duration,
    ) -> Result<(), ToolError>;
}

/// Application dependency installation
#[async_trait]
pub trait PackageManager: Send + Sync {
    async fn install(&self, project_dir: &Path, limit: Duration) -> Result<(), ToolError>;
}

/// Application test execution
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run_tests(&self, project_dir: &Path, limit: Duration) -> Result<(), ToolError>;
}

/// Static-analysis scan against an external server
#[async_trait]
pub trait StaticAnalysis: Send + Sync {
    async fn scan(&self, request: &AnalysisRequest, limit: Duration) -> Result<(), ToolError>;
}

/// Container image build
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(
        &self,
        image: &str,
        tag: &str,
        context_dir: &Path,
        limit: Duration,
    ) -> Result<(), ToolError>;
}

/// Image vulnerability scan producing an HTML report
#[async_trait]
pub trait VulnerabilityScanner: Send + Sync {
    async fn scan(
        &self,
        image: &str,
        tag: &str,
        template: &Path,
        output: &Path,
        limit: Duration,
    ) -> Result<(), ToolError>;
}

/// The full set of collaborators a run needs
pub struct Toolchain {
    pub source_control: Box<dyn SourceControl>,
    pub package_manager: Box<dyn PackageManager>,
    pub test_runner: Box<dyn TestRunner>,
    pub static_analysis: Box<dyn StaticAnalysis>,
    pub image_builder: Box<dyn ImageBuilder>,
    pub vulnerability_scanner: Box<dyn VulnerabilityScanner>,
}

impl Toolchain {
    /// The standard CLI-backed toolchain (git, npm, sonar-scanner, docker,
    /// trivy on PATH).
    pub fn standard() -> Self {
        Self {
            source_control: Box::new(GitCli::new()),
            package_manager: Box::new(NpmCli::new()),
            test_runner: Box::new(NpmCli::new()),
            static_analysis: Box::new(SonarScannerCli::new()),
            image_builder: Box::new(DockerCli::new()),
            vulnerability_scanner: Box::new(TrivyCli::new()),
        }
    }
}
