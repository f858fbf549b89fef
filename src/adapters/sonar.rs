//! sonar-scanner adapter for static analysis.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_tool;
use super::{AnalysisRequest, StaticAnalysis, ToolError};

/// Drives the `sonar-scanner` CLI against a SonarQube server
pub struct SonarScannerCli {
    binary_path: String,
}

impl Default for SonarScannerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl SonarScannerCli {
    /// Use `sonar-scanner` from PATH
    pub fn new() -> Self {
        Self {
            binary_path: "sonar-scanner".to_string(),
        }
    }

    /// Use a specific scanner binary
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    fn build_args(request: &AnalysisRequest) -> Vec<String> {
        let mut args = vec![
            format!("-Dsonar.projectKey={}", request.project_key),
            format!("-Dsonar.projectName={}", request.project_name),
            format!("-Dsonar.host.url={}", request.server_url),
            format!("-Dsonar.login={}", request.auth_token),
            format!("-Dsonar.sources={}", request.sources.display()),
        ];

        if !request.exclusions.is_empty() {
            args.push(format!("-Dsonar.exclusions={}", request.exclusions.join(",")));
        }

        args
    }
}

#[async_trait]
impl StaticAnalysis for SonarScannerCli {
    async fn scan(&self, request: &AnalysisRequest, limit: Duration) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(Self::build_args(request))
            .current_dir(&request.sources);

        run_tool("sonar-scanner", &mut cmd, limit).await?;
        Ok(())
    }
}
