//! Trivy adapter for image vulnerability scanning.
//!
//! The scan renders an HTML report through trivy's template output. This
//! backs the pipeline's only tolerant stage: a scanner failure leaves no
//! report behind and the run carries on.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_tool;
use super::{ToolError, VulnerabilityScanner};

/// Scans images with the `trivy` CLI
pub struct TrivyCli {
    binary_path: String,
}

impl Default for TrivyCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TrivyCli {
    /// Use `trivy` from PATH
    pub fn new() -> Self {
        Self {
            binary_path: "trivy".to_string(),
        }
    }

    /// Use a specific trivy binary
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl VulnerabilityScanner for TrivyCli {
    async fn scan(
        &self,
        image: &str,
        tag: &str,
        template: &Path,
        output: &Path,
        limit: Duration,
    ) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(["image", "--format", "template", "--template"])
            .arg(format!("@{}", template.display()))
            .arg("--output")
            .arg(output)
            .arg(format!("{}:{}", image, tag));

        run_tool("trivy", &mut cmd, limit).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary_path() {
        let trivy = TrivyCli::new();
        assert_eq!(trivy.binary_path, "trivy");
    }

    #[test]
    fn test_custom_binary_path() {
        let trivy = TrivyCli::with_binary_path("/opt/trivy/trivy");
        assert_eq!(trivy.binary_path, "/opt/trivy/trivy");
    }
}
