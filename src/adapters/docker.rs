//! Docker adapter for container image builds.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_tool;
use super::{ImageBuilder, ToolError};

/// Builds images with the `docker` CLI
pub struct DockerCli {
    binary_path: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    /// Use `docker` from PATH
    pub fn new() -> Self {
        Self {
            binary_path: "docker".to_string(),
        }
    }

    /// Use a specific docker binary
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build(
        &self,
        image: &str,
        tag: &str,
        context_dir: &Path,
        limit: Duration,
    ) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(["build", "-t", &format!("{}:{}", image, tag)])
            .arg(context_dir);

        run_tool("docker", &mut cmd, limit).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary_path() {
        let docker = DockerCli::new();
        assert_eq!(docker.binary_path, "docker");
    }

    #[test]
    fn test_custom_binary_path() {
        let docker = DockerCli::with_binary_path("/usr/bin/podman");
        assert_eq!(docker.binary_path, "/usr/bin/podman");
    }
}
