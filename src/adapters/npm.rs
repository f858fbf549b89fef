//! npm adapter for dependency installation and test execution.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_tool;
use super::{PackageManager, TestRunner, ToolError};

/// Runs `npm` subcommands in the checked-out project directory
pub struct NpmCli {
    binary_path: String,
}

impl Default for NpmCli {
    fn default() -> Self {
        Self::new()
    }
}

impl NpmCli {
    /// Use `npm` from PATH
    pub fn new() -> Self {
        Self {
            binary_path: "npm".to_string(),
        }
    }

    /// Use a specific npm binary
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl PackageManager for NpmCli {
    async fn install(&self, project_dir: &Path, limit: Duration) -> Result<(), ToolError> {
        // `ci` gives a clean, lockfile-exact install
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("ci").current_dir(project_dir);

        run_tool("npm", &mut cmd, limit).await?;
        Ok(())
    }
}

#[async_trait]
impl TestRunner for NpmCli {
    async fn run_tests(&self, project_dir: &Path, limit: Duration) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("test").current_dir(project_dir);

        run_tool("npm", &mut cmd, limit).await?;
        Ok(())
    }
}
