//! Git adapter for repository checkout.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_tool;
use super::{SourceControl, ToolError};

/// Checks out repositories with the `git` CLI
pub struct GitCli {
    binary_path: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from PATH
    pub fn new() -> Self {
        Self {
            binary_path: "git".to_string(),
        }
    }

    /// Use a specific git binary
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

#[async_trait]
impl SourceControl for GitCli {
    async fn checkout(
        &self,
        repo_url: &str,
        branch: &str,
        dest: &Path,
        limit: Duration,
    ) -> Result<(), ToolError> {
        // Shallow clone of the single branch being released
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(["clone", "--depth", "1", "--branch", branch, repo_url])
            .arg(dest);

        run_tool("git", &mut cmd, limit).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary_path() {
        let git = GitCli::new();
        assert_eq!(git.binary_path, "git");
    }

    #[test]
    fn test_custom_binary_path() {
        let git = GitCli::with_binary_path("/usr/local/bin/git");
        assert_eq!(git.binary_path, "/usr/local/bin/git");
    }
}
