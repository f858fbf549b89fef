//! Release parameters and deployment environments.
//!
//! Parameters are fixed when a run starts; nothing mutates them afterwards.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Input parameters for a single release run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseParameters {
    /// Version being released (must match the version gate)
    pub release_version: String,

    /// Git repository to check out
    pub repo_url: String,

    /// Branch to build
    pub branch: String,

    /// Target deployment environment
    pub environment: Environment,

    /// Whether to send the outcome notification
    pub send_email: bool,
}

impl ReleaseParameters {
    /// Create parameters with the default branch and notification enabled
    pub fn new(
        release_version: impl Into<String>,
        repo_url: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            release_version: release_version.into(),
            repo_url: repo_url.into(),
            branch: "main".to_string(),
            environment,
            send_email: true,
        }
    }

    /// Override the branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Override notification dispatch
    pub fn with_send_email(mut self, send_email: bool) -> Self {
        self.send_email = send_email;
        self
    }
}

/// Deployment environments a release can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Development
    Dev,

    /// Quality assurance
    Qa,

    /// Pre-production staging
    Staging,

    /// Production
    Prod,
}

impl Environment {
    /// Qualify an image base name for this environment.
    ///
    /// Production images keep the bare base name; every other environment
    /// gets an `"{env}-"` prefix so images for different targets never
    /// collide in the registry.
    pub fn qualified_image_name(&self, base: &str) -> String {
        match self {
            Self::Prod => base.to_string(),
            other => format!("{}-{}", other, base),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Qa => write!(f, "qa"),
            Self::Staging => write!(f, "staging"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_prod_environments_prefix_image_name() {
        assert_eq!(
            Environment::Dev.qualified_image_name("hello-world-nodejs"),
            "dev-hello-world-nodejs"
        );
        assert_eq!(
            Environment::Qa.qualified_image_name("hello-world-nodejs"),
            "qa-hello-world-nodejs"
        );
        assert_eq!(
            Environment::Staging.qualified_image_name("hello-world-nodejs"),
            "staging-hello-world-nodejs"
        );
    }

    #[test]
    fn test_prod_keeps_base_name() {
        assert_eq!(
            Environment::Prod.qualified_image_name("hello-world-nodejs"),
            "hello-world-nodejs"
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Dev.to_string(), "dev");
        assert_eq!(Environment::Prod.to_string(), "prod");
    }

    #[test]
    fn test_parameter_defaults() {
        let params = ReleaseParameters::new("1.2.3", "https://example.com/repo.git", Environment::Dev);

        assert_eq!(params.branch, "main");
        assert!(params.send_email);
    }

    #[test]
    fn test_parameter_overrides() {
        let params = ReleaseParameters::new("1.2.3", "https://example.com/repo.git", Environment::Qa)
            .with_branch("release/1.2")
            .with_send_email(false);

        assert_eq!(params.branch, "release/1.2");
        assert!(!params.send_email);
    }
}
