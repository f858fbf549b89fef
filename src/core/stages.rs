//! The declared stage plan.
//!
//! The pipeline is a fixed linear sequence; each stage carries a failure
//! policy that decides whether an error aborts the remaining sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    /// Validate the release version (pure, no external tool)
    VersionCheck,

    /// Clone the repository at the requested branch
    Checkout,

    /// Install application dependencies
    Install,

    /// Run the application's test suite
    Test,

    /// Static analysis scan
    StaticAnalysis,

    /// Build the container image
    ImageBuild,

    /// Scan the built image for vulnerabilities
    VulnerabilityScan,
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VersionCheck => "version-check",
            Self::Checkout => "checkout",
            Self::Install => "install",
            Self::Test => "test",
            Self::StaticAnalysis => "static-analysis",
            Self::ImageBuild => "image-build",
            Self::VulnerabilityScan => "vulnerability-scan",
        };
        write!(f, "{}", name)
    }
}

/// How a stage failure affects the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// An error aborts the remaining sequence and fails the run
    Strict,

    /// An error is logged and the run continues unaffected
    Tolerant,
}

/// One entry of the declared plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub id: StageId,
    pub policy: FailurePolicy,
}

/// The pipeline's declared stage sequence, in execution order.
///
/// Only the vulnerability scan is tolerant: a missing scan report is an
/// acceptable release, a failed build or test run is not.
pub fn stage_plan() -> &'static [StageSpec] {
    use FailurePolicy::{Strict, Tolerant};
    use StageId::*;

    const PLAN: &[StageSpec] = &[
        StageSpec { id: VersionCheck, policy: Strict },
        StageSpec { id: Checkout, policy: Strict },
        StageSpec { id: Install, policy: Strict },
        StageSpec { id: Test, policy: Strict },
        StageSpec { id: StaticAnalysis, policy: Strict },
        StageSpec { id: ImageBuild, policy: Strict },
        StageSpec { id: VulnerabilityScan, policy: Tolerant },
    ];

    PLAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_order_and_policies() {
        let plan = stage_plan();

        assert_eq!(plan.len(), 7);
        assert_eq!(plan[0].id, StageId::VersionCheck);
        assert_eq!(plan.last().unwrap().id, StageId::VulnerabilityScan);

        // Only the scan is tolerant
        for spec in plan {
            let expected = if spec.id == StageId::VulnerabilityScan {
                FailurePolicy::Tolerant
            } else {
                FailurePolicy::Strict
            };
            assert_eq!(spec.policy, expected, "policy mismatch for {}", spec.id);
        }
    }

    #[test]
    fn test_version_check_precedes_all_tool_stages() {
        let plan = stage_plan();
        assert_eq!(plan[0].id, StageId::VersionCheck);
        assert_eq!(plan[1].id, StageId::Checkout);
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(StageId::StaticAnalysis.to_string(), "static-analysis");
        assert_eq!(StageId::VulnerabilityScan.to_string(), "vulnerability-scan");
    }
}
