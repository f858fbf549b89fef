//! Release version gate.
//!
//! Accepts exactly three dot-separated non-negative integer groups.
//! Pre-release and build-metadata suffixes are rejected on purpose: release
//! images are tagged with the bare version, and a suffixed tag would never
//! match what the deploy tooling expects.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Anchored pattern: `MAJOR.MINOR.PATCH`, digits only.
const VERSION_PATTERN: &str = r"^\d+\.\d+\.\d+$";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is valid"))
}

/// A version string that does not match the release pattern
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid release version {given:?}: expected MAJOR.MINOR.PATCH (e.g. 1.2.3)")]
pub struct InvalidVersionError {
    /// The rejected input
    pub given: String,
}

/// Validate a release version string.
///
/// This runs before any external tool is invoked, so a bad version aborts
/// the run without side effects.
pub fn validate_version(version: &str) -> Result<(), InvalidVersionError> {
    if version_regex().is_match(version) {
        Ok(())
    } else {
        Err(InvalidVersionError {
            given: version.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_three_integer_groups() {
        for v in ["0.0.0", "1.2.3", "10.20.30", "123.0.1"] {
            assert!(validate_version(v).is_ok(), "expected {} to validate", v);
        }
    }

    #[test]
    fn test_rejects_non_matching_strings() {
        for v in ["", "1", "1.0", "1.0.0.0", "v1.0.0", "1.0.0-beta", "1.0.0 ", " 1.0.0", "1.a.0"] {
            assert!(validate_version(v).is_err(), "expected {:?} to be rejected", v);
        }
    }

    #[test]
    fn test_error_carries_input() {
        let err = validate_version("1.0").unwrap_err();
        assert_eq!(err.given, "1.0");
        assert!(err.to_string().contains("1.0"));
    }
}
