//! Configuration for shiprun.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SHIPRUN_HOME, SONAR_HOST_URL, SONAR_TOKEN,
//!    MAIL_ENDPOINT, MAIL_TOKEN, JOB_NAME, BUILD_NUMBER, BUILD_URL)
//! 2. Config file (.shiprun/config.yaml)
//! 3. Defaults (~/.shiprun)
//!
//! Config file discovery searches the current directory and parents for
//! .shiprun/config.yaml. `load_config` resolves everything once and
//! returns an immutable `ResolvedConfig`; components receive it (or a
//! section of it) through their constructors and never read process state
//! themselves.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub image: ImageSection,
    #[serde(default)]
    pub scanner: ScannerSection,
    #[serde(default)]
    pub mail: MailSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub limits: LimitsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsSection {
    /// State directory (relative to config file's parent project)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisSection {
    pub server_url: Option<String>,
    pub token: Option<String>,
    pub project_key: Option<String>,
    pub project_name: Option<String>,
    /// Sources subdirectory within the checkout
    pub sources: Option<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSection {
    pub base_name: Option<String>,
    /// Build context subdirectory within the checkout
    pub context_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScannerSection {
    pub template: Option<String>,
    pub report_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSection {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub from: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSection {
    pub job_name: Option<String>,
    pub build_number: Option<String>,
    pub build_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsSection {
    pub stage_timeout_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths and defaults filled
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to shiprun home (workspaces, archives, reports)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub analysis: AnalysisConfig,
    pub image: ImageConfig,
    pub scanner: ScannerConfig,
    pub mail: MailConfig,
    pub build: BuildConfig,
    pub limits: Limits,
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub server_url: String,
    pub token: String,
    pub project_key: String,
    pub project_name: String,
    pub sources: String,
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub base_name: String,
    pub context_dir: String,
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub template: PathBuf,
    pub report_file: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub from: String,
    pub to: Vec<String>,
}

/// Build metadata stamped into notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub job_name: String,
    pub build_number: String,
    pub build_url: String,
}

#[derive(Debug, Clone)]
pub struct Limits {
    pub stage_timeout_seconds: u64,
}

impl ResolvedConfig {
    /// Per-run workspace directory root
    pub fn workspace_dir(&self) -> PathBuf {
        self.home.join("workspace")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".shiprun").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse a config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path_str)
    }
}

fn env_or(var: &str, fallback: Option<String>, default: &str) -> String {
    std::env::var(var)
        .ok()
        .or(fallback)
        .unwrap_or_else(|| default.to_string())
}

/// Validate analysis exclusion patterns as globs
fn validate_exclusions(exclusions: &[String]) -> Result<()> {
    for pattern in exclusions {
        Pattern::new(pattern)
            .with_context(|| format!("Invalid analysis exclusion pattern: {}", pattern))?;
    }
    Ok(())
}

/// Load configuration from all sources.
///
/// Environment variables are consulted here and nowhere else; the returned
/// struct is the only configuration the rest of the system sees.
pub fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".shiprun");

    let config_path = find_config_file();
    let file = match config_path {
        Some(ref path) => load_config_file(path)?,
        None => ConfigFile {
            version: "1.0".to_string(),
            paths: PathsSection::default(),
            analysis: AnalysisSection::default(),
            image: ImageSection::default(),
            scanner: ScannerSection::default(),
            mail: MailSection::default(),
            build: BuildSection::default(),
            limits: LimitsSection::default(),
        },
    };

    resolve(file, config_path, default_home)
}

/// Resolve a parsed config file against env overrides and defaults
pub fn resolve(
    file: ConfigFile,
    config_path: Option<PathBuf>,
    default_home: PathBuf,
) -> Result<ResolvedConfig> {
    // Base directory is the parent of .shiprun/ (the project root)
    let base_dir = config_path
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let home = if let Ok(env_home) = std::env::var("SHIPRUN_HOME") {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = file.paths.home {
        resolve_path(&base_dir, home_path)
    } else {
        default_home
    };

    let image = ImageConfig {
        base_name: file
            .image
            .base_name
            .unwrap_or_else(|| "hello-world-nodejs".to_string()),
        context_dir: file.image.context_dir.unwrap_or_else(|| ".".to_string()),
    };

    let analysis = AnalysisConfig {
        server_url: env_or(
            "SONAR_HOST_URL",
            file.analysis.server_url,
            "http://localhost:9000",
        ),
        token: env_or("SONAR_TOKEN", file.analysis.token, ""),
        project_key: file
            .analysis
            .project_key
            .unwrap_or_else(|| image.base_name.clone()),
        project_name: file
            .analysis
            .project_name
            .unwrap_or_else(|| image.base_name.clone()),
        sources: file.analysis.sources.unwrap_or_else(|| ".".to_string()),
        exclusions: file.analysis.exclusions,
    };
    validate_exclusions(&analysis.exclusions)?;

    let scanner = ScannerConfig {
        template: file
            .scanner
            .template
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/usr/local/share/trivy/templates/html.tpl")),
        report_file: file
            .scanner
            .report_file
            .unwrap_or_else(|| "trivy-report.html".to_string()),
    };

    let mail = MailConfig {
        endpoint: env_or(
            "MAIL_ENDPOINT",
            file.mail.endpoint,
            "http://localhost:8025/api/send",
        ),
        token: std::env::var("MAIL_TOKEN").ok().or(file.mail.token),
        from: file
            .mail
            .from
            .unwrap_or_else(|| "shiprun@localhost".to_string()),
        to: file.mail.to,
    };

    let build = BuildConfig {
        job_name: env_or("JOB_NAME", file.build.job_name, "shiprun"),
        build_number: env_or("BUILD_NUMBER", file.build.build_number, "0"),
        build_url: env_or("BUILD_URL", file.build.build_url, ""),
    };

    let limits = Limits {
        stage_timeout_seconds: file.limits.stage_timeout_seconds.unwrap_or(900),
    };

    Ok(ResolvedConfig {
        home,
        config_file: config_path,
        analysis,
        image,
        scanner,
        mail,
        build,
        limits,
    })
}

fn redact(secret: &str) -> &str {
    if secret.is_empty() {
        "(unset)"
    } else {
        "***"
    }
}

impl fmt::Display for ResolvedConfig {
    /// Human-readable dump for `shiprun config`; secrets redacted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "home: {}", self.home.display())?;
        match self.config_file {
            Some(ref path) => writeln!(f, "config file: {}", path.display())?,
            None => writeln!(f, "config file: (none)")?,
        }
        writeln!(f, "analysis:")?;
        writeln!(f, "  server_url: {}", self.analysis.server_url)?;
        writeln!(f, "  token: {}", redact(&self.analysis.token))?;
        writeln!(f, "  project_key: {}", self.analysis.project_key)?;
        writeln!(f, "  exclusions: {}", self.analysis.exclusions.join(", "))?;
        writeln!(f, "image:")?;
        writeln!(f, "  base_name: {}", self.image.base_name)?;
        writeln!(f, "  context_dir: {}", self.image.context_dir)?;
        writeln!(f, "scanner:")?;
        writeln!(f, "  template: {}", self.scanner.template.display())?;
        writeln!(f, "  report_file: {}", self.scanner.report_file)?;
        writeln!(f, "mail:")?;
        writeln!(f, "  endpoint: {}", self.mail.endpoint)?;
        writeln!(
            f,
            "  token: {}",
            redact(self.mail.token.as_deref().unwrap_or(""))
        )?;
        writeln!(f, "  from: {}", self.mail.from)?;
        writeln!(f, "  to: {}", self.mail.to.join(", "))?;
        writeln!(f, "build:")?;
        writeln!(f, "  job_name: {}", self.build.job_name)?;
        writeln!(f, "  build_number: {}", self.build.build_number)?;
        writeln!(f, "  build_url: {}", self.build.build_url)?;
        writeln!(
            f,
            "limits:\n  stage_timeout_seconds: {}",
            self.limits.stage_timeout_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ConfigFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_minimal_config_file_parses() {
        let file = parse("version: \"1.0\"\n");
        assert_eq!(file.version, "1.0");
        assert!(file.analysis.server_url.is_none());
    }

    #[test]
    fn test_full_config_file_parses() {
        let file = parse(
            r#"
version: "1.0"
paths:
  home: ./state
analysis:
  server_url: https://sonar.example.com
  token: secret
  project_key: hello
  exclusions:
    - "**/node_modules/**"
image:
  base_name: hello-world-nodejs
scanner:
  report_file: scan.html
mail:
  endpoint: https://mail.example.com/send
  from: ci@example.com
  to:
    - team@example.com
build:
  job_name: hello-release
limits:
  stage_timeout_seconds: 600
"#,
        );

        assert_eq!(file.paths.home.as_deref(), Some("./state"));
        assert_eq!(
            file.analysis.server_url.as_deref(),
            Some("https://sonar.example.com")
        );
        assert_eq!(file.image.base_name.as_deref(), Some("hello-world-nodejs"));
        assert_eq!(file.mail.to, vec!["team@example.com"]);
        assert_eq!(file.limits.stage_timeout_seconds, Some(600));
    }

    #[test]
    fn test_invalid_exclusion_pattern_rejected() {
        assert!(validate_exclusions(&["**/node_modules/**".to_string()]).is_ok());
        assert!(validate_exclusions(&["a[".to_string()]).is_err());
    }

    #[test]
    fn test_resolve_relative_home() {
        let file = parse("version: \"1.0\"\npaths:\n  home: ./state\n");
        let config = resolve(
            file,
            Some(PathBuf::from("/proj/.shiprun/config.yaml")),
            PathBuf::from("/fallback/.shiprun"),
        )
        .unwrap();

        assert_eq!(config.home, PathBuf::from("/proj/./state"));
    }

    #[test]
    fn test_display_redacts_secrets() {
        let file = parse("version: \"1.0\"\nanalysis:\n  token: hunter2\n");
        let config = resolve(file, None, PathBuf::from("/tmp/.shiprun")).unwrap();
        let rendered = config.to_string();

        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***") || rendered.contains("(unset)"));
    }
}
