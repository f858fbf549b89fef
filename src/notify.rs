//! Outcome notifications.
//!
//! Rendering is a pure function over a read-only projection of the
//! finalized run, so the HTML body is testable without a transport. The
//! dispatcher sends through the `Mailer` collaborator and swallows
//! transport faults: a notification failure must never mask or alter the
//! run's already-finalized status.

use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{MailMessage, Mailer};
use crate::config::BuildConfig;
use crate::domain::{PipelineRun, RunStatus};

/// Accent color for successful runs
pub const SUCCESS_COLOR: &str = "#2e7d32";

/// Accent color for failed runs
pub const FAILURE_COLOR: &str = "#c62828";

/// Read-only projection of the fields a notification renders
#[derive(Debug, Clone, Serialize)]
pub struct NotificationContext {
    pub job_name: String,
    pub build_number: String,
    pub branch: String,
    pub environment: String,
    pub version: String,
    pub build_url: String,
    pub status: RunStatus,
}

impl NotificationContext {
    /// Project a finalized run plus build metadata into render inputs
    pub fn from_run(run: &PipelineRun, build: &BuildConfig) -> Self {
        Self {
            job_name: build.job_name.clone(),
            build_number: build.build_number.clone(),
            branch: run.parameters.branch.clone(),
            environment: run.parameters.environment.to_string(),
            version: run.parameters.release_version.clone(),
            build_url: build.build_url.clone(),
            status: run.status,
        }
    }

    /// Accent color keyed by status
    pub fn accent_color(&self) -> &'static str {
        match self.status {
            RunStatus::Failure => FAILURE_COLOR,
            _ => SUCCESS_COLOR,
        }
    }
}

/// Subject line: status first so inbox triage needs no opening
pub fn render_subject(ctx: &NotificationContext) -> String {
    format!(
        "{}: {} #{} ({} {})",
        ctx.status.label(),
        ctx.job_name,
        ctx.build_number,
        ctx.environment,
        ctx.version
    )
}

/// Render the HTML notification body.
///
/// Pure function: same context, same markup.
pub fn render_notification_body(ctx: &NotificationContext) -> String {
    let color = ctx.accent_color();
    let label = ctx.status.label();

    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; margin: 0; padding: 16px;">
  <div style="border-left: 6px solid {color}; padding: 8px 16px;">
    <h2 style="color: {color}; margin: 0 0 12px 0;">{label}</h2>
    <table cellpadding="4" cellspacing="0">
      <tr><td><b>Project</b></td><td>{job}</td></tr>
      <tr><td><b>Build</b></td><td>#{build}</td></tr>
      <tr><td><b>Branch</b></td><td>{branch}</td></tr>
      <tr><td><b>Environment</b></td><td>{env}</td></tr>
      <tr><td><b>Version</b></td><td>{version}</td></tr>
    </table>
    <p style="margin-top: 12px;">
      <a href="{url}">Open the build log</a>
    </p>
  </div>
</body>
</html>"#,
        color = color,
        label = label,
        job = ctx.job_name,
        build = ctx.build_number,
        branch = ctx.branch,
        env = ctx.environment,
        version = ctx.version,
        url = ctx.build_url,
    )
}

/// Sends the outcome notification, once per run, after finalization
pub struct NotificationDispatcher {
    mailer: Box<dyn Mailer>,
    from: String,
    to: Vec<String>,
    build: BuildConfig,
}

impl NotificationDispatcher {
    /// Create a dispatcher bound to a transport and addressing
    pub fn new(mailer: Box<dyn Mailer>, from: String, to: Vec<String>, build: BuildConfig) -> Self {
        Self {
            mailer,
            from,
            to,
            build,
        }
    }

    /// Compose and send the notification for a finalized run.
    ///
    /// No-op when `enabled` is false. Transport errors are logged and
    /// dropped; the run's status is already frozen and stays that way.
    pub async fn dispatch(&self, run: &PipelineRun, enabled: bool) {
        if !enabled {
            info!("notification disabled for this run");
            return;
        }

        let ctx = NotificationContext::from_run(run, &self.build);
        let message = MailMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: render_subject(&ctx),
            html_body: render_notification_body(&ctx),
        };

        match self.mailer.send(&message).await {
            Ok(()) => info!(status = ctx.status.label(), "notification sent"),
            Err(e) => warn!(error = %e, "failed to send notification"),
        }
    }
}
