//! Notification Integration Tests
//!
//! Rendering and dispatch behavior over finalized runs.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use shiprun::adapters::{MailError, MailMessage, Mailer};
use shiprun::config::BuildConfig;
use shiprun::core::StageId;
use shiprun::domain::{Environment, PipelineRun, ReleaseParameters, StageOutcome};
use shiprun::notify::{
    render_notification_body, render_subject, NotificationContext, NotificationDispatcher,
    FAILURE_COLOR, SUCCESS_COLOR,
};

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn build() -> BuildConfig {
    BuildConfig {
        job_name: "hello-world-release".to_string(),
        build_number: "12".to_string(),
        build_url: "https://ci.example.com/job/hello-world-release/12/".to_string(),
    }
}

fn run_with_status(fail: bool) -> PipelineRun {
    let params = ReleaseParameters::new("2.0.1", "https://example.com/app.git", Environment::Staging)
        .with_branch("release/2.0");
    let mut run = PipelineRun::new(params, "hello-world-nodejs");

    run.record(StageId::VersionCheck, StageOutcome::Success, 0);
    if fail {
        run.record(
            StageId::Checkout,
            StageOutcome::HardFailure {
                reason: "clone failed".to_string(),
            },
            120,
        );
    }
    run.finalize();
    run
}

#[test]
fn test_success_body_uses_success_color_and_label() {
    let ctx = NotificationContext::from_run(&run_with_status(false), &build());
    let body = render_notification_body(&ctx);

    assert!(body.contains(SUCCESS_COLOR));
    assert!(!body.contains(FAILURE_COLOR));
    assert!(body.contains("SUCCESS"));
}

#[test]
fn test_failure_body_uses_failure_color_and_label() {
    let ctx = NotificationContext::from_run(&run_with_status(true), &build());
    let body = render_notification_body(&ctx);

    assert!(body.contains(FAILURE_COLOR));
    assert!(body.contains("FAILURE"));
}

#[test]
fn test_body_lists_run_details_and_build_link() {
    let ctx = NotificationContext::from_run(&run_with_status(false), &build());
    let body = render_notification_body(&ctx);

    assert!(body.contains("hello-world-release"));
    assert!(body.contains("#12"));
    assert!(body.contains("release/2.0"));
    assert!(body.contains("staging"));
    assert!(body.contains("2.0.1"));
    assert!(body.contains("https://ci.example.com/job/hello-world-release/12/"));
}

#[test]
fn test_subject_leads_with_status() {
    let success = NotificationContext::from_run(&run_with_status(false), &build());
    let failure = NotificationContext::from_run(&run_with_status(true), &build());

    assert!(render_subject(&success).starts_with("SUCCESS: hello-world-release"));
    assert!(render_subject(&failure).starts_with("FAILURE: hello-world-release"));
}

#[tokio::test]
async fn test_dispatch_sends_once_when_enabled() {
    let mailer = RecordingMailer::default();
    let dispatcher = NotificationDispatcher::new(
        Box::new(mailer.clone()),
        "ci@example.com".to_string(),
        vec!["team@example.com".to_string()],
        build(),
    );

    dispatcher.dispatch(&run_with_status(false), true).await;

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "ci@example.com");
    assert_eq!(sent[0].to, vec!["team@example.com"]);
}

#[tokio::test]
async fn test_dispatch_is_noop_when_disabled() {
    let mailer = RecordingMailer::default();
    let dispatcher = NotificationDispatcher::new(
        Box::new(mailer.clone()),
        "ci@example.com".to_string(),
        vec!["team@example.com".to_string()],
        build(),
    );

    dispatcher.dispatch(&run_with_status(true), false).await;

    assert!(mailer.sent.lock().unwrap().is_empty());
}
