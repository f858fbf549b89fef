//! Report archiving and publication.
//!
//! The vulnerability scan may or may not leave an HTML report behind; the
//! publisher checks for the artifact itself rather than trusting the scan
//! stage's outcome, archives what it finds, and registers a browsable copy
//! under a stable name. Publishing never fails the run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Artifact storage fault. Always soft: the publisher logs and skips.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Storage for run artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Whether an artifact exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Copy the artifact into the run's archive, returning the archived path
    async fn archive(&self, path: &Path, run_id: Uuid) -> Result<PathBuf, StoreError>;

    /// Register a browsable copy of the artifact under `name`
    async fn publish_report(&self, path: &Path, name: &str) -> Result<PathBuf, StoreError>;
}

/// Filesystem store rooted at the shiprun home directory.
///
/// Layout:
/// - `<home>/archive/<run-id>/` — per-run archived artifacts
/// - `<home>/reports/` — published reports under their stable names
pub struct FsArtifactStore {
    home: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `home`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    async fn copy_into(
        &self,
        dir: &Path,
        src: &Path,
        file_name: &str,
    ) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let dest = dir.join(file_name);
        tokio::fs::copy(src, &dest)
            .await
            .map_err(|source| StoreError::Io {
                path: src.to_path_buf(),
                source,
            })?;

        Ok(dest)
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn archive(&self, path: &Path, run_id: Uuid) -> Result<PathBuf, StoreError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let dir = self.home.join("archive").join(run_id.to_string());

        self.copy_into(&dir, path, &file_name).await
    }

    async fn publish_report(&self, path: &Path, name: &str) -> Result<PathBuf, StoreError> {
        let dir = self.home.join("reports");
        self.copy_into(&dir, path, name).await
    }
}

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishResult {
    /// Report found, archived, and registered for browsing
    Published { archived: PathBuf, report: PathBuf },

    /// No report present, or storage failed; run unaffected
    Skipped,
}

/// Publishes the scan report after the stage sequence, best-effort
pub struct ReportPublisher {
    store: Box<dyn ArtifactStore>,
    report_name: String,
}

impl ReportPublisher {
    /// Create a publisher that registers reports under `report_name`
    pub fn new(store: Box<dyn ArtifactStore>, report_name: impl Into<String>) -> Self {
        Self {
            store,
            report_name: report_name.into(),
        }
    }

    /// Archive and register the report at `path` if it exists.
    ///
    /// Storage faults are logged and collapse to `Skipped`; they never
    /// escalate into the run's status.
    pub async fn publish(&self, path: &Path, run_id: Uuid) -> PublishResult {
        if !self.store.exists(path).await {
            info!(path = %path.display(), "no scan report found, skipping publication");
            return PublishResult::Skipped;
        }

        let archived = match self.store.archive(path, run_id).await {
            Ok(archived) => archived,
            Err(e) => {
                warn!(error = %e, "failed to archive scan report");
                return PublishResult::Skipped;
            }
        };

        match self.store.publish_report(path, &self.report_name).await {
            Ok(report) => {
                info!(report = %report.display(), "scan report published");
                PublishResult::Published { archived, report }
            }
            Err(e) => {
                warn!(error = %e, "failed to publish scan report");
                PublishResult::Skipped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_store_exists() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FsArtifactStore::new(temp.path());

        let report = temp.path().join("report.html");
        assert!(!store.exists(&report).await);

        tokio::fs::write(&report, "<html></html>").await.unwrap();
        assert!(store.exists(&report).await);
    }

    #[tokio::test]
    async fn test_archive_copies_under_run_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let run_id = Uuid::new_v4();
        let store = FsArtifactStore::new(temp.path());

        let report = temp.path().join("report.html");
        tokio::fs::write(&report, "<html></html>").await.unwrap();

        let archived = store.archive(&report, run_id).await.unwrap();
        assert!(archived.starts_with(temp.path().join("archive").join(run_id.to_string())));
        assert_eq!(
            tokio::fs::read_to_string(&archived).await.unwrap(),
            "<html></html>"
        );
    }

    #[tokio::test]
    async fn test_publish_report_uses_stable_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = FsArtifactStore::new(temp.path());

        let report = temp.path().join("trivy-out.html");
        tokio::fs::write(&report, "<html></html>").await.unwrap();

        let published = store
            .publish_report(&report, "vulnerability-report.html")
            .await
            .unwrap();
        assert_eq!(
            published,
            temp.path().join("reports").join("vulnerability-report.html")
        );
    }

    #[tokio::test]
    async fn test_publisher_skips_missing_report() {
        let temp = tempfile::TempDir::new().unwrap();
        let publisher = ReportPublisher::new(
            Box::new(FsArtifactStore::new(temp.path())),
            "vulnerability-report.html",
        );

        let missing = temp.path().join("nope.html");
        let result = publisher.publish(&missing, Uuid::new_v4()).await;
        assert_eq!(result, PublishResult::Skipped);
    }

    #[tokio::test]
    async fn test_publisher_publishes_existing_report() {
        let temp = tempfile::TempDir::new().unwrap();
        let publisher = ReportPublisher::new(
            Box::new(FsArtifactStore::new(temp.path())),
            "vulnerability-report.html",
        );

        let report = temp.path().join("trivy-report.html");
        tokio::fs::write(&report, "<html></html>").await.unwrap();

        match publisher.publish(&report, Uuid::new_v4()).await {
            PublishResult::Published { report: published, .. } => {
                assert!(published.ends_with("reports/vulnerability-report.html"));
            }
            PublishResult::Skipped => panic!("expected publication"),
        }
    }
}
