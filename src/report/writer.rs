// src/report/writer.rs
// =============================================================================
// Writes rendered audit documents into one run directory.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use super::path::report_file_name;
use crate::audit::{AuditReport, FormFactor};

#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    // Creates the run directory (and any missing parents) up front, so the
    // individual writes never race to create it.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating report directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the report for this URL and form factor is (or will be) written.
    pub fn path_for(&self, url: &Url, form_factor: FormFactor) -> PathBuf {
        self.dir.join(report_file_name(url.as_str(), form_factor))
    }

    pub async fn write(&self, report: &AuditReport) -> Result<PathBuf> {
        let path = self.path_for(&report.url, report.form_factor);
        tokio::fs::write(&path, report.document.as_bytes())
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        info!(url = %report.url, path = %path.display(), "Wrote {} report", report.form_factor);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_report() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ReportWriter::create(tmp.path().join("run").join("2024-01-01T00_00_00_000Z"))
            .await
            .unwrap();
        let report = AuditReport {
            url: Url::parse("https://example.com/path").unwrap(),
            form_factor: FormFactor::Desktop,
            document: "<html>report</html>".to_string(),
        };

        let path = writer.write(&report).await.unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "example.com_path.desktop.report.html"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>report</html>");
    }

    #[tokio::test]
    async fn test_write_into_removed_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gone");
        let writer = ReportWriter::create(&dir).await.unwrap();
        std::fs::remove_dir(&dir).unwrap();

        let report = AuditReport {
            url: Url::parse("https://example.com/").unwrap(),
            form_factor: FormFactor::Mobile,
            document: "x".to_string(),
        };

        assert!(writer.write(&report).await.is_err());
    }
}
