// src/audit/a11y.rs
// =============================================================================
// Accessibility reports through the a11y machine (`a11ym`).
//
// Unlike Lighthouse, a11ym crawls the site by itself and writes its own report
// tree, so there is nothing to schedule here: we pick the output directory,
// start the tool and wait for it.
// =============================================================================

use std::path::Path;

use tokio::process::Command;
use tracing::info;
use url::Url;

use super::AuditError;
use crate::config::A11yConfig;

#[derive(Debug, Clone)]
pub struct A11yRunner {
    binary: String,
    maximum_depth: usize,
    maximum_urls: usize,
}

impl A11yRunner {
    pub fn from_config(config: &A11yConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            maximum_depth: config.maximum_depth,
            maximum_urls: config.maximum_urls,
        }
    }

    fn command_args(&self, url: &Url, output_dir: &Path) -> Vec<String> {
        vec![
            "--output-directory".to_string(),
            output_dir.display().to_string(),
            "--maximum-depth".to_string(),
            self.maximum_depth.to_string(),
            "--maximum-urls".to_string(),
            self.maximum_urls.to_string(),
            url.to_string(),
        ]
    }

    // Runs a11ym against `url`, writing into `output_dir` (created if needed).
    // The tool's own progress output goes straight to our terminal.
    pub async fn run(&self, url: &Url, output_dir: &Path) -> Result<(), AuditError> {
        tokio::fs::create_dir_all(output_dir).await?;
        info!(%url, dir = %output_dir.display(), "crawling with a11ym");

        let status = Command::new(&self.binary)
            .args(self.command_args(url, output_dir))
            .status()
            .await
            .map_err(|source| AuditError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !status.success() {
            return Err(AuditError::Exited {
                binary: self.binary.clone(),
                status,
            });
        }
        Ok(())
    }
}
