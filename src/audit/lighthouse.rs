// src/audit/lighthouse.rs
// =============================================================================
// Runs a Lighthouse audit by spawning the `lighthouse` command-line tool.
//
// Lighthouse launches its own headless Chrome, audits the page and renders the
// HTML report. We ask it to print that report on stdout and capture it.
//
// Command shape:
//   lighthouse <url> --output=html --output-path=stdout --quiet
//              --chrome-flags="--headless" --preset=desktop [extra args...]
// =============================================================================

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

use super::{AuditError, AuditProfile, AuditReport, Auditor, FormFactor};
use crate::config::LighthouseConfig;

#[derive(Debug, Clone)]
pub struct LighthouseAuditor {
    binary: String,
    timeout: Option<Duration>,
}

impl LighthouseAuditor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &LighthouseConfig) -> Self {
        Self {
            // Off by default: the scheduler never times tasks out on its own
            timeout: config.timeout_secs.map(Duration::from_secs),
            ..Self::new(config.binary.clone())
        }
    }

    // Builds the argument list for one audit (everything after the binary name)
    fn command_args(url: &Url, profile: &AuditProfile) -> Vec<String> {
        let mut args = vec![
            url.to_string(),
            "--output=html".to_string(),
            "--output-path=stdout".to_string(),
            "--quiet".to_string(),
        ];

        if !profile.chrome_flags.is_empty() {
            args.push(format!("--chrome-flags={}", profile.chrome_flags.join(" ")));
        }

        // Lighthouse emulates mobile unless told otherwise
        match profile.form_factor {
            FormFactor::Desktop => args.push("--preset=desktop".to_string()),
            FormFactor::Mobile => args.push("--form-factor=mobile".to_string()),
        }

        args.extend(profile.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl Auditor for LighthouseAuditor {
    async fn audit(&self, url: &Url, profile: &AuditProfile) -> Result<AuditReport, AuditError> {
        let args = Self::command_args(url, profile);
        debug!(binary = %self.binary, ?args, "launching audit");
        info!(%url, form_factor = %profile.form_factor, "auditing");

        // kill_on_drop makes sure a timed-out audit does not leave Chrome behind
        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AuditError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| AuditError::TimedOut {
                    url: url.clone(),
                    after: limit,
                })??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            return Err(AuditError::ToolFailed {
                binary: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let document = String::from_utf8_lossy(&output.stdout).into_owned();
        if document.trim().is_empty() {
            return Err(AuditError::EmptyReport { url: url.clone() });
        }

        Ok(AuditReport {
            url: url.clone(),
            form_factor: profile.form_factor,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/about").unwrap()
    }

    #[test]
    fn test_mobile_args() {
        let args = LighthouseAuditor::command_args(&url(), &AuditProfile::default());
        assert_eq!(
            args,
            vec![
                "https://example.com/about",
                "--output=html",
                "--output-path=stdout",
                "--quiet",
                "--chrome-flags=--headless",
                "--form-factor=mobile",
            ]
        );
    }

    #[test]
    fn test_desktop_args_with_extras() {
        let profile = AuditProfile {
            form_factor: FormFactor::Desktop,
            chrome_flags: vec!["--headless".into(), "--no-sandbox".into()],
            extra_args: vec!["--only-categories=accessibility".into()],
        };
        let args = LighthouseAuditor::command_args(&url(), &profile);
        assert!(args.contains(&"--chrome-flags=--headless --no-sandbox".to_string()));
        assert!(args.contains(&"--preset=desktop".to_string()));
        assert_eq!(args.last().unwrap(), "--only-categories=accessibility");
    }

    #[test]
    fn test_no_chrome_flags_omits_option() {
        let profile = AuditProfile {
            chrome_flags: Vec::new(),
            ..AuditProfile::default()
        };
        let args = LighthouseAuditor::command_args(&url(), &profile);
        assert!(!args.iter().any(|a| a.starts_with("--chrome-flags")));
    }

    // `echo` stands in for lighthouse: it prints its arguments and exits 0
    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_becomes_the_document() {
        let auditor = LighthouseAuditor::new("echo");
        let report = auditor.audit(&url(), &AuditProfile::default()).await.unwrap();
        assert!(report.document.contains("https://example.com/about"));
        assert_eq!(report.form_factor, FormFactor::Mobile);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let auditor = LighthouseAuditor::new("false");
        let err = auditor
            .audit(&url(), &AuditProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::ToolFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_launch_error() {
        let auditor = LighthouseAuditor::new("site-auditor-no-such-binary");
        let err = auditor
            .audit(&url(), &AuditProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Launch { .. }));
    }
}
