// src/audit/mod.rs
// =============================================================================
// This module is the seam between our pipeline and the external audit tools.
//
// Submodules:
// - lighthouse: runs the Lighthouse CLI once per (URL, form factor)
// - a11y: hands a whole site walk to the a11y machine (`a11ym`)
//
// The pipeline only talks to the `Auditor` trait, so tests can swap in a fake
// auditor that never launches a browser.
// =============================================================================

mod a11y;
mod lighthouse;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use a11y::A11yRunner;
pub use lighthouse::LighthouseAuditor;

/// Device emulation used for an audit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    /// Lighthouse's own default
    #[default]
    Mobile,
    Desktop,
}

impl FormFactor {
    pub fn as_str(self) -> &'static str {
        match self {
            FormFactor::Mobile => "mobile",
            FormFactor::Desktop => "desktop",
        }
    }
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so table widths like {:<10} apply
        f.pad(self.as_str())
    }
}

/// One option bundle handed to the auditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditProfile {
    pub form_factor: FormFactor,
    /// Flags for the headless browser the audit tool launches
    pub chrome_flags: Vec<String>,
    /// Passed to the audit tool verbatim, after everything else
    pub extra_args: Vec<String>,
}

impl Default for AuditProfile {
    fn default() -> Self {
        Self::for_form_factor(FormFactor::default())
    }
}

impl AuditProfile {
    pub fn for_form_factor(form_factor: FormFactor) -> Self {
        Self {
            form_factor,
            chrome_flags: vec!["--headless".to_string()],
            extra_args: Vec::new(),
        }
    }
}

/// A rendered audit for one URL.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub url: Url,
    pub form_factor: FormFactor,
    /// The HTML report document
    pub document: String,
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to launch `{binary}`: {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{binary}` exited with {status}: {stderr}")]
    ToolFailed {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    // Tools that write straight to the terminal leave no stderr to report
    #[error("`{binary}` exited with {status}")]
    Exited {
        binary: String,
        status: std::process::ExitStatus,
    },

    #[error("audit of {url} produced an empty report")]
    EmptyReport { url: Url },

    #[error("audit of {url} timed out after {after:?}")]
    TimedOut { url: Url, after: Duration },

    #[error("I/O error while auditing: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs one audit and returns the rendered document.
#[async_trait]
pub trait Auditor: Send + Sync {
    async fn audit(&self, url: &Url, profile: &AuditProfile) -> Result<AuditReport, AuditError>;
}
