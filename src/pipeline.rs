// src/pipeline.rs
// =============================================================================
// One audit run, end to end.
//
// Steps:
// 1. Ask the URL source (the crawler) for every page of the site
// 2. Create the timestamped run directory
// 3. Build one task per (URL, audit profile) pair: audit, then write
// 4. Run the tasks through the bounded scheduler
// 5. Summarize what was written and what failed
//
// A failing audit never stops the run. Failures are logged as they happen
// and listed in the summary.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};
use url::Url;

use crate::audit::{AuditProfile, Auditor, FormFactor};
use crate::crawl::UrlSource;
use crate::report::{run_directory, run_timestamp, ReportWriter};
use crate::scheduler::run_bounded;

/// Everything one run needs, fixed for its whole lifetime.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub root_url: Url,
    pub output_dir: PathBuf,
    /// Audits in flight at once
    pub concurrency: usize,
    pub profiles: Vec<AuditProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenReport {
    pub url: String,
    pub form_factor: FormFactor,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedAudit {
    pub url: String,
    pub form_factor: FormFactor,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_dir: PathBuf,
    /// Every URL the crawl produced
    pub urls: Vec<String>,
    pub written: Vec<WrittenReport>,
    pub failures: Vec<FailedAudit>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// One scheduled unit of work
struct Job {
    url: Url,
    profile: AuditProfile,
}

pub struct Pipeline<S, A> {
    config: PipelineConfig,
    source: S,
    auditor: Arc<A>,
}

impl<S, A> Pipeline<S, A>
where
    S: UrlSource,
    A: Auditor + 'static,
{
    pub fn new(config: PipelineConfig, source: S, auditor: A) -> Self {
        Self {
            config,
            source,
            auditor: Arc::new(auditor),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(&run_timestamp()).await
    }

    // Same as run(), with the run directory named after `timestamp`
    pub async fn run_at(&self, timestamp: &str) -> Result<RunSummary> {
        if self.config.profiles.is_empty() {
            bail!("no audit profiles configured");
        }

        let urls = self
            .source
            .discover(&self.config.root_url)
            .await
            .with_context(|| format!("crawling {}", self.config.root_url))?;
        info!(count = urls.len(), "discovered URLs");

        let writer = Arc::new(
            ReportWriter::create(run_directory(&self.config.output_dir, timestamp)).await?,
        );

        let jobs: Vec<Job> = urls
            .iter()
            .flat_map(|url| {
                self.config.profiles.iter().map(move |profile| Job {
                    url: url.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();

        info!(
            audits = jobs.len(),
            limit = self.config.concurrency,
            dir = %writer.dir().display(),
            "starting audits"
        );

        let tasks = jobs.iter().map(|job| {
            let auditor = Arc::clone(&self.auditor);
            let writer = Arc::clone(&writer);
            let url = job.url.clone();
            let profile = job.profile.clone();
            move || async move {
                let report = auditor
                    .audit(&url, &profile)
                    .await
                    .with_context(|| format!("auditing {} ({})", url, profile.form_factor))?;
                writer.write(&report).await?;
                Ok::<(), anyhow::Error>(())
            }
        });

        let batch = run_bounded(tasks, self.config.concurrency).await?;

        let failures: Vec<FailedAudit> = batch
            .failures
            .iter()
            .map(|failure| {
                let job = &jobs[failure.index];
                error!(url = %job.url, form_factor = %job.profile.form_factor, "{:#}", failure.error);
                FailedAudit {
                    url: job.url.to_string(),
                    form_factor: job.profile.form_factor,
                    message: format!("{:#}", failure.error),
                }
            })
            .collect();

        let failed: std::collections::HashSet<usize> =
            batch.failures.iter().map(|failure| failure.index).collect();
        let written = jobs
            .iter()
            .enumerate()
            .filter(|(index, _)| !failed.contains(index))
            .map(|(_, job)| WrittenReport {
                url: job.url.to_string(),
                form_factor: job.profile.form_factor,
                path: writer.path_for(&job.url, job.profile.form_factor),
            })
            .collect();

        if batch.is_success() {
            info!(succeeded = batch.succeeded, "done with all reports");
        } else {
            warn!(
                succeeded = batch.succeeded,
                failed = failures.len(),
                total = batch.total,
                "done with all reports, some audits failed"
            );
        }

        Ok(RunSummary {
            run_dir: writer.dir().to_path_buf(),
            urls: urls.iter().map(Url::to_string).collect(),
            written,
            failures,
        })
    }
}
