// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Load the config file and apply command-line overrides
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = success, 1 = some audits failed, 2 = error)
// =============================================================================

mod audit;     // src/audit/ - Lighthouse and a11ym runners
mod cli;       // src/cli.rs - command-line parsing
mod config;    // src/config.rs - YAML config file
mod crawl;     // src/crawl/ - website crawling
mod logging;   // src/logging.rs - tracing setup
mod pipeline;  // src/pipeline.rs - crawl, audit, write
mod report;    // src/report/ - report paths and files
mod scheduler; // src/scheduler.rs - bounded concurrency

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use audit::{A11yRunner, FormFactor, LighthouseAuditor};
use cli::{Cli, Commands};
use config::Config;
use crawl::Crawler;
use pipeline::{Pipeline, PipelineConfig, RunSummary};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every report was written
//   Ok(1) = at least one audit failed
//   Err   = could not run at all (bad config, crawl failure, ...)
async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Audit {
            url,
            output,
            concurrency,
            max_depth,
            form_factors,
            json,
        } => {
            let overrides = AuditOverrides {
                output,
                concurrency,
                max_depth,
                form_factors,
            };
            handle_audit(config, url.as_deref(), overrides, json).await
        }
        Commands::A11y {
            url,
            output,
            maximum_depth,
            maximum_urls,
        } => handle_a11y(config, url.as_deref(), output, maximum_depth, maximum_urls).await,
    }
}

// Command-line values for the 'audit' subcommand that win over the config file
struct AuditOverrides {
    output: Option<PathBuf>,
    concurrency: Option<usize>,
    max_depth: Option<usize>,
    form_factors: Vec<FormFactor>,
}

impl AuditOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        config.lighthouse.select_form_factors(&self.form_factors);
    }
}

// Handles the 'audit' subcommand
async fn handle_audit(
    mut config: Config,
    url: Option<&str>,
    overrides: AuditOverrides,
    json: bool,
) -> Result<i32> {
    overrides.apply(&mut config);
    config.validate()?;
    let root_url = config.resolve_root_url(url)?;

    if !json {
        println!("🔍 Crawling website: {}", root_url);
        println!("⚙️  Concurrency: {}", config.concurrency);
    }

    let crawler = Crawler::new(config.crawler.clone())?;
    let auditor = LighthouseAuditor::from_config(&config.lighthouse);
    let pipeline_config = PipelineConfig {
        root_url,
        output_dir: config.output_dir.clone(),
        concurrency: config.concurrency,
        profiles: config.lighthouse.profiles.clone(),
    };

    let summary = Pipeline::new(pipeline_config, crawler, auditor).run().await?;

    print_summary(&summary, json)?;

    if summary.is_success() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Handles the 'a11y' subcommand
async fn handle_a11y(
    mut config: Config,
    url: Option<&str>,
    output: Option<PathBuf>,
    maximum_depth: Option<usize>,
    maximum_urls: Option<usize>,
) -> Result<i32> {
    if let Some(output) = output {
        config.a11y.output_dir = output;
    }
    if let Some(depth) = maximum_depth {
        config.a11y.maximum_depth = depth;
    }
    if let Some(max) = maximum_urls {
        config.a11y.maximum_urls = max;
    }

    let root_url = config.resolve_root_url(url)?;
    let output_dir =
        report::a11y_directory(&config.a11y.output_dir, &root_url, &report::run_timestamp());

    println!("🔍 Crawling through {}", root_url);

    A11yRunner::from_config(&config.a11y)
        .run(&root_url, &output_dir)
        .await
        .with_context(|| format!("running a11ym on {}", root_url))?;

    println!("✅ Accessibility reports written to {}", output_dir.display());
    Ok(0)
}

// Prints the run summary either as a table or JSON
fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("📄 Crawled {} page(s)", summary.urls.len());
    println!();
    println!("{:<60} {:<10} {:<10}", "URL", "FORM", "STATUS");
    println!("{}", "=".repeat(82));

    for report in &summary.written {
        println!(
            "{:<60} {:<10} {:<10}",
            truncate(&report.url, 57),
            report.form_factor,
            "✅ OK"
        );
    }
    for failure in &summary.failures {
        println!(
            "{:<60} {:<10} {:<10}",
            truncate(&failure.url, 57),
            failure.form_factor,
            "❌ FAILED"
        );
        println!("    {}", failure.message);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Written: {}", summary.written.len());
    println!("   ❌ Failed: {}", summary.failures.len());
    println!("   📁 Reports: {}", summary.run_dir.display());
    Ok(())
}

// Shortens long URLs for the table, on a char boundary
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
