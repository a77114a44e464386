// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - audit: crawl the site, then run Lighthouse on every page
// - a11y:  hand the site to the a11y machine for accessibility reports
//
// Every flag here is optional: when it is missing, the value comes from the
// config file (--config), and failing that from the built-in defaults.
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::audit::FormFactor;
use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "site-auditor",
    version,
    about = "Crawl a website and write Lighthouse / accessibility reports for every page",
    long_about = "site-auditor walks a website, runs an audit on every page it finds and writes \
                  the HTML reports into a timestamped directory. Audits run in parallel, \
                  but never more than --concurrency at a time."
)]
pub struct Cli {
    /// YAML config file (a missing file means "use the defaults")
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and run a Lighthouse audit on every page
    ///
    /// Example: site-auditor audit https://example.com --concurrency 2 --form-factor desktop
    Audit {
        /// Root URL to crawl (e.g., https://example.com)
        url: Option<String>,

        /// Directory that receives the timestamped run directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Maximum number of audits running at the same time
        #[arg(long)]
        concurrency: Option<usize>,

        /// Maximum crawl depth (0 = unlimited, 1 = just the root page)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Only audit with these form factors (repeatable)
        #[arg(long = "form-factor", value_enum)]
        form_factors: Vec<FormFactor>,

        /// Print the run summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the a11y machine (a11ym) against a website
    ///
    /// Example: site-auditor a11y https://example.com --maximum-urls 64
    A11y {
        /// Root URL to crawl (e.g., https://example.com)
        url: Option<String>,

        /// Directory that receives <host>/<timestamp>/
        #[arg(long)]
        output: Option<PathBuf>,

        /// Crawl depth handed to a11ym (0 = unlimited)
        #[arg(long)]
        maximum_depth: Option<usize>,

        /// Maximum number of URLs a11ym visits
        #[arg(long)]
        maximum_urls: Option<usize>,
    },
}
