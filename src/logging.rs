// src/logging.rs
// =============================================================================
// Diagnostics go through `tracing`, printed to stderr so stdout stays clean
// for the summary table / JSON.
//
// Level selection:
// - SITE_AUDITOR_LOG, if set, wins (same syntax as RUST_LOG,
//   e.g. "site_auditor=debug,reqwest=warn")
// - otherwise -v / -vv raise the default level from info
// =============================================================================

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SITE_AUDITOR_LOG";

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "site_auditor=info",
        1 => "site_auditor=debug",
        _ => "site_auditor=trace,reqwest=debug",
    }
}

// Installs the global subscriber. Does nothing if one is already set
// (e.g. by a test harness).
pub fn init(verbosity: u8) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
