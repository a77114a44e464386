// src/report/path.rs
// =============================================================================
// Path building for reports.
//
// Layout:
//   <output_dir>/<timestamp>/<host>_<path>.<form factor>.report.html   (lighthouse)
//   <output_dir>/<host>/<timestamp>/...                                (a11ym)
//
// Timestamps are ISO 8601 with ':' and '.' swapped for '_' so the directory
// names are valid on every filesystem (Windows rejects ':').
// =============================================================================

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use crate::audit::FormFactor;

// Builds the report file name for a URL and form factor.
//
// Example:
//   https://example.com/path + desktop -> example.com_path.desktop.report.html
pub fn report_file_name(url: &str, form_factor: FormFactor) -> String {
    // Everything after the first "//" (the scheme is dropped)
    let without_scheme = url.split_once("//").map_or(url, |(_, rest)| rest);
    format!(
        "{}.{}.report.html",
        without_scheme.replace('/', "_"),
        form_factor
    )
}

pub fn sanitize_timestamp(timestamp: &str) -> String {
    timestamp.replace([':', '.'], "_")
}

// Current time as a filesystem-safe string, e.g. 2024-05-01T12_30_00_123Z
pub fn run_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    sanitize_timestamp(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn run_directory(output_dir: &Path, timestamp: &str) -> PathBuf {
    output_dir.join(sanitize_timestamp(timestamp))
}

pub fn a11y_directory(output_dir: &Path, root: &Url, timestamp: &str) -> PathBuf {
    let host = root.host_str().unwrap_or("unknown-host");
    output_dir.join(host).join(sanitize_timestamp(timestamp))
}
