// src/report/mod.rs
// =============================================================================
// This module decides where reports go and writes them there.
//
// Submodules:
// - path: file names and timestamped directory names
// - writer: writes a rendered audit document to disk
// =============================================================================

mod path;
mod writer;

pub use path::{a11y_directory, run_directory, run_timestamp};
pub use writer::ReportWriter;
