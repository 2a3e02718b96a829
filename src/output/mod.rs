//! Output formatting module
//!
//! Provides console and JSON rendering for run reports.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
