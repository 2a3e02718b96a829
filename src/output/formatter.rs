//! Report rendering
//!
//! Renders a [`RunReport`] to the console: failure banners with a faithful
//! replay of each issue's captured output, a one-line summary, or JSON.

use crate::models::{Outcome, RunReport, StreamKind};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render the report to stdout/stderr according to the selected format
    pub fn print_report(&self, report: &RunReport) {
        match self.format {
            OutputFormat::Table => {
                for outcome in report.failures() {
                    eprintln!("{}", failure_banner(outcome));
                    replay_chunks(outcome);
                }
                println!("{}", summary_line(report));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(report).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
            }
            OutputFormat::Summary => {
                println!("{}", summary_line(report));
            }
        }
    }
}

/// Banner printed above each failed issue's output
fn failure_banner(outcome: &Outcome) -> String {
    format!(
        "\n\n\nFAIL: {} exited with status code: {}.\n",
        outcome.spec.dir.display(),
        outcome.status.code()
    )
}

/// Replay captured chunks on the streams they came from
fn replay_chunks(outcome: &Outcome) {
    for chunk in &outcome.chunks {
        match chunk.stream {
            StreamKind::Stdout => println!("{}", chunk.data),
            StreamKind::Stderr => eprintln!("{}", chunk.data),
        }
    }
}

fn summary_line(report: &RunReport) -> String {
    report.to_string()
}
