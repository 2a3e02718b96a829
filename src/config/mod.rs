//! Issue configuration
//!
//! Handles finding, parsing, and validating per-issue configuration files.

mod discover;
mod issue;

pub use discover::{discover_issues, Discovery};
pub use issue::IssueConfig;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading issue configuration
///
/// A config error never aborts the batch: the affected issue is skipped and
/// the run is marked failing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read issue config {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid issue config {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("issue config {path} declares an empty test command")]
    EmptyCommand { path: PathBuf },

    #[error("invalid discovery pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
