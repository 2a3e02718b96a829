//! Execution outcomes and run reports
//!
//! Defines the captured-output and result types produced by the executor.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::issue::IssueSpec;

/// Exit code reported for issues that hit their timeout
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Which output stream a chunk was read from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One captured fragment of child output, tagged with its stream
///
/// Chunks are appended in arrival order. Order within a single stream is
/// preserved; no ordering is guaranteed between stdout and stderr.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputChunk {
    pub stream: StreamKind,
    pub data: String,
}

impl OutputChunk {
    pub fn stdout(data: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stdout,
            data: data.into(),
        }
    }

    pub fn stderr(data: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stderr,
            data: data.into(),
        }
    }
}

/// Terminal status of one issue execution
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "exit_code")]
pub enum OutcomeStatus {
    Success,
    Failure(i32),
    Timeout,
}

impl OutcomeStatus {
    /// Exit code to report for this status
    pub fn code(&self) -> i32 {
        match self {
            OutcomeStatus::Success => 0,
            OutcomeStatus::Failure(code) => *code,
            OutcomeStatus::Timeout => TIMEOUT_EXIT_CODE,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "✓",
            OutcomeStatus::Failure(_) => "✗",
            OutcomeStatus::Timeout => "⏱",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Success => write!(f, "PASS"),
            OutcomeStatus::Failure(code) => write!(f, "FAIL({code})"),
            OutcomeStatus::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// Result of running one issue
///
/// Exactly one outcome is produced per issue, on every path: normal exit,
/// non-zero exit, timeout, or spawn failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Outcome {
    pub spec: IssueSpec,
    pub status: OutcomeStatus,
    pub chunks: Vec<OutputChunk>,
    pub duration_ms: u64,
}

impl Outcome {
    pub fn success(spec: IssueSpec, chunks: Vec<OutputChunk>, duration_ms: u64) -> Self {
        Self {
            spec,
            status: OutcomeStatus::Success,
            chunks,
            duration_ms,
        }
    }

    pub fn failure(spec: IssueSpec, code: i32, chunks: Vec<OutputChunk>, duration_ms: u64) -> Self {
        Self {
            spec,
            status: OutcomeStatus::Failure(code),
            chunks,
            duration_ms,
        }
    }

    pub fn timeout(spec: IssueSpec, chunks: Vec<OutputChunk>, duration_ms: u64) -> Self {
        Self {
            spec,
            status: OutcomeStatus::Timeout,
            chunks,
            duration_ms,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.spec.name,
            self.duration_ms
        )
    }
}

/// Aggregate over all outcomes of one run
///
/// `outcomes` preserves submission order regardless of completion order, so
/// reports are reproducible across runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    pub fn new(started_at: DateTime<Utc>, outcomes: Vec<Outcome>) -> Self {
        let total = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.status.is_success()).count();

        Self {
            started_at,
            total,
            succeeded,
            outcomes,
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.succeeded == self.total
    }

    /// Outcomes that did not reach success, in submission order
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PASS: {} tests out of {} passed successfully.",
            self.succeeded, self.total
        )
    }
}
