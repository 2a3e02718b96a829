//! Issue specifications
//!
//! An issue is one declared test case: a command line, the directory it runs
//! in, and an optional timeout.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Global default timeout applied when an issue declares none (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// One declared issue, ready to execute
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueSpec {
    /// Issue name (the issue directory name, e.g. "42-nullable-join")
    pub name: String,

    /// Shell command line to execute
    pub command: String,

    /// Working directory the command runs in
    pub dir: PathBuf,

    /// Per-issue timeout in milliseconds; `None` uses the global default
    pub timeout_ms: Option<u64>,
}

impl IssueSpec {
    /// Create a new issue spec with the default timeout
    pub fn new(name: impl Into<String>, command: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            dir: dir.into(),
            timeout_ms: None,
        }
    }

    /// Set a per-issue timeout in milliseconds
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Effective timeout for this issue
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

impl fmt::Display for IssueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.command)
    }
}
