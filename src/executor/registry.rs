//! Live child-process registry
//!
//! Tracks every spawned child for the duration of one run so an external
//! interrupt can terminate all of them before the orchestrator exits. The
//! registry is owned by the [`Orchestrator`](super::Orchestrator) and scoped
//! to a single run; nothing survives across runs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Shared set of live child pids, keyed to the issue that spawned them
///
/// Runners register at spawn time and deregister after reaping; the signal
/// watcher iterates and kills whatever is still registered.
#[derive(Clone, Debug, Default)]
pub struct ProcessRegistry {
    inner: Arc<Mutex<HashMap<u32, String>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a live child
    pub fn register(&self, pid: u32, issue: &str) {
        if let Ok(mut map) = self.inner.lock() {
            debug!("registered child pid {pid} for {issue}");
            map.insert(pid, issue.to_string());
        }
    }

    /// Remove a child after it has been reaped
    pub fn deregister(&self, pid: u32) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(&pid);
        }
    }

    /// Number of currently live children
    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forcibly terminate every registered child
    ///
    /// Returns the number of children signalled. Used on the hard-stop path,
    /// where runner tasks never get a chance to reap their own children.
    pub fn kill_all(&self) -> usize {
        let entries: Vec<(u32, String)> = match self.inner.lock() {
            Ok(mut map) => map.drain().collect(),
            Err(_) => return 0,
        };

        let mut killed = 0;
        for (pid, issue) in entries {
            if kill_pid(pid) {
                debug!("killed child pid {pid} ({issue})");
                killed += 1;
            } else {
                warn!("could not kill child pid {pid} ({issue})");
            }
        }
        killed
    }
}

#[cfg(unix)]
fn kill_pid(pid: u32) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGKILL).is_ok()
}

#[cfg(not(unix))]
fn kill_pid(_pid: u32) -> bool {
    false
}
