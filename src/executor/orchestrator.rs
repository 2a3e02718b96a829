//! Batch orchestration
//!
//! Fans out one runner per issue, survives individual failures, kills every
//! live child on an external interrupt, and aggregates outcomes into a
//! [`RunReport`].

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::registry::ProcessRegistry;
use super::runner::run_issue;
use crate::models::{IssueSpec, Outcome, RunReport};

/// Concurrent batch executor
///
/// Owns the live-process registry for the duration of one run. Independent
/// instances never share state, so concurrent batches in one process do not
/// interfere.
pub struct Orchestrator {
    registry: ProcessRegistry,
    max_concurrent: usize,
    handle_signals: bool,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            registry: ProcessRegistry::new(),
            max_concurrent: 0,
            handle_signals: false,
        }
    }

    /// Cap concurrent issue execution; 0 means unbounded
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Install the interrupt watcher for this run
    ///
    /// On Ctrl-C (or SIGTERM on unix) every registered child is killed and
    /// the process exits immediately; no partial report is produced.
    pub fn with_signal_handling(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Run the whole batch concurrently and aggregate one report
    ///
    /// All runners are launched together; an individual failure or timeout
    /// never cancels a sibling. `outcomes` preserves submission order even
    /// when later issues finish first.
    pub async fn run(&self, specs: Vec<IssueSpec>) -> RunReport {
        let started_at = Utc::now();

        if specs.is_empty() {
            return RunReport::new(started_at, Vec::new());
        }

        if self.handle_signals {
            tokio::spawn(watch_signals(self.registry.clone()));
        }

        info!("running {} issue(s)", specs.len());

        let semaphore = (self.max_concurrent > 0)
            .then(|| Arc::new(Semaphore::new(self.max_concurrent)));

        let mut submitted = Vec::with_capacity(specs.len());
        let mut handles = Vec::with_capacity(specs.len());

        for spec in specs {
            let registry = self.registry.clone();
            let semaphore = semaphore.clone();
            submitted.push(spec.clone());

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                run_issue(spec, registry).await
            }));
        }

        // Single join point: every runner settles, in submission order.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (spec, joined) in submitted.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!("{}: runner task failed: {err}", spec.name);
                    outcomes.push(Outcome::failure(spec, -1, Vec::new(), 0));
                }
            }
        }

        let report = RunReport::new(started_at, outcomes);
        info!("{}/{} issue(s) passed", report.succeeded, report.total);
        report
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

async fn watch_signals(registry: ProcessRegistry) {
    wait_for_termination().await;
    let killed = registry.kill_all();
    warn!("interrupted; killed {killed} live child process(es)");
    std::process::exit(130);
}

#[cfg(unix)]
async fn wait_for_termination() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("received interrupt signal"),
        _ = sigterm.recv() => info!("received terminate signal"),
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received interrupt signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutcomeStatus;
    use std::time::{Duration, Instant};

    fn spec(name: &str, command: &str) -> IssueSpec {
        IssueSpec::new(name, command, std::env::temp_dir())
    }

    #[test]
    fn empty_batch_yields_empty_passing_report() {
        let report = tokio_test::block_on(Orchestrator::new().run(Vec::new()));
        assert_eq!(report.total, 0);
        assert_eq!(report.succeeded, 0);
        assert!(report.is_all_passed());
    }

    #[tokio::test]
    async fn mixed_batch_aggregates_heterogeneous_outcomes() {
        let specs = vec![
            spec("1-pass", "exit 0"),
            spec("2-fail", "exit 1"),
            spec("3-slow", "sleep 10").with_timeout_ms(200),
        ];

        let report = Orchestrator::new().run(specs).await;

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 1);
        assert!(!report.is_all_passed());
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Failure(1));
        assert_eq!(report.outcomes[2].status, OutcomeStatus::Timeout);
    }

    #[tokio::test]
    async fn outcomes_keep_submission_order() {
        // The first issue finishes last; order must still match submission.
        let specs = vec![
            spec("1-slowest", "sleep 0.3; exit 0"),
            spec("2-instant", "exit 0"),
        ];

        let report = Orchestrator::new().run(specs).await;

        assert_eq!(report.outcomes[0].spec.name, "1-slowest");
        assert_eq!(report.outcomes[1].spec.name, "2-instant");
        assert!(report.is_all_passed());
    }

    #[tokio::test]
    async fn issues_run_concurrently() {
        let specs = vec![
            spec("1-sleep", "sleep 0.25"),
            spec("2-sleep", "sleep 0.25"),
            spec("3-sleep", "sleep 0.25"),
        ];

        let started = Instant::now();
        let report = Orchestrator::new().run(specs).await;

        assert!(report.is_all_passed());
        // Serial execution would take ~750ms.
        assert!(started.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn concurrency_cap_serializes_execution() {
        let specs = vec![spec("1-sleep", "sleep 0.2"), spec("2-sleep", "sleep 0.2")];

        let started = Instant::now();
        let report = Orchestrator::new().with_max_concurrent(1).run(specs).await;

        assert!(report.is_all_passed());
        assert!(started.elapsed() >= Duration::from_millis(380));
    }

    #[tokio::test]
    async fn registry_drains_after_run() {
        let orchestrator = Orchestrator::new();
        let report = orchestrator
            .run(vec![spec("1-a", "exit 0"), spec("2-b", "exit 1")])
            .await;

        assert_eq!(report.total, 2);
        assert!(orchestrator.registry().is_empty());
    }
}
