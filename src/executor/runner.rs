//! Single-issue execution
//!
//! Runs exactly one issue command to completion and resolves every failure
//! mode into an [`Outcome`]; nothing escapes this module as an error.

use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::registry::ProcessRegistry;
use crate::models::{IssueSpec, Outcome, OutputChunk, StreamKind};
use crate::utils::Timer;

/// Exit code reported when the command cannot be spawned at all
const SPAWN_FAILURE_CODE: i32 = 127;

/// Cap on waiting for the stream readers after the child has settled
///
/// The pipes close when the child exits or is killed, so the readers finish
/// almost immediately; the cap only guards against a wedged descriptor.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Read buffer size per output stream
const READ_BUF_SIZE: usize = 4096;

/// Execute one issue and return its outcome
///
/// The child runs in the issue directory with `CI=true` merged over the
/// parent environment. Output is captured from spawn until exit, one chunk
/// per read event, per-stream order preserved. The timeout clock starts at
/// spawn; whichever of process-exit and timer-expiry settles first wins, and
/// the loser is cancelled.
pub async fn run_issue(spec: IssueSpec, registry: ProcessRegistry) -> Outcome {
    let timer = Timer::start(&spec.name);

    let mut child = match shell_command(&spec).spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!("{}: failed to spawn: {err}", spec.name);
            let chunks = vec![OutputChunk::stderr(format!("failed to spawn: {err}\n"))];
            return Outcome::failure(spec, SPAWN_FAILURE_CODE, chunks, timer.elapsed_ms());
        }
    };

    let pid = child.id();
    if let Some(pid) = pid {
        registry.register(pid, &spec.name);
    }

    // One channel, two senders: chunks arrive tagged in read order, and each
    // reader's sequential sends keep per-stream ordering intact.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let stdout_reader = child
        .stdout
        .take()
        .map(|out| tokio::spawn(read_chunks(out, StreamKind::Stdout, tx.clone())));
    let stderr_reader = child
        .stderr
        .take()
        .map(|err| tokio::spawn(read_chunks(err, StreamKind::Stderr, tx.clone())));
    drop(tx);

    let mut timed_out = false;
    let status = match timeout(spec.timeout(), child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            timed_out = true;
            debug!("{}: timed out after {:?}; killing", spec.name, spec.timeout());
            if let Err(err) = child.kill().await {
                warn!("{}: failed to kill timed-out process: {err}", spec.name);
            }
            child.wait().await
        }
    };

    if let Some(pid) = pid {
        registry.deregister(pid);
    }

    drain_reader(stdout_reader, &spec.name, "stdout").await;
    drain_reader(stderr_reader, &spec.name, "stderr").await;

    let mut chunks = Vec::new();
    while let Some(chunk) = rx.recv().await {
        chunks.push(chunk);
    }

    let duration_ms = timer.elapsed_ms();

    if timed_out {
        debug!("{}: timeout, {} chunk(s) retained", spec.name, chunks.len());
        return Outcome::timeout(spec, chunks, duration_ms);
    }

    match status {
        Ok(status) if status.success() => Outcome::success(spec, chunks, duration_ms),
        Ok(status) => {
            // code() is None when the child died to a signal
            let code = status.code().unwrap_or(-1);
            Outcome::failure(spec, code, chunks, duration_ms)
        }
        Err(err) => {
            warn!("{}: wait failed: {err}", spec.name);
            chunks.push(OutputChunk::stderr(format!("wait failed: {err}\n")));
            Outcome::failure(spec, -1, chunks, duration_ms)
        }
    }
}

/// Build the platform shell invocation for an issue command
fn shell_command(spec: &IssueSpec) -> Command {
    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&spec.command);
        cmd
    };

    #[cfg(not(unix))]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&spec.command);
        cmd
    };

    cmd.current_dir(&spec.dir)
        .env("CI", "true")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Forward read events from one stream into the chunk channel
async fn read_chunks<R>(mut reader: R, stream: StreamKind, tx: mpsc::UnboundedSender<OutputChunk>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let data = String::from_utf8_lossy(&buf[..n]).into_owned();
                if tx.send(OutputChunk { stream, data }).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

async fn drain_reader(reader: Option<JoinHandle<()>>, issue: &str, stream: &str) {
    let Some(mut reader) = reader else {
        return;
    };

    match timeout(DRAIN_TIMEOUT, &mut reader).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("{issue}: {stream} reader failed: {err}"),
        Err(_) => {
            warn!("{issue}: {stream} reader did not finish; aborting");
            reader.abort();
        }
    }
}
