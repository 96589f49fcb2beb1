//! Background execution of shell commands.
//!
//! A job runs `sh -c <command>` on the tokio runtime. The worker task sends
//! output lines and the final status over a channel; the UI drains it with
//! [`ExecutionJob::poll`] once per tick and never blocks on the process.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::OPERATION_CHANNEL_SIZE;

/// Time allowed between SIGTERM and SIGKILL.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Errors raised while starting a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' has no output pipe")]
    NoOutput { command: String },
}

/// Message sent from the worker to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Line(String),
    Finished(i32),
    Failed(String),
}

/// Lifecycle of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Finished(i32),
    Failed(String),
}

/// A running or completed shell command and the output seen so far.
///
/// Dropping the job cancels the process if it is still running.
#[derive(Debug)]
pub struct ExecutionJob {
    command: String,
    label: String,
    status: JobStatus,
    lines: Vec<String>,
    rx: mpsc::Receiver<JobEvent>,
    cancel: CancellationToken,
}

impl ExecutionJob {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_running(&self) -> bool {
        self.status == JobStatus::Running
    }

    /// Whether the command ran to completion with exit code 0.
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Finished(0)
    }

    /// Header line for the output popup.
    pub fn header(&self) -> String {
        match &self.status {
            JobStatus::Running => format!("{} (running)", self.label),
            JobStatus::Finished(code) => format!("{} (exit {code})", self.label),
            JobStatus::Failed(reason) => format!("{} (failed: {reason})", self.label),
        }
    }

    /// Drain pending events without blocking. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
            changed = true;
        }
        changed
    }

    /// Wait until the worker reports completion.
    pub async fn wait(&mut self) -> &JobStatus {
        while self.is_running() {
            match self.rx.recv().await {
                Some(event) => self.apply(event),
                None => {
                    self.status = JobStatus::Failed("worker exited".into());
                }
            }
        }
        &self.status
    }

    fn apply(&mut self, event: JobEvent) {
        match event {
            JobEvent::Line(line) => self.lines.push(line),
            JobEvent::Finished(code) => self.status = JobStatus::Finished(code),
            JobEvent::Failed(reason) => self.status = JobStatus::Failed(reason),
        }
    }

    /// Request termination: SIGTERM, then SIGKILL after the grace period.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ExecutionJob {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start `command` through `sh -c` in `cwd`.
///
/// Must be called from within a tokio runtime.
pub fn start_job(command: &str, cwd: &Path) -> Result<ExecutionJob, JobError> {
    start_job_with_grace(command, cwd, TERMINATE_GRACE)
}

/// [`start_job`] with an explicit SIGTERM grace period.
pub fn start_job_with_grace(
    command: &str,
    cwd: &Path,
    grace: Duration,
) -> Result<ExecutionJob, JobError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| JobError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(JobError::NoOutput {
            command: command.to_string(),
        });
    };

    info!(command, cwd = %cwd.display(), pid = ?child.id(), "Job started");

    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let name = command.to_string();

    tokio::spawn(async move {
        let mut out = BufReader::new(stdout).lines();
        let mut err = BufReader::new(stderr).lines();
        let (mut out_done, mut err_done) = (false, false);

        while !(out_done && err_done) {
            let line = tokio::select! {
                _ = token.cancelled() => {
                    terminate(&mut child, grace).await;
                    let _ = tx.send(JobEvent::Failed("cancelled".into())).await;
                    info!(command = %name, "Job cancelled");
                    return;
                }
                line = out.next_line(), if !out_done => match line {
                    Ok(Some(line)) => Some(line),
                    _ => { out_done = true; None }
                },
                line = err.next_line(), if !err_done => match line {
                    Ok(Some(line)) => Some(line),
                    _ => { err_done = true; None }
                },
            };
            if let Some(line) = line {
                if tx.send(JobEvent::Line(line)).await.is_err() {
                    debug!(command = %name, "Job output receiver dropped");
                }
            }
        }

        let waited = tokio::select! {
            _ = token.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let event = match waited {
            None => {
                terminate(&mut child, grace).await;
                JobEvent::Failed("cancelled".into())
            }
            Some(Ok(status)) => JobEvent::Finished(status.code().unwrap_or(-1)),
            Some(Err(e)) => JobEvent::Failed(e.to_string()),
        };
        info!(command = %name, ?event, "Job finished");
        let _ = tx.send(event).await;
    });

    Ok(ExecutionJob {
        command: command.to_string(),
        label: format!("! {command}"),
        status: JobStatus::Running,
        lines: Vec::new(),
        rx,
        cancel,
    })
}

async fn terminate(child: &mut Child, grace: Duration) {
    if let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) {
        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGTERM) {
            debug!(pid, error = %e, "SIGTERM failed");
        }
    }
    if tokio::time::timeout(grace, child.wait()).await.is_err() {
        warn!("Job ignored SIGTERM, killing");
        let _ = child.kill().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_job_streams_stdout_and_stderr() {
        let temp = TempDir::new().unwrap();
        let mut job = start_job("echo one; echo two 1>&2", temp.path()).unwrap();

        assert_eq!(job.wait().await, &JobStatus::Finished(0));
        job.poll();
        let mut lines = job.lines().to_vec();
        lines.sort();
        assert_eq!(lines, vec!["one", "two"]);
        assert!(job.succeeded());
        assert_eq!(job.header(), "! echo one; echo two 1>&2 (exit 0)");
    }

    #[tokio::test]
    async fn test_job_runs_in_cwd_and_reports_exit_code() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "").unwrap();
        let mut job = start_job("ls; exit 3", temp.path()).unwrap();

        assert_eq!(job.wait().await, &JobStatus::Finished(3));
        assert_eq!(job.lines(), ["marker"]);
        assert!(!job.succeeded());
    }

    #[tokio::test]
    async fn test_cancel_terminates_long_running_job() {
        let temp = TempDir::new().unwrap();
        let mut job =
            start_job_with_grace("sleep 30", temp.path(), Duration::from_millis(200)).unwrap();
        assert!(job.is_running());

        job.cancel();
        let status = tokio::time::timeout(Duration::from_secs(5), job.wait())
            .await
            .unwrap()
            .clone();
        assert_eq!(status, JobStatus::Failed("cancelled".into()));
    }

    #[tokio::test]
    async fn test_poll_without_events_reports_no_change() {
        let temp = TempDir::new().unwrap();
        let mut job = start_job("sleep 1", temp.path()).unwrap();
        assert!(!job.poll());
        assert_eq!(job.header(), "! sleep 1 (running)");
    }
}
