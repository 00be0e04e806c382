//! Launching external tools.
//!
//! A [`ProcessRunner`] never fails: launch errors, signals and timeouts all
//! come back as a [`ProcessResult`] with exit code `-1`, so the pipeline
//! treats them like any other failed stage.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use kexp_core::{ProcessResult, log_debug, log_warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

use crate::commands::ToolCommand;

/// Runs one command to completion in a working directory.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand, dir: &Path) -> ProcessResult;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill tools that run longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand, dir: &Path) -> ProcessResult {
        log_debug!("runner", argv = ?command.argv(), dir = %dir.display(), "Launching");
        let started = Instant::now();

        let mut child = match Command::new(&command.program)
            .args(&command.args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(error) => {
                log_warn!("runner", program = %command.program.display(), %error, "Launch failed");
                return ProcessResult::launch_failure(format!(
                    "Failed to launch {}: {error}",
                    command.program.display()
                ));
            }
        };

        let mut output = String::new();
        let finished = {
            let drained = drain(&mut child, &mut output);
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, drained).await.ok(),
                None => Some(drained.await),
            }
        };

        let exit_code = match finished {
            Some(Ok(status)) => status.code().unwrap_or(ProcessResult::NO_EXIT_CODE),
            Some(Err(error)) => {
                output.push_str(&format!("[{error}]\n"));
                ProcessResult::NO_EXIT_CODE
            }
            None => {
                let limit = self.timeout.unwrap_or_default();
                if let Err(error) = child.kill().await {
                    log_warn!("runner", %error, "Failed to kill timed out process");
                }
                output.push_str(&format!("[timed out after {}s]\n", limit.as_secs()));
                ProcessResult::NO_EXIT_CODE
            }
        };

        log_debug!(
            "runner",
            program = %command.program.display(),
            exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Finished"
        );
        ProcessResult::new(exit_code, output)
    }
}

/// Read stdout and stderr line by line as they arrive, then reap the child.
///
/// Lines are decoded lossily: tools such as `dexdump` print string constants
/// as raw MUTF-8, which must not end the capture.
async fn drain(child: &mut Child, output: &mut String) -> io::Result<ExitStatus> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("stdout not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("stderr not captured"))?;

    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    // Partial lines stay in these buffers if the other stream wins a select.
    let (mut stdout_line, mut stderr_line) = (Vec::new(), Vec::new());
    let (mut stdout_open, mut stderr_open) = (true, true);

    while stdout_open || stderr_open {
        tokio::select! {
            read = stdout.read_until(b'\n', &mut stdout_line), if stdout_open => {
                stdout_open = read? > 0;
                push_line(output, &mut stdout_line);
            }
            read = stderr.read_until(b'\n', &mut stderr_line), if stderr_open => {
                stderr_open = read? > 0;
                push_line(output, &mut stderr_line);
            }
        }
    }

    child.wait().await
}

/// Move one raw line (newline optional) into `output` and clear `line`.
fn push_line(output: &mut String, line: &mut Vec<u8>) {
    if line.is_empty() {
        return;
    }
    let bytes = line.as_slice();
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    output.push_str(&String::from_utf8_lossy(bytes));
    output.push('\n');
    line.clear();
}
