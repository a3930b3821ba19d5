//! Evaluator backed by an external host program.
//!
//! Each script is written to the stdin of a fresh child process; the child's
//! stdout is the result. Runs are gated by a semaphore because host scripting
//! engines are single-threaded. A run whose request was abandoned is killed.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::evaluator::{EvalReply, Evaluator};

/// Program and arguments used to evaluate a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl HostCommand {
    /// Splits a whitespace-separated command line. `None` if it is blank.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(HostCommand {
            program,
            args: parts.collect(),
        })
    }
}

pub struct CommandEvaluator {
    command: HostCommand,
    permits: Arc<Semaphore>,
}

impl CommandEvaluator {
    /// `max_concurrent` is clamped to at least one run.
    pub fn new(command: HostCommand, max_concurrent: usize) -> Self {
        CommandEvaluator {
            command,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }
}

impl Evaluator for CommandEvaluator {
    /// Must be called from within a tokio runtime.
    fn evaluate(&self, script: String, reply: EvalReply) {
        let command = self.command.clone();
        let permits = Arc::clone(&self.permits);
        tokio::spawn(run_script(command, permits, script, reply));
    }
}

async fn run_script(
    command: HostCommand,
    permits: Arc<Semaphore>,
    script: String,
    mut reply: EvalReply,
) {
    let permit = tokio::select! {
        permit = permits.acquire_owned() => permit.ok(),
        _ = reply.abandoned() => {
            tracing::debug!(program = %command.program, "request abandoned while queued");
            return;
        }
    };
    let Some(_permit) = permit else {
        reply.fail("host command evaluator is closed");
        return;
    };

    let outcome = tokio::select! {
        outcome = execute(&command, script) => outcome,
        _ = reply.abandoned() => {
            tracing::warn!(program = %command.program, "request abandoned, killing host command");
            return;
        }
    };

    let delivered = match outcome {
        Ok(result) => reply.complete(result),
        Err(message) => {
            tracing::warn!(program = %command.program, error = %message, "host command failed");
            reply.fail(message)
        }
    };
    if !delivered {
        tracing::debug!(program = %command.program, "result arrived after the request gave up");
    }
}

async fn execute(command: &HostCommand, script: String) -> Result<String, String> {
    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| format!("failed to spawn host command '{}': {}", command.program, err))?;

    let stdin = child.stdin.take();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            // A program that exits without reading its input is not an error here.
            if let Err(err) = stdin.write_all(script.as_bytes()).await {
                tracing::debug!(error = %err, "host command closed stdin early");
            }
        }
    };

    let ((), output) = tokio::join!(feed, child.wait_with_output());
    let output =
        output.map_err(|err| format!("failed to wait for host command '{}': {}", command.program, err))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(if stderr.is_empty() {
            format!("host command exited with {}", output.status)
        } else {
            stderr
        });
    }

    Ok(strip_trailing_newline(
        String::from_utf8_lossy(&output.stdout).into_owned(),
    ))
}

fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}
