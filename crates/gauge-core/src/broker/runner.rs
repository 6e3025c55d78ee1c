//! Bounded subprocess execution for source fetches.
//!
//! Every external command runs under a hard deadline: spawn, poll with
//! `try_wait` and exponential backoff, kill on expiry. Output is drained on
//! reader threads so a chatty child cannot deadlock against a full pipe.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::broker::errors::FetchError;

const POLL_INITIAL_MS: u64 = 10;
const POLL_MAX_MS: u64 = 160;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args...`, optionally in `cwd`, failing if it does not exit
/// within `timeout_ms`. Non-zero exit is an error carrying captured stderr.
pub fn run_command(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout_ms: u64,
) -> Result<CommandOutput, FetchError> {
    let command_line = display_command(program, args);

    let resolved = which::which(program).map_err(|_| FetchError::CommandNotFound {
        command: program.to_string(),
    })?;

    let mut command = Command::new(resolved);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|e| FetchError::SpawnFailed {
        command: command_line.clone(),
        source: e,
    })?;

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let deadline = Duration::from_millis(timeout_ms);
    let start = Instant::now();
    let mut delay_ms = POLL_INITIAL_MS;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    event = "core.broker.child_status_check_failed",
                    command = %command_line,
                    error = %e,
                );
            }
        }

        if start.elapsed() > deadline {
            let _ = child.kill();
            let _ = child.wait();
            drain(stdout_reader);
            drain(stderr_reader);
            tracing::warn!(
                event = "core.broker.command_timeout",
                command = %command_line,
                timeout_ms = timeout_ms,
            );
            return Err(FetchError::Timeout {
                command: command_line,
                timeout_ms,
            });
        }

        std::thread::sleep(Duration::from_millis(delay_ms));
        delay_ms = (delay_ms * 2).min(POLL_MAX_MS);
    };

    let stdout = drain(stdout_reader);
    let stderr = drain(stderr_reader);

    if !status.success() {
        return Err(FetchError::CommandFailed {
            command: command_line,
            code: status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

/// Split a configured command string into program and leading args, so
/// settings like `"bunx ccusage"` work without a shell.
pub fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buffer = String::new();
        let _ = source.read_to_string(&mut buffer);
        buffer
    })
}

fn drain(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
