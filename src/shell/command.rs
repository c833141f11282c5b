//! External command execution.
//!
//! Every probe and listing goes through a [`CommandRunner`], so discovery
//! never talks to `std::process` directly. The system runner spawns the
//! program without a shell, captures both streams and enforces a per-call
//! timeout. A non-zero exit is reported in [`CommandResult`], not as an error.

use crate::error::{JanitorError, Result};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Interval between `try_wait` polls while a child is running.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of executing an external command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }
}

/// Capability to run an external program and capture its output.
///
/// Implementations must return `Ok` for any process that ran to completion,
/// whatever its exit code. `Err` is reserved for spawn failures and timeouts.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, killing it if it outlives `timeout`.
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<CommandResult>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<CommandResult> {
        let start = Instant::now();
        let command_line = display_command(program, args);

        let mut cmd = build_command(program, args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            tracing::debug!("Failed to spawn '{}': {}", command_line, e);
            JanitorError::CommandFailed {
                command: command_line.clone(),
                code: None,
            }
        })?;

        // Drain both pipes on their own threads so a chatty child can't block
        // on a full pipe while we poll for exit.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_handle = thread::spawn(move || read_pipe(stdout));
        let stderr_handle = thread::spawn(move || read_pipe(stderr));

        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        tracing::debug!("'{}' timed out after {:?}", command_line, timeout);
                        return Err(JanitorError::CommandTimedOut {
                            command: command_line,
                            timeout,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        let duration = start.elapsed();

        if status.success() {
            Ok(CommandResult::success(stdout, stderr, duration))
        } else {
            Ok(CommandResult::failure(status.code(), stdout, stderr, duration))
        }
    }
}

/// Render a program and its arguments as a single display string.
///
/// Used for log lines, error messages and as the lookup key of
/// [`MockRunner`](super::MockRunner).
pub fn display_command(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Batch shims (`conda.bat`, `npm.cmd`) can't be spawned directly on Windows,
/// so anything without an `.exe` suffix goes through `cmd /C`.
#[cfg(windows)]
fn build_command(program: &str, args: &[&str]) -> Command {
    if program.to_lowercase().ends_with(".exe") {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    } else {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(program).args(args);
        cmd
    }
}

#[cfg(not(windows))]
fn build_command(program: &str, args: &[&str]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_command_joins_args() {
        assert_eq!(
            display_command("brew", &["list", "--formula", "--versions"]),
            "brew list --formula --versions"
        );
        assert_eq!(display_command("pyenv", &[]), "pyenv");
    }

    #[test]
    fn command_result_constructors() {
        let ok = CommandResult::success("out".into(), String::new(), Duration::ZERO);
        assert!(ok.success);
        assert_eq!(ok.exit_code, Some(0));

        let failed = CommandResult::failure(Some(2), String::new(), "err".into(), Duration::ZERO);
        assert!(!failed.success);
        assert_eq!(failed.exit_code, Some(2));
        assert_eq!(failed.stderr, "err");
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_stdout() {
        let result = SystemRunner::new()
            .run("sh", &["-c", "echo hello"], Duration::from_secs(5))
            .unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_stderr() {
        let result = SystemRunner::new()
            .run("sh", &["-c", "echo oops >&2"], Duration::from_secs(5))
            .unwrap();

        assert!(result.stderr.contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_not_an_error() {
        let result = SystemRunner::new()
            .run("sh", &["-c", "exit 3"], Duration::from_secs(5))
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn hung_process_is_killed_after_timeout() {
        let start = Instant::now();
        let err = SystemRunner::new()
            .run("sleep", &["5"], Duration::from_millis(100))
            .unwrap_err();

        assert!(matches!(err, JanitorError::CommandTimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_program_is_command_failed() {
        let err = SystemRunner::new()
            .run(
                "definitely-not-a-real-binary-4f1c",
                &["--version"],
                Duration::from_secs(5),
            )
            .unwrap_err();

        assert!(matches!(err, JanitorError::CommandFailed { code: None, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn result_tracks_duration() {
        let result = SystemRunner::new()
            .run("sh", &["-c", "echo fast"], Duration::from_secs(5))
            .unwrap();

        assert!(result.duration.as_millis() < 5000);
    }
}
