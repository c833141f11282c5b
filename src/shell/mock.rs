//! Scripted command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] by looking up the full command
//! line in a table of canned responses and recording every invocation.
//! Command lines without a response behave like a missing binary.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dev_janitor::shell::{CommandRunner, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.succeed("brew --version", "Homebrew 4.1.0\n");
//!
//! let result = runner.run("brew", &["--version"], Duration::from_secs(1)).unwrap();
//! assert!(result.stdout.starts_with("Homebrew"));
//! assert!(runner.run("conda", &["--version"], Duration::from_secs(1)).is_err());
//! assert_eq!(runner.calls().len(), 2);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::{JanitorError, Result};

use super::command::{display_command, CommandResult, CommandRunner};

/// A canned outcome for one command line.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Exit 0 with the given stdout.
    Success(String),
    /// Non-zero exit with the given code and stderr.
    Failure { code: i32, stderr: String },
    /// Non-zero exit that still printed a report on stdout.
    FailureWithOutput { code: i32, stdout: String },
    /// The command exceeded its timeout.
    Timeout,
}

/// Command runner that replays scripted responses.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Mutex<HashMap<String, MockResponse>>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    /// Create a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for an exact command line.
    pub fn respond(&self, command_line: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command_line.to_string(), response);
    }

    /// Script a successful run printing `stdout`.
    pub fn succeed(&self, command_line: &str, stdout: &str) {
        self.respond(command_line, MockResponse::Success(stdout.to_string()));
    }

    /// Script a run exiting with `code`.
    pub fn fail(&self, command_line: &str, code: i32) {
        self.respond(
            command_line,
            MockResponse::Failure {
                code,
                stderr: String::new(),
            },
        );
    }

    /// Script a run exiting with `code` after printing `stdout`.
    pub fn fail_with_output(&self, command_line: &str, code: i32, stdout: &str) {
        self.respond(
            command_line,
            MockResponse::FailureWithOutput {
                code,
                stdout: stdout.to_string(),
            },
        );
    }

    /// Script a timeout.
    pub fn time_out(&self, command_line: &str) {
        self.respond(command_line, MockResponse::Timeout);
    }

    /// All command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of times `command_line` was run.
    pub fn call_count(&self, command_line: &str) -> usize {
        self.calls().iter().filter(|c| *c == command_line).count()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> Result<CommandResult> {
        let command_line = display_command(program, args);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command_line.clone());

        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&command_line)
            .cloned();

        match response {
            Some(MockResponse::Success(stdout)) => {
                Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
            }
            Some(MockResponse::Failure { code, stderr }) => Ok(CommandResult::failure(
                Some(code),
                String::new(),
                stderr,
                Duration::ZERO,
            )),
            Some(MockResponse::FailureWithOutput { code, stdout }) => Ok(CommandResult::failure(
                Some(code),
                stdout,
                String::new(),
                Duration::ZERO,
            )),
            Some(MockResponse::Timeout) => Err(JanitorError::CommandTimedOut {
                command: command_line,
                timeout,
            }),
            None => Err(JanitorError::CommandFailed {
                command: command_line,
                code: None,
            }),
        }
    }
}
