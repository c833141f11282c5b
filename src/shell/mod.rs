//! External process execution.

pub mod command;
pub mod mock;

pub use command::{display_command, CommandResult, CommandRunner, SystemRunner};
pub use mock::{MockResponse, MockRunner};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    const CI_VARS: &[&str] = &[
        "CI",
        "GITHUB_ACTIONS",
        "GITLAB_CI",
        "CIRCLECI",
        "TRAVIS",
        "BUILDKITE",
        "JENKINS_URL",
    ];
    CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
}
