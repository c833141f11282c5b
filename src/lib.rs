//! dev-janitor - Find the package managers on a machine and what they installed.
//!
//! Discovery resolves each manager's binary through a tiered search (direct
//! command, PATH scan, well-known install locations, user overrides) and
//! caches the outcome, so GUI-launched processes with a stripped PATH still
//! find Homebrew, Conda and friends.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - User override file (custom paths, disabled managers, timeout)
//! - [`discovery`] - Tiered executable search and its path cache
//! - [`error`] - Error types and result aliases
//! - [`managers`] - One handler per package manager
//! - [`orchestrator`] - Discovery, listing and uninstall across all managers
//! - [`shell`] - Command execution with timeouts
//! - [`ui`] - Prompts, spinners, tables and terminal output
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dev_janitor::discovery::{Environment, Platform};
//! use dev_janitor::managers::ManagerId;
//! use dev_janitor::orchestrator::{Availability, PackageDiscovery};
//! use dev_janitor::shell::MockRunner;
//!
//! let runner = Arc::new(MockRunner::new());
//! runner.succeed("pyenv --version", "pyenv 2.3.36");
//! runner.succeed("pyenv versions --bare", "3.12.2\n");
//!
//! let discovery = PackageDiscovery::with_runner(runner, Environment::new(Platform::Linux));
//! let status = discovery.get_manager_status(ManagerId::Pyenv);
//! assert_eq!(status.status, Availability::Available);
//!
//! let packages = discovery.list_packages(ManagerId::Pyenv);
//! assert_eq!(packages[0].version, "3.12.2");
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod managers;
pub mod orchestrator;
pub mod shell;
pub mod ui;

pub use error::{JanitorError, Result};
