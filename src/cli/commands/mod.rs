//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. All commands that touch package
//! managers share the dispatcher's [`PackageDiscovery`](crate::orchestrator::PackageDiscovery),
//! so a resolution made once is cached for the rest of the run.

pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod managers;
pub mod packages;
pub mod uninstall;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
