//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// dev-janitor - Find package managers and the packages they installed.
#[derive(Debug, Parser)]
#[command(name = "dev-janitor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the override file (defaults to <config dir>/dev-janitor/package-managers.json)
    #[arg(short, long, global = true, env = "DEV_JANITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show which package managers are installed (default)
    Managers(ManagersArgs),

    /// List packages installed by every available manager
    Packages(PackagesArgs),

    /// Remove a package through its manager
    Uninstall(UninstallArgs),

    /// Show the override file in effect
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `managers` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ManagersArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `packages` command.
#[derive(Debug, Clone, Default, Args)]
pub struct PackagesArgs {
    /// Only list packages of this manager (e.g. brew, conda, pipx)
    #[arg(short, long)]
    pub manager: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Check for newer releases and show only outdated packages (npm, pip, Homebrew)
    #[arg(long)]
    pub outdated: bool,
}

/// Arguments for the `uninstall` command.
#[derive(Debug, Clone, Default, Args)]
pub struct UninstallArgs {
    /// Package name
    pub name: String,

    /// Manager to remove it with; looked up when omitted
    #[arg(short, long)]
    pub manager: Option<String>,

    /// Treat the package as a Homebrew cask
    #[arg(long)]
    pub cask: bool,

    /// Conda environment to remove it from
    #[arg(long = "env")]
    pub environment: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
