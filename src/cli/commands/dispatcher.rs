//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, ManagersArgs};
use crate::error::Result;
use crate::orchestrator::PackageDiscovery;
use crate::ui::{JanitorTheme, UserInterface};

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    discovery: PackageDiscovery,
    config_path: Option<PathBuf>,
    theme: JanitorTheme,
}

impl CommandDispatcher {
    /// Create a dispatcher over `discovery`.
    ///
    /// `config_path` replaces the default override file location.
    pub fn new(discovery: PackageDiscovery, config_path: Option<PathBuf>) -> Self {
        Self {
            discovery,
            config_path,
            theme: JanitorTheme::plain(),
        }
    }

    /// Use `theme` for tables and status icons.
    pub fn with_theme(mut self, theme: JanitorTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn discovery(&self) -> &PackageDiscovery {
        &self.discovery
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Install the override file, if there is one.
    fn install_config(&self) {
        let installed = match &self.config_path {
            Some(path) => self.discovery.load_custom_config_from(path),
            None => self.discovery.load_custom_config(),
        };
        if let Some(config) = installed {
            tracing::debug!(
                "Loaded overrides: {} custom path keys, {} disabled managers",
                config.custom_paths.len(),
                config.disabled.len()
            );
        }
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Managers(args)) => {
                self.install_config();
                let cmd =
                    super::managers::ManagersCommand::new(&self.discovery, args.clone(), &self.theme);
                cmd.execute(ui)
            }
            Some(Commands::Packages(args)) => {
                self.install_config();
                let cmd =
                    super::packages::PackagesCommand::new(&self.discovery, args.clone(), &self.theme);
                cmd.execute(ui)
            }
            Some(Commands::Uninstall(args)) => {
                self.install_config();
                let cmd = super::uninstall::UninstallCommand::new(&self.discovery, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Config(args)) => {
                let cmd = super::config::ConfigCommand::new(self.config_path.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                // Default to the managers overview
                self.install_config();
                let cmd = super::managers::ManagersCommand::new(
                    &self.discovery,
                    ManagersArgs::default(),
                    &self.theme,
                );
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{Environment, Platform};
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use clap::Parser;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dispatcher(runner: Arc<MockRunner>, temp: &TempDir) -> CommandDispatcher {
        let env = Environment::new(Platform::Linux).with_home(temp.path());
        let discovery = PackageDiscovery::with_runner(runner, env);
        CommandDispatcher::new(discovery, Some(temp.path().join("missing.json")))
    }

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn default_command_lists_managers() {
        let temp = TempDir::new().unwrap();
        let dispatcher = dispatcher(Arc::new(MockRunner::new()), &temp);
        let cli = Cli::try_parse_from(["dev-janitor"]).unwrap();
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Homebrew"));
    }

    #[test]
    fn dispatch_installs_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("overrides.json");
        std::fs::write(&config_path, r#"{"disabled": ["conda"]}"#).unwrap();

        let env = Environment::new(Platform::Linux).with_home(temp.path());
        let discovery = PackageDiscovery::with_runner(Arc::new(MockRunner::new()), env);
        let dispatcher = CommandDispatcher::new(discovery, Some(config_path));
        let cli = Cli::try_parse_from(["dev-janitor", "managers", "--json"]).unwrap();
        let mut ui = MockUI::new();

        dispatcher.dispatch(&cli, &mut ui).unwrap();

        let config = dispatcher.discovery().search().custom_config().unwrap();
        assert_eq!(config.disabled, vec!["conda".to_string()]);
        assert!(ui.has_message("disabled in configuration"));
    }
}
