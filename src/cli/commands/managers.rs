//! Managers command implementation.
//!
//! The `dev-janitor managers` command shows every known package manager and
//! how (or whether) it was found.

use crate::cli::args::ManagersArgs;
use crate::error::Result;
use crate::orchestrator::{Availability, ManagerStatus, PackageDiscovery};
use crate::ui::{JanitorTheme, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The managers command implementation.
pub struct ManagersCommand<'a> {
    discovery: &'a PackageDiscovery,
    args: ManagersArgs,
    theme: &'a JanitorTheme,
}

impl<'a> ManagersCommand<'a> {
    /// Create a new managers command.
    pub fn new(discovery: &'a PackageDiscovery, args: ManagersArgs, theme: &'a JanitorTheme) -> Self {
        Self {
            discovery,
            args,
            theme,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ManagersArgs {
        &self.args
    }

    fn render_table(&self, statuses: &[ManagerStatus]) -> String {
        let mut table = Table::new(vec!["Manager", "Version", "Status", "Found via", "Location"]);
        for status in statuses {
            table.add_row(&[
                status.manager.display_name().to_string(),
                status.version.clone().unwrap_or_else(|| "-".to_string()),
                self.theme.format_availability(status.status),
                status
                    .discovery_method
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                status
                    .found_path
                    .as_deref()
                    .map(|p| self.theme.path.apply_to(p).to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]);
        }
        table.render()
    }
}

impl Command for ManagersCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut spinner = ui.start_spinner("Looking for package managers...");
        let statuses = self.discovery.discover_available_managers();
        let usable = statuses.iter().filter(|s| s.status.is_usable()).count();
        spinner.finish_success(&format!(
            "Found {} of {} package managers",
            usable,
            statuses.len()
        ));

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&statuses)?);
            return Ok(CommandResult::success());
        }

        ui.show_header("Package managers");
        ui.message(&self.render_table(&statuses));

        for status in &statuses {
            match (status.status, &status.message) {
                (Availability::PathMissing, Some(message)) => ui.warning(message),
                (Availability::NotInstalled, Some(message)) if ui.output_mode().shows_details() => {
                    ui.message(&format!("{}: {}", status.manager.display_name(), message))
                }
                _ => {}
            }
        }

        if usable > 0 {
            ui.show_hint("Run `dev-janitor packages` to list installed packages");
        }

        Ok(CommandResult::success())
    }
}
