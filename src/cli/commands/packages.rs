//! Packages command implementation.
//!
//! The `dev-janitor packages` command lists what every available manager (or
//! a single one, with `--manager`) has installed. With `--outdated` it also
//! asks each manager for newer releases and keeps only the packages that
//! have one.

use std::collections::BTreeSet;

use crate::cli::args::PackagesArgs;
use crate::error::Result;
use crate::managers::{ManagerId, PackageRecord};
use crate::orchestrator::{counted, PackageDiscovery};
use crate::ui::{JanitorTheme, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The packages command implementation.
pub struct PackagesCommand<'a> {
    discovery: &'a PackageDiscovery,
    args: PackagesArgs,
    theme: &'a JanitorTheme,
}

impl<'a> PackagesCommand<'a> {
    /// Create a new packages command.
    pub fn new(discovery: &'a PackageDiscovery, args: PackagesArgs, theme: &'a JanitorTheme) -> Self {
        Self {
            discovery,
            args,
            theme,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &PackagesArgs {
        &self.args
    }

    fn list_one(&self, id: ManagerId, ui: &mut dyn UserInterface) -> Option<Vec<PackageRecord>> {
        let status = self.discovery.get_manager_status(id);
        if !status.status.is_usable() {
            let reason = status
                .message
                .unwrap_or_else(|| "not installed".to_string());
            ui.warning(&format!("{} is unavailable: {}", id.display_name(), reason));
            return None;
        }

        let mut spinner = ui.start_spinner(&format!("Listing {} packages...", id.display_name()));
        let packages = self.discovery.list_packages(id);
        spinner.finish_success(&format!(
            "Found {}",
            counted(packages.len(), &format!("{} package", id.display_name()))
        ));
        Some(packages)
    }

    fn list_all(&self, ui: &mut dyn UserInterface) -> Vec<PackageRecord> {
        let mut spinner = ui.start_spinner("Looking for package managers...");
        let verbose = ui.output_mode().shows_details();
        let mut progress_lines = Vec::new();
        let packages = {
            let mut on_progress = |_: ManagerId, text: &str| {
                spinner.set_message(text);
                if verbose {
                    progress_lines.push(text.to_string());
                }
            };
            self.discovery.list_all_packages(Some(&mut on_progress))
        };
        spinner.finish_success(&format!("Found {}", counted(packages.len(), "package")));
        for line in progress_lines {
            ui.message(&line);
        }
        packages
    }

    fn keep_outdated(&self, packages: &mut Vec<PackageRecord>, ui: &mut dyn UserInterface) {
        let mut spinner = ui.start_spinner("Checking for newer releases...");
        self.discovery.check_outdated(packages);
        packages.retain(|record| record.outdated);
        spinner.finish_success(&format!(
            "{} can be updated",
            counted(packages.len(), "package")
        ));
    }

    fn render_table(&self, packages: &[PackageRecord]) -> String {
        let mut headers = vec!["Manager", "Package", "Version"];
        if self.args.outdated {
            headers.push("Latest");
        }
        headers.extend(["Location", "Details"]);

        let mut table = Table::new(headers);
        for record in packages {
            let mut row = vec![
                record.manager.display_name().to_string(),
                self.theme.highlight.apply_to(&record.name).to_string(),
                record.version.clone(),
            ];
            if self.args.outdated {
                let latest = record.latest.as_deref().unwrap_or_default();
                row.push(self.theme.warning.apply_to(latest).to_string());
            }
            row.extend([record.location.to_string(), details(record)]);
            table.add_row(row.as_slice());
        }
        table.render()
    }
}

/// Channel, environment or description, whichever the record carries.
fn details(record: &PackageRecord) -> String {
    let mut parts = Vec::new();
    if let Some(channel) = &record.channel {
        parts.push(format!("channel: {}", channel));
    }
    if let Some(environment) = &record.environment {
        parts.push(format!("env: {}", environment));
    }
    if let Some(description) = &record.description {
        parts.push(description.clone());
    }
    parts.join(", ")
}

impl Command for PackagesCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut packages = match &self.args.manager {
            Some(name) => {
                let id: ManagerId = name.parse()?;
                match self.list_one(id, ui) {
                    Some(packages) => packages,
                    None => return Ok(CommandResult::failure(1)),
                }
            }
            None => self.list_all(ui),
        };
        if self.args.outdated {
            self.keep_outdated(&mut packages, ui);
        }
        packages.sort_by(|a, b| {
            (a.manager, a.name.to_lowercase()).cmp(&(b.manager, b.name.to_lowercase()))
        });

        if self.args.json {
            ui.message(&serde_json::to_string_pretty(&packages)?);
            return Ok(CommandResult::success());
        }

        if packages.is_empty() {
            ui.message(if self.args.outdated {
                "Everything is up to date."
            } else {
                "No packages found."
            });
            return Ok(CommandResult::success());
        }

        ui.show_header(if self.args.outdated {
            "Outdated packages"
        } else {
            "Installed packages"
        });
        ui.message(&self.render_table(&packages));

        let managers: BTreeSet<ManagerId> = packages.iter().map(|p| p.manager).collect();
        ui.message(&format!(
            "{} across {}",
            counted(packages.len(), "package"),
            counted(managers.len(), "manager")
        ));
        ui.show_hint("Run `dev-janitor uninstall <name>` to remove one");

        Ok(CommandResult::success())
    }
}
