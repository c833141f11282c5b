//! Uninstall command implementation.
//!
//! The `dev-janitor uninstall` command removes a package through the manager
//! that installed it. Without `--manager` the installed packages are searched
//! for the name first.

use std::collections::BTreeMap;

use crate::cli::args::UninstallArgs;
use crate::error::{JanitorError, Result};
use crate::managers::{ManagerId, PackageLocation, PackageRecord, UninstallOptions};
use crate::orchestrator::PackageDiscovery;
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The uninstall command implementation.
pub struct UninstallCommand<'a> {
    discovery: &'a PackageDiscovery,
    args: UninstallArgs,
}

impl<'a> UninstallCommand<'a> {
    /// Create a new uninstall command.
    pub fn new(discovery: &'a PackageDiscovery, args: UninstallArgs) -> Self {
        Self { discovery, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &UninstallArgs {
        &self.args
    }

    /// Whether `record` is what the user asked for.
    ///
    /// pyenv versions are removed by version, so they match on that.
    fn matches(&self, record: &PackageRecord) -> bool {
        let wanted = self.args.name.as_str();
        match record.manager {
            ManagerId::Pyenv => record.version == wanted,
            _ => record.name.eq_ignore_ascii_case(wanted),
        }
    }

    /// Installed records matching the name, one per manager.
    fn candidates(&self, ui: &mut dyn UserInterface) -> BTreeMap<ManagerId, PackageRecord> {
        let mut spinner = ui.start_spinner(&format!("Looking for {}...", self.args.name));
        let found: BTreeMap<ManagerId, PackageRecord> = self
            .discovery
            .list_all_packages(None)
            .into_iter()
            .filter(|record| self.matches(record))
            .map(|record| (record.manager, record))
            .collect();
        spinner.finish_success(&format!(
            "{} found in {} managers",
            self.args.name,
            found.len()
        ));
        found
    }

    /// Pick the manager, or `None` after telling the user why not.
    fn choose_manager(
        &self,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<(ManagerId, Option<PackageRecord>)>> {
        if let Some(name) = &self.args.manager {
            let id: ManagerId = name.parse()?;
            return Ok(Some((id, None)));
        }

        let mut candidates = self.candidates(ui);
        match candidates.len() {
            0 => {
                ui.error(&format!("No installed package named '{}'", self.args.name));
                Ok(None)
            }
            1 => Ok(candidates.pop_first().map(|(id, record)| (id, Some(record)))),
            _ if ui.is_interactive() => {
                let options = candidates
                    .values()
                    .map(|record| PromptOption {
                        label: format!(
                            "{} ({} {})",
                            record.manager.display_name(),
                            record.name,
                            record.version
                        ),
                        value: record.manager.as_str().to_string(),
                    })
                    .collect();
                let answer = ui.prompt(&Prompt::select(
                    "manager",
                    &format!("{} is installed by several managers. Remove it with", self.args.name),
                    options,
                ))?;
                let id: ManagerId = answer.as_string().parse()?;
                Ok(candidates.remove(&id).map(|record| (id, Some(record))))
            }
            _ => {
                let names: Vec<&str> = candidates.keys().map(|id| id.as_str()).collect();
                Err(JanitorError::Other(anyhow::anyhow!(
                    "'{}' is installed by {}; pass --manager to pick one",
                    self.args.name,
                    names.join(", ")
                )))
            }
        }
    }

    fn options_for(&self, record: Option<&PackageRecord>) -> UninstallOptions {
        let from_record_cask = record.is_some_and(|r| r.location == PackageLocation::Cask);
        UninstallOptions {
            cask: self.args.cask || from_record_cask,
            environment: self
                .args
                .environment
                .clone()
                .or_else(|| record.and_then(|r| r.environment.clone())),
        }
    }
}

impl Command for UninstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some((id, record)) = self.choose_manager(ui)? else {
            return Ok(CommandResult::failure(1));
        };
        let options = self.options_for(record.as_ref());

        if !self.args.yes {
            let question = format!(
                "Remove {} with {}?",
                self.args.name,
                id.display_name()
            );
            let confirmed = ui
                .prompt(&Prompt::confirm("confirm-uninstall", &question, false))?
                .as_bool();
            if !confirmed {
                ui.message("Nothing removed.");
                return Ok(CommandResult::success());
            }
        }

        let mut spinner = ui.start_spinner(&format!(
            "Removing {} with {}...",
            self.args.name,
            id.display_name()
        ));
        if self.discovery.uninstall_package(&self.args.name, id, &options) {
            spinner.finish_success(&format!("Removed {}", self.args.name));
            Ok(CommandResult::success())
        } else {
            spinner.finish_error(&format!(
                "{} could not remove {}",
                id.display_name(),
                self.args.name
            ));
            ui.show_hint("Run with --debug to see the manager's output");
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{Environment, Platform};
    use crate::shell::MockRunner;
    use crate::ui::{MockUI, SpinnerEvent};
    use std::sync::Arc;

    fn discovery(runner: Arc<MockRunner>) -> PackageDiscovery {
        PackageDiscovery::with_runner(runner, Environment::new(Platform::Linux))
    }

    fn args(name: &str) -> UninstallArgs {
        UninstallArgs {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// npm and pip both have `black`; pip also has `requests`.
    fn shared_runner() -> Arc<MockRunner> {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("npm --version", "10.5.0");
        runner.succeed(
            "npm list -g --depth=0 --json",
            r#"{"dependencies": {"black": {"version": "0.3.0"}}}"#,
        );
        runner.succeed("pip --version", "pip 24.0");
        runner.succeed(
            "pip list --format=json",
            r#"[{"name": "black", "version": "24.2.0"}, {"name": "requests", "version": "2.31.0"}]"#,
        );
        runner
    }

    #[test]
    fn explicit_manager_with_yes() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pipx --version", "1.4.3");
        runner.succeed("pipx uninstall black", "uninstalled black!");
        let discovery = discovery(runner.clone());
        let mut cmd_args = args("black");
        cmd_args.manager = Some("pipx".into());
        cmd_args.yes = true;
        let mut ui = MockUI::new();

        let result = UninstallCommand::new(&discovery, cmd_args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.prompts_shown().is_empty());
        assert_eq!(runner.call_count("pipx uninstall black"), 1);
    }

    #[test]
    fn declined_confirmation_removes_nothing() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pipx --version", "1.4.3");
        let discovery = discovery(runner.clone());
        let mut cmd_args = args("black");
        cmd_args.manager = Some("pipx".into());
        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm-uninstall", "no");

        let result = UninstallCommand::new(&discovery, cmd_args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("Nothing removed."));
        assert_eq!(runner.call_count("pipx uninstall black"), 0);
    }

    #[test]
    fn single_owner_is_found_automatically() {
        let runner = shared_runner();
        runner.succeed("pip uninstall -y requests", "Successfully uninstalled requests");
        let discovery = discovery(runner.clone());
        let mut cmd_args = args("requests");
        cmd_args.yes = true;
        let mut ui = MockUI::new();

        let result = UninstallCommand::new(&discovery, cmd_args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(runner.call_count("pip uninstall -y requests"), 1);
        assert!(ui
            .spinner_events()
            .contains(&SpinnerEvent::Success("Removed requests".into())));
    }

    #[test]
    fn several_owners_prompt_when_interactive() {
        let runner = shared_runner();
        runner.succeed("npm uninstall -g black", "removed 1 package");
        let discovery = discovery(runner.clone());
        let mut cmd_args = args("black");
        cmd_args.yes = true;
        let mut ui = MockUI::new();
        ui.set_interactive(true);
        ui.set_prompt_response("manager", "npm");

        let result = UninstallCommand::new(&discovery, cmd_args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.prompts_shown(), ["manager".to_string()]);
        assert_eq!(runner.call_count("npm uninstall -g black"), 1);
    }

    #[test]
    fn several_owners_error_when_not_interactive() {
        let discovery = discovery(shared_runner());
        let mut cmd_args = args("black");
        cmd_args.yes = true;
        let mut ui = MockUI::new();

        let err = UninstallCommand::new(&discovery, cmd_args)
            .execute(&mut ui)
            .unwrap_err();

        assert!(err.to_string().contains("--manager"));
    }

    #[test]
    fn missing_package_fails() {
        let discovery = discovery(shared_runner());
        let mut ui = MockUI::new();

        let result = UninstallCommand::new(&discovery, args("left-pad"))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("No installed package named 'left-pad'"));
    }

    #[test]
    fn manager_failure_is_reported() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pipx --version", "1.4.3");
        runner.fail("pipx uninstall black", 1);
        let discovery = discovery(runner);
        let mut cmd_args = args("black");
        cmd_args.manager = Some("pipx".into());
        cmd_args.yes = true;
        let mut ui = MockUI::new();

        let result = UninstallCommand::new(&discovery, cmd_args)
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_hint("--debug"));
    }

    #[test]
    fn cask_location_sets_cask_option() {
        let discovery = discovery(Arc::new(MockRunner::new()));
        let cmd = UninstallCommand::new(&discovery, args("firefox"));
        let record =
            PackageRecord::new("firefox", "124.0", ManagerId::Homebrew, PackageLocation::Cask)
                .unwrap();

        let options = cmd.options_for(Some(&record));

        assert!(options.cask);
        assert!(options.environment.is_none());
    }

    #[test]
    fn pyenv_matches_by_version() {
        let discovery = discovery(Arc::new(MockRunner::new()));
        let cmd = UninstallCommand::new(&discovery, args("3.11.8"));
        let record = PackageRecord::new(
            "python",
            "3.11.8",
            ManagerId::Pyenv,
            PackageLocation::PyenvVersion,
        )
        .unwrap();

        assert!(cmd.matches(&record));
    }
}
