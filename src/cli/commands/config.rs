//! Config command implementation.
//!
//! The `dev-janitor config` command shows the override file in effect and
//! reports problems with it that discovery would silently ignore.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::ConfigArgs;
use crate::config::{default_config_path, CustomConfig};
use crate::discovery::DEFAULT_PROBE_TIMEOUT;
use crate::error::Result;
use crate::managers::ManagerId;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    config_path: Option<PathBuf>,
    args: ConfigArgs,
}

/// What `config --json` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport {
    path: Option<PathBuf>,
    exists: bool,
    probe_timeout_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<CustomConfig>,
}

impl ConfigCommand {
    /// Create a new config command; `None` means the default location.
    pub fn new(config_path: Option<PathBuf>, args: ConfigArgs) -> Self {
        Self { config_path, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }

    fn resolved_path(&self) -> Option<PathBuf> {
        self.config_path.clone().or_else(default_config_path)
    }
}

/// `disabled` entries that name no known manager.
fn unknown_disabled(config: &CustomConfig) -> Vec<&str> {
    config
        .disabled
        .iter()
        .map(String::as_str)
        .filter(|name| name.parse::<ManagerId>().is_err())
        .collect()
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let path = self.resolved_path();
        let exists = path.as_ref().is_some_and(|p| p.is_file());
        let config = match (&path, exists) {
            (Some(p), true) => Some(CustomConfig::load_from(p)?),
            _ => None,
        };
        let probe_timeout = config
            .as_ref()
            .and_then(CustomConfig::probe_timeout)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT);

        if self.args.json {
            let report = ConfigReport {
                path,
                exists,
                probe_timeout_ms: probe_timeout.as_millis(),
                config,
            };
            ui.message(&serde_json::to_string_pretty(&report)?);
            return Ok(CommandResult::success());
        }

        let Some(path) = path else {
            ui.warning("No configuration directory on this platform; pass --config");
            return Ok(CommandResult::success());
        };
        ui.message(&format!("# {}", path.display()));

        let Some(config) = config else {
            ui.message("No override file; using built-in search locations only.");
            ui.message(&format!("Probe timeout: {} ms", probe_timeout.as_millis()));
            return Ok(CommandResult::success());
        };

        if config.custom_paths.is_empty() {
            ui.message("Custom paths: none");
        } else {
            ui.message("Custom paths:");
            for (key, paths) in &config.custom_paths {
                ui.message(&format!("  {}:", key));
                for path in paths {
                    ui.message(&format!("    - {}", path));
                }
            }
        }

        if config.disabled.is_empty() {
            ui.message("Disabled: none");
        } else {
            ui.message(&format!("Disabled: {}", config.disabled.join(", ")));
        }
        ui.message(&format!("Probe timeout: {} ms", probe_timeout.as_millis()));

        for name in unknown_disabled(&config) {
            ui.warning(&format!("'{}' in disabled is not a known package manager", name));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JanitorError;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, content: &str) -> PathBuf {
        let path = temp.path().join("package-managers.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn shows_paths_and_disabled() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"{"customPaths": {"brew": ["/opt/brew/bin/brew"]}, "disabled": ["pyenv"], "timeout": 2500}"#,
        );
        let cmd = ConfigCommand::new(Some(path), ConfigArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("/opt/brew/bin/brew"));
        assert!(ui.has_message("Disabled: pyenv"));
        assert!(ui.has_message("Probe timeout: 2500 ms"));
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn warns_about_unknown_disabled_entries() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"{"disabled": ["cargo", "brew"]}"#);
        let cmd = ConfigCommand::new(Some(path), ConfigArgs::default());
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_warning("'cargo'"));
        assert!(!ui.has_warning("'brew'"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let cmd = ConfigCommand::new(
            Some(temp.path().join("absent.json")),
            ConfigArgs { json: true },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let report: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(report["exists"], false);
        assert_eq!(report["probeTimeoutMs"], 10_000);
        assert!(report.get("config").is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "{ not json");
        let cmd = ConfigCommand::new(Some(path), ConfigArgs::default());
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();
        assert!(matches!(err, JanitorError::ConfigParseError { .. }));
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, r#"{"timeout": 0}"#);
        let cmd = ConfigCommand::new(Some(path), ConfigArgs { json: true });
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let report: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(report["probeTimeoutMs"], 10_000);
        assert_eq!(report["config"]["timeout"], 0);
    }
}
