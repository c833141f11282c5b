//! pip handler.
//!
//! Packaging tools that ship with every interpreter (`pip`, `setuptools`,
//! `wheel`) are left out of listings. Many systems only install `pip3`, so
//! that name is tried when `pip` is missing or off PATH.

use std::collections::HashMap;

use super::parse::{array_items, content_lines, name_and_version, parse_json, str_field};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::{ExecutableSearchResult, Platform};
use crate::error::Result;

const BUNDLED: &[&str] = &["pip", "setuptools", "wheel"];
const NAMES: &[&str] = &["pip", "pip3"];

pub struct PipHandler {
    ctx: HandlerContext,
}

impl PipHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn record(name: &str, version: &str) -> Option<PackageRecord> {
        if BUNDLED.iter().any(|b| b.eq_ignore_ascii_case(name)) {
            return None;
        }
        PackageRecord::new(name, version, ManagerId::Pip, PackageLocation::PipSite)
    }

    /// `[{"name", "version", "latest_version", ...}]` from `pip list --outdated`.
    fn parse_outdated(raw: &str) -> HashMap<String, String> {
        let Some(value) = parse_json(raw) else {
            return HashMap::new();
        };
        array_items(&value)
            .filter_map(|entry| {
                Some((
                    str_field(entry, "name")?.to_string(),
                    str_field(entry, "latest_version")?.to_string(),
                ))
            })
            .collect()
    }
}

impl ManagerHandler for PipHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Pip
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "pip"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%APPDATA%\\Python\\Scripts\\pip.exe",
                "%LOCALAPPDATA%\\Programs\\Python\\Python312\\Scripts\\pip.exe",
                "%LOCALAPPDATA%\\Programs\\Python\\Python311\\Scripts\\pip.exe",
                "%LOCALAPPDATA%\\Programs\\Python\\Python312\\Scripts\\pip3.exe",
            ],
            Platform::MacOS => &[
                "/opt/homebrew/bin/pip",
                "/usr/local/bin/pip",
                "/opt/homebrew/bin/pip3",
                "/usr/local/bin/pip3",
                "/usr/bin/pip3",
            ],
            Platform::Linux => &[
                "~/.local/bin/pip",
                "/usr/local/bin/pip",
                "~/.local/bin/pip3",
                "/usr/local/bin/pip3",
                "/usr/bin/pip3",
            ],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn locate(&self) -> Option<ExecutableSearchResult> {
        self.ctx.resolve_any(NAMES, &self.common_paths())
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let output = self.ctx.run_checked(&program, &["list", "--format=json"])?;
        Ok(self.parse_output(&output))
    }

    fn uninstall_package(&self, name: &str, _options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        Ok(self.ctx.run(&program, &["uninstall", "-y", name])?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        if let Some(value) = parse_json(raw).filter(|v| v.is_array()) {
            return array_items(&value)
                .filter_map(|entry| {
                    Self::record(str_field(entry, "name")?, str_field(entry, "version")?)
                })
                .collect();
        }

        // Package    Version
        // ---------- -------
        content_lines(raw)
            .filter(|line| !line.starts_with('-') && !line.starts_with("Package "))
            .filter_map(name_and_version)
            .filter_map(|(name, version)| Self::record(name, version))
            .collect()
    }

    /// Asks the package index, so this can take a while.
    fn latest_versions(&self) -> Result<HashMap<String, String>> {
        let program = self.program()?;
        let output = self
            .ctx
            .run_checked(&program, &["list", "--outdated", "--format=json"])?;
        Ok(Self::parse_outdated(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::test_support;
    use crate::discovery::{DiscoveryMethod, Environment};
    use crate::orchestrator::{Availability, PackageDiscovery};
    use crate::shell::MockRunner;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn handler() -> PipHandler {
        PipHandler::new(test_support::context(Arc::new(MockRunner::new())))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\n").unwrap();
    }

    #[test]
    fn parses_json_and_skips_bundled_tools() {
        let records = handler().parse_output(
            r#"[{"name": "pip", "version": "23.3.1"},
                {"name": "requests", "version": "2.31.0"},
                {"name": "Wheel", "version": "0.42.0"},
                {"name": "rich"}]"#,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "requests");
        assert_eq!(records[0].location, PackageLocation::PipSite);
    }

    #[test]
    fn parses_columns() {
        let records = handler().parse_output(
            "Package    Version\n---------- -------\ncertifi    2023.11.17\nsetuptools 69.0.2\nurllib3    2.1.0\n",
        );

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["certifi", "urllib3"]);
    }

    #[test]
    fn uninstall_passes_yes_flag() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        runner.succeed("pip uninstall -y requests", "");
        let pip = PipHandler::new(test_support::context(runner.clone()));

        assert!(pip
            .uninstall_package("requests", &UninstallOptions::default())
            .unwrap());
        assert_eq!(runner.call_count("pip uninstall -y requests"), 1);
    }

    #[test]
    fn system_with_only_pip3_is_available_and_listable() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("pip3"));

        let runner = Arc::new(MockRunner::new());
        runner.succeed(
            "pip3 --version",
            "pip 24.0 from /opt/homebrew/lib/python3.12/site-packages/pip (python 3.12)",
        );
        runner.succeed(
            "pip3 list --format=json",
            r#"[{"name": "requests", "version": "2.31.0"}]"#,
        );
        let env = Environment::new(Platform::MacOS).with_path(temp.path().display().to_string());
        let discovery = PackageDiscovery::with_runner(runner.clone(), env);

        let status = discovery.get_manager_status(ManagerId::Pip);
        assert_eq!(status.status, Availability::Available);
        assert_eq!(status.found_path.as_deref(), Some("pip3"));
        assert_eq!(status.version.as_deref(), Some("24.0"));

        let packages = discovery.list_packages(ManagerId::Pip);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "requests");
    }

    #[test]
    fn pip3_found_on_path_is_not_path_missing() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("usr/bin");
        let pip3 = bin.join("pip3");
        touch(&pip3);

        let runner = Arc::new(MockRunner::new());
        runner.succeed(&format!("{} --version", pip3.display()), "pip 23.0.1");
        let env = Environment::new(Platform::Linux).with_path(bin.display().to_string());
        let discovery = PackageDiscovery::with_runner(runner, env);

        let status = discovery.get_manager_status(ManagerId::Pip);

        assert_eq!(status.status, Availability::Available);
        assert_eq!(status.discovery_method, Some(DiscoveryMethod::PathScan));
        assert!(status.in_path);
        assert_eq!(status.message, None);
    }

    #[test]
    fn pip_is_preferred_when_both_names_exist() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        runner.succeed("pip3 --version", "pip 23.3.1");
        let pip = PipHandler::new(test_support::context(runner.clone()));

        assert_eq!(pip.program().unwrap(), "pip");
        assert_eq!(runner.call_count("pip3 --version"), 0);
    }

    #[test]
    fn outdated_report_maps_latest_versions() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        runner.succeed(
            "pip list --outdated --format=json",
            r#"[{"name": "requests", "version": "2.31.0", "latest_version": "2.32.3", "latest_filetype": "wheel"},
                {"name": "broken", "version": "1.0"}]"#,
        );
        let pip = PipHandler::new(test_support::context(runner));

        let latest = pip.latest_versions().unwrap();

        assert_eq!(latest.len(), 1);
        assert_eq!(latest["requests"], "2.32.3");
    }
}
