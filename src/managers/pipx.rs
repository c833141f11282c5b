//! pipx handler.
//!
//! `pipx list --json` reports `{"venvs": {<venv>: {"metadata": {"main_package":
//! {"package", "package_version"}}}}}`. Each venv contributes its main package.

use serde_json::Value;

use super::parse::{content_lines, parse_json, str_field};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

pub struct PipxHandler {
    ctx: HandlerContext,
}

impl PipxHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn record(venv: &str, package: &str, version: &str) -> Option<PackageRecord> {
        PackageRecord::new(package, version, ManagerId::Pipx, PackageLocation::PipxVenv)
            .map(|record| record.with_environment(Some(venv)))
    }

    fn parse_json_venvs(value: &Value) -> Option<Vec<PackageRecord>> {
        let venvs = value.get("venvs").unwrap_or(value).as_object()?;
        let records = venvs
            .iter()
            .filter_map(|(venv, entry)| {
                let main = entry
                    .get("metadata")
                    .unwrap_or(entry)
                    .get("main_package")?;
                Self::record(
                    venv,
                    str_field(main, "package")?,
                    str_field(main, "package_version")?,
                )
            })
            .collect();
        Some(records)
    }

    /// Human-readable `pipx list` output.
    fn parse_text(raw: &str) -> Vec<PackageRecord> {
        raw.lines()
            .filter(|line| line.starts_with(char::is_whitespace))
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('-'))
            .filter_map(|line| {
                let line = line.strip_prefix("package ").unwrap_or(line);
                let mut columns = line.split_whitespace();
                let name = columns.next()?;
                let version = columns.next()?.trim_end_matches(',');
                Self::record(name, name, version)
            })
            .collect()
    }
}

impl ManagerHandler for PipxHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Pipx
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "pipx"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%USERPROFILE%\\.local\\bin\\pipx.exe",
                "%APPDATA%\\Python\\Scripts\\pipx.exe",
            ],
            Platform::MacOS => &[
                "~/.local/bin/pipx",
                "/opt/homebrew/bin/pipx",
                "/usr/local/bin/pipx",
            ],
            Platform::Linux => &["~/.local/bin/pipx", "/usr/local/bin/pipx", "/usr/bin/pipx"],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let output = self.ctx.run_checked(&program, &["list", "--json"])?;
        Ok(self.parse_output(&output))
    }

    fn uninstall_package(&self, name: &str, _options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        Ok(self.ctx.run(&program, &["uninstall", name])?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        if content_lines(raw).next().is_none() {
            return Vec::new();
        }
        parse_json(raw)
            .and_then(|value| Self::parse_json_venvs(&value))
            .unwrap_or_else(|| Self::parse_text(raw))
    }
}
