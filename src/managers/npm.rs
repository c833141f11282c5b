//! npm handler for globally installed packages.

use std::collections::HashMap;

use super::parse::{content_lines, parse_json, str_field};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

const LIST_ARGS: &[&str] = &["list", "-g", "--depth=0", "--json"];
const OUTDATED_ARGS: &[&str] = &["outdated", "-g", "--json"];

pub struct NpmHandler {
    ctx: HandlerContext,
}

impl NpmHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn record(name: &str, version: &str) -> Option<PackageRecord> {
        if name == "npm" {
            return None;
        }
        PackageRecord::new(name, version, ManagerId::Npm, PackageLocation::NpmGlobal)
    }

    /// `├── name@version` lines from `npm list -g`.
    fn parse_tree_line(line: &str) -> Option<PackageRecord> {
        let (_, spec) = line.split_once("── ")?;
        let spec = spec.split_whitespace().next()?;
        // Scoped names start with '@', so split at the last one.
        let (name, version) = spec.rsplit_once('@')?;
        Self::record(name, version)
    }

    /// `{"name": {"current": .., "wanted": .., "latest": ..}}` from `npm outdated --json`.
    fn parse_outdated(raw: &str) -> HashMap<String, String> {
        let Some(value) = parse_json(raw) else {
            return HashMap::new();
        };
        value
            .as_object()
            .into_iter()
            .flatten()
            .filter_map(|(name, meta)| Some((name.clone(), str_field(meta, "latest")?.to_string())))
            .collect()
    }
}

impl ManagerHandler for NpmHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Npm
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "npm"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%ProgramFiles%\\nodejs\\npm.cmd",
                "%APPDATA%\\npm\\npm.cmd",
            ],
            Platform::MacOS => &[
                "/opt/homebrew/bin/npm",
                "/usr/local/bin/npm",
                "~/.volta/bin/npm",
            ],
            Platform::Linux => &["/usr/local/bin/npm", "/usr/bin/npm", "~/.volta/bin/npm"],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    /// npm exits non-zero on dependency warnings while still printing the
    /// tree, so any non-empty stdout is parsed.
    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let output = self.ctx.run_lenient(&program, LIST_ARGS)?;
        Ok(self.parse_output(&output))
    }

    fn uninstall_package(&self, name: &str, _options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        Ok(self.ctx.run(&program, &["uninstall", "-g", name])?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        if let Some(value) = parse_json(raw).filter(|v| v.is_object()) {
            return value
                .get("dependencies")
                .and_then(|deps| deps.as_object())
                .into_iter()
                .flatten()
                .filter_map(|(name, meta)| Self::record(name, str_field(meta, "version")?))
                .collect();
        }

        content_lines(raw).filter_map(Self::parse_tree_line).collect()
    }

    /// `npm outdated` exits 1 whenever it has something to report.
    fn latest_versions(&self) -> Result<HashMap<String, String>> {
        let program = self.program()?;
        let output = self.ctx.run_lenient(&program, OUTDATED_ARGS)?;
        Ok(Self::parse_outdated(&output))
    }
}
