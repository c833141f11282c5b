//! Homebrew handler.
//!
//! Formulae and casks are listed by two separate `brew list` calls that run
//! concurrently. `brew list --versions` prints every installed version of a
//! package; only the first is reported.

use serde_json::Value;
use std::collections::HashMap;

use super::parse::{array_items, content_lines, name_and_version, parse_json, str_field};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

pub struct HomebrewHandler {
    ctx: HandlerContext,
}

impl HomebrewHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn parse_list(&self, raw: &str, location: PackageLocation) -> Vec<PackageRecord> {
        content_lines(raw)
            .filter_map(name_and_version)
            .filter_map(|(name, version)| {
                PackageRecord::new(name, version, ManagerId::Homebrew, location)
            })
            .collect()
    }

    /// `brew info --json=v2 --installed` document.
    fn parse_info_json(&self, value: &Value) -> Option<Vec<PackageRecord>> {
        let formulae = value.get("formulae");
        let casks = value.get("casks");
        if formulae.is_none() && casks.is_none() {
            return None;
        }

        let mut records = Vec::new();
        for formula in formulae.into_iter().flat_map(array_items) {
            let name = str_field(formula, "name");
            let version = formula
                .get("installed")
                .and_then(|installed| installed.get(0))
                .and_then(|first| str_field(first, "version"));
            if let (Some(name), Some(version)) = (name, version) {
                records.extend(PackageRecord::new(
                    name,
                    version,
                    ManagerId::Homebrew,
                    PackageLocation::Formula,
                ));
            }
        }
        for cask in casks.into_iter().flat_map(array_items) {
            let name = str_field(cask, "token");
            let version = str_field(cask, "installed").or_else(|| str_field(cask, "version"));
            if let (Some(name), Some(version)) = (name, version) {
                records.extend(PackageRecord::new(
                    name,
                    version,
                    ManagerId::Homebrew,
                    PackageLocation::Cask,
                ));
            }
        }
        Some(records)
    }

    /// `brew outdated --json=v2`: formulae and casks, each with a
    /// `current_version`.
    fn parse_outdated(raw: &str) -> HashMap<String, String> {
        let Some(value) = parse_json(raw) else {
            return HashMap::new();
        };
        ["formulae", "casks"]
            .into_iter()
            .filter_map(|kind| value.get(kind))
            .flat_map(array_items)
            .filter_map(|entry| {
                Some((
                    str_field(entry, "name")?.to_string(),
                    str_field(entry, "current_version")?.to_string(),
                ))
            })
            .collect()
    }

    fn list_kind(&self, program: &str, flag: &str, location: PackageLocation) -> Result<Vec<PackageRecord>> {
        let output = self.ctx.run_checked(program, &["list", flag, "--versions"])?;
        Ok(self.parse_list(&output, location))
    }
}

impl ManagerHandler for HomebrewHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Homebrew
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "brew"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::MacOS => &["/opt/homebrew/bin/brew", "/usr/local/bin/brew"],
            Platform::Linux => &[
                "/home/linuxbrew/.linuxbrew/bin/brew",
                "~/.linuxbrew/bin/brew",
            ],
            Platform::Windows => &[],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;

        let (formulae, casks) = rayon::join(
            || self.list_kind(&program, "--formula", PackageLocation::Formula),
            || self.list_kind(&program, "--cask", PackageLocation::Cask),
        );

        match (formulae, casks) {
            (Err(e), Err(_)) => Err(e),
            (formulae, casks) => {
                let mut records = Vec::new();
                for listing in [formulae, casks] {
                    match listing {
                        Ok(found) => records.extend(found),
                        Err(e) => tracing::warn!("Partial Homebrew listing: {}", e),
                    }
                }
                Ok(records)
            }
        }
    }

    fn uninstall_package(&self, name: &str, options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        let mut args = vec!["uninstall"];
        if options.cask {
            args.push("--cask");
        }
        args.push(name);

        Ok(self.ctx.run(&program, &args)?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        parse_json(raw)
            .and_then(|value| self.parse_info_json(&value))
            .unwrap_or_else(|| self.parse_list(raw, PackageLocation::Formula))
    }

    fn latest_versions(&self) -> Result<HashMap<String, String>> {
        let program = self.program()?;
        let output = self.ctx.run_lenient(&program, &["outdated", "--json=v2"])?;
        Ok(Self::parse_outdated(&output))
    }
}
