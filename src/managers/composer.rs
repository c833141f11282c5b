//! Composer handler for global PHP packages.

use super::parse::{array_items, content_lines, name_and_version, parse_json, str_field};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

pub struct ComposerHandler {
    ctx: HandlerContext,
}

impl ComposerHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn record(name: &str, version: &str, description: Option<&str>) -> Option<PackageRecord> {
        PackageRecord::new(name, version, ManagerId::Composer, PackageLocation::ComposerGlobal)
            .map(|record| record.with_description(description))
    }
}

impl ManagerHandler for ComposerHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Composer
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "composer"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%ProgramData%\\ComposerSetup\\bin\\composer.bat",
                "%APPDATA%\\Composer\\vendor\\bin\\composer.bat",
            ],
            Platform::MacOS => &["/opt/homebrew/bin/composer", "/usr/local/bin/composer"],
            Platform::Linux => &["/usr/local/bin/composer", "/usr/bin/composer"],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let output = self
            .ctx
            .run_checked(&program, &["global", "show", "--format=json"])?;
        Ok(self.parse_output(&output))
    }

    fn uninstall_package(&self, name: &str, _options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        Ok(self.ctx.run(&program, &["global", "remove", name])?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        if let Some(value) = parse_json(raw).filter(|v| v.is_object()) {
            return value
                .get("installed")
                .into_iter()
                .flat_map(array_items)
                .filter_map(|entry| {
                    Self::record(
                        str_field(entry, "name")?,
                        str_field(entry, "version")?,
                        str_field(entry, "description"),
                    )
                })
                .collect();
        }

        // name version description...
        content_lines(raw)
            .filter_map(|line| {
                let (name, version) = name_and_version(line)?;
                // Packages are always vendor/name.
                if !name.contains('/') {
                    return None;
                }
                let description = line.split_whitespace().skip(2).collect::<Vec<_>>().join(" ");
                Self::record(name, version, Some(&description))
            })
            .collect()
    }
}
