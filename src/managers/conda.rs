//! Conda handler.

use super::parse::{
    array_items, content_lines, is_json_fragment, name_and_version, parse_json, str_field,
};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

pub struct CondaHandler {
    ctx: HandlerContext,
}

impl CondaHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    fn record(name: &str, version: &str, channel: Option<&str>) -> Option<PackageRecord> {
        PackageRecord::new(name, version, ManagerId::Conda, PackageLocation::CondaEnv)
            .map(|record| record.with_channel(channel))
    }
}

impl ManagerHandler for CondaHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Conda
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "conda"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%USERPROFILE%\\miniconda3\\Scripts\\conda.exe",
                "%USERPROFILE%\\anaconda3\\Scripts\\conda.exe",
                "%USERPROFILE%\\miniforge3\\Scripts\\conda.exe",
                "%LOCALAPPDATA%\\miniconda3\\Scripts\\conda.exe",
                "%ProgramData%\\miniconda3\\Scripts\\conda.exe",
                "%ProgramData%\\Anaconda3\\Scripts\\conda.exe",
            ],
            Platform::MacOS => &[
                "~/miniconda3/bin/conda",
                "~/anaconda3/bin/conda",
                "~/miniforge3/bin/conda",
                "~/mambaforge/bin/conda",
                "/opt/homebrew/Caskroom/miniconda/base/bin/conda",
                "/usr/local/Caskroom/miniconda/base/bin/conda",
                "/opt/anaconda3/bin/conda",
            ],
            Platform::Linux => &[
                "~/miniconda3/bin/conda",
                "~/anaconda3/bin/conda",
                "~/miniforge3/bin/conda",
                "~/mambaforge/bin/conda",
                "/opt/conda/bin/conda",
                "/opt/miniconda3/bin/conda",
                "/opt/anaconda3/bin/conda",
            ],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let output = self.ctx.run_checked(&program, &["list", "--json"])?;
        Ok(self.parse_output(&output))
    }

    fn uninstall_package(&self, name: &str, options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        let mut args = vec!["remove", "-y"];
        if let Some(env) = options.environment.as_deref() {
            args.extend(["-n", env]);
        }
        args.push(name);

        Ok(self.ctx.run(&program, &args)?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        if let Some(value) = parse_json(raw).filter(|v| v.is_array()) {
            return array_items(&value)
                .filter_map(|entry| {
                    Self::record(
                        str_field(entry, "name")?,
                        str_field(entry, "version")?,
                        str_field(entry, "channel"),
                    )
                })
                .collect();
        }

        // name version [build] [channel]
        content_lines(raw)
            .filter(|line| !is_json_fragment(line))
            .filter_map(|line| {
                let (name, version) = name_and_version(line)?;
                let channel = line.split_whitespace().nth(3);
                Self::record(name, version, channel)
            })
            .collect()
    }
}
