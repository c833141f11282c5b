//! pyenv handler.
//!
//! Every installed interpreter is reported as a package named `python`; the
//! version string distinguishes them.

use super::parse::content_lines;
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

const PACKAGE_NAME: &str = "python";

pub struct PyenvHandler {
    ctx: HandlerContext,
}

impl PyenvHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

impl ManagerHandler for PyenvHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Pyenv
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "pyenv"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%USERPROFILE%\\.pyenv\\pyenv-win\\bin\\pyenv.bat",
                "%USERPROFILE%\\.pyenv\\pyenv-win\\bin\\pyenv",
            ],
            Platform::MacOS => &[
                "~/.pyenv/bin/pyenv",
                "/opt/homebrew/bin/pyenv",
                "/usr/local/bin/pyenv",
            ],
            Platform::Linux => &["~/.pyenv/bin/pyenv", "/usr/local/bin/pyenv", "/usr/bin/pyenv"],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let output = self.ctx.run_checked(&program, &["versions", "--bare"])?;
        Ok(self.parse_output(&output))
    }

    /// `name` is the interpreter version to remove, e.g. `3.11.4`.
    fn uninstall_package(&self, name: &str, _options: &UninstallOptions) -> Result<bool> {
        let program = self.program()?;
        Ok(self.ctx.run(&program, &["uninstall", "-f", name])?.success)
    }

    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        content_lines(raw)
            .filter_map(|version| {
                PackageRecord::new(
                    PACKAGE_NAME,
                    version,
                    ManagerId::Pyenv,
                    PackageLocation::PyenvVersion,
                )
            })
            .collect()
    }
}
