//! Poetry handler.
//!
//! Poetry has no global package list. Instead its virtualenv directory is
//! walked: every `<project>-<hash>-py<X.Y>` subdirectory is one project
//! environment, and the project's version is read from the matching
//! `.dist-info` folder inside that environment's site-packages.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::parse::{array_items, content_lines, parse_json, str_field};
use super::{
    HandlerContext, ManagerHandler, ManagerId, PackageLocation, PackageRecord, UninstallOptions,
};
use crate::discovery::Platform;
use crate::error::Result;

/// Poetry virtualenv directory names: `<project>-<8 char hash>-py<major.minor>`.
static VENV_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+)-(?P<hash>[A-Za-z0-9_-]{8})-py(?P<py>\d+\.\d+)$")
        .expect("VENV_NAME_REGEX must compile")
});

const UNKNOWN_VERSION: &str = "unknown";

pub struct PoetryHandler {
    ctx: HandlerContext,
}

impl PoetryHandler {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }

    /// Platform default for Poetry's cache directory.
    fn default_cache_dir(&self) -> String {
        let raw = match self.ctx.environment().platform() {
            Platform::Linux => "~/.cache/pypoetry",
            Platform::MacOS => "~/Library/Caches/pypoetry",
            Platform::Windows => "%LOCALAPPDATA%\\pypoetry\\Cache",
        };
        self.ctx.expand(raw)
    }

    fn default_venv_dir(&self) -> PathBuf {
        PathBuf::from(self.default_cache_dir()).join("virtualenvs")
    }

    /// Ask Poetry for `virtualenvs.path`, falling back to the default.
    fn venv_dir(&self, program: &str) -> PathBuf {
        let configured = self
            .ctx
            .run_checked(program, &["config", "virtualenvs.path"])
            .ok()
            .and_then(|out| {
                let line = out.lines().map(str::trim).find(|l| !l.is_empty())?;
                Some(line.trim_matches('"').to_string())
            });

        match configured {
            Some(path) => {
                let path = path.replace("{cache-dir}", &self.default_cache_dir());
                self.ctx.environment().expand_path(&path)
            }
            None => self.default_venv_dir(),
        }
    }

    fn scan_venvs(&self, dir: &Path) -> Result<Vec<PackageRecord>> {
        if !dir.is_dir() {
            tracing::debug!("No Poetry virtualenvs at {}", dir.display());
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            let Some(project) = project_name(&dir_name) else {
                continue;
            };
            let version = installed_version(&entry.path(), project)
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
            records.extend(Self::record(project, &version, &dir_name));
        }
        records.sort_by(|a, b| a.name.cmp(&b.name).then(a.environment.cmp(&b.environment)));
        Ok(records)
    }

    fn record(project: &str, version: &str, venv: &str) -> Option<PackageRecord> {
        PackageRecord::new(project, version, ManagerId::Poetry, PackageLocation::PoetryEnv)
            .map(|record| record.with_environment(Some(venv)))
    }
}

/// Project part of a Poetry virtualenv directory name.
fn project_name(dir_name: &str) -> Option<&str> {
    VENV_NAME_REGEX
        .captures(dir_name)
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}

/// Distribution names compare case-insensitively with `-`, `_` and `.` folded.
fn normalize(name: &str) -> String {
    name.to_lowercase().replace(['-', '.'], "_")
}

fn site_packages_dirs(venv: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![venv.join("Lib").join("site-packages")];
    if let Ok(entries) = fs::read_dir(venv.join("lib")) {
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with("python") {
                dirs.push(entry.path().join("site-packages"));
            }
        }
    }
    dirs
}

/// Version of `project` installed in `venv`, from its `.dist-info` folder.
fn installed_version(venv: &Path, project: &str) -> Option<String> {
    let wanted = normalize(project);
    site_packages_dirs(venv)
        .into_iter()
        .filter_map(|dir| fs::read_dir(dir).ok())
        .flat_map(|entries| entries.flatten())
        .find_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let stem = file_name.strip_suffix(".dist-info")?;
            let (dist, version) = stem.rsplit_once('-')?;
            (normalize(dist) == wanted && !version.is_empty()).then(|| version.to_string())
        })
}

impl ManagerHandler for PoetryHandler {
    fn id(&self) -> ManagerId {
        ManagerId::Poetry
    }

    fn context(&self) -> &HandlerContext {
        &self.ctx
    }

    fn executable(&self) -> &'static str {
        "poetry"
    }

    fn common_paths(&self) -> Vec<String> {
        let paths: &[&str] = match self.ctx.environment().platform() {
            Platform::Windows => &[
                "%APPDATA%\\Python\\Scripts\\poetry.exe",
                "%APPDATA%\\pypoetry\\venv\\Scripts\\poetry.exe",
                "%USERPROFILE%\\.local\\bin\\poetry.exe",
            ],
            Platform::MacOS => &[
                "~/.local/bin/poetry",
                "~/.poetry/bin/poetry",
                "/opt/homebrew/bin/poetry",
                "/usr/local/bin/poetry",
            ],
            Platform::Linux => &[
                "~/.local/bin/poetry",
                "~/.poetry/bin/poetry",
                "/usr/local/bin/poetry",
            ],
        };
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let program = self.program()?;
        let dir = self.venv_dir(&program);
        self.scan_venvs(&dir)
    }

    /// Poetry cannot remove a project environment globally.
    fn uninstall_package(&self, name: &str, _options: &UninstallOptions) -> Result<bool> {
        tracing::debug!("Poetry has no global uninstall; ignoring '{}'", name);
        Ok(false)
    }

    /// Accepts a JSON array of `{name, version}` or `poetry env list` lines.
    fn parse_output(&self, raw: &str) -> Vec<PackageRecord> {
        if let Some(value) = parse_json(raw).filter(|v| v.is_array()) {
            return array_items(&value)
                .filter_map(|entry| {
                    let name = str_field(entry, "name")?;
                    let version = str_field(entry, "version")?;
                    PackageRecord::new(name, version, ManagerId::Poetry, PackageLocation::PoetryEnv)
                        .map(|r| r.with_environment(str_field(entry, "environment")))
                })
                .collect();
        }

        content_lines(raw)
            .filter_map(|line| {
                let line = line.trim_end_matches("(Activated)").trim();
                let dir_name = line.rsplit(['/', '\\']).next()?;
                Self::record(project_name(dir_name)?, UNKNOWN_VERSION, dir_name)
            })
            .collect()
    }
}
