//! Package manager handlers.
//!
//! Each supported manager implements [`ManagerHandler`]: how to find its
//! binary, how to list what it installed, how to remove a package and how to
//! turn its raw output into [`PackageRecord`]s. Handlers share one
//! [`TieredPathSearch`] through [`HandlerContext`], and therefore one cache.

pub mod composer;
pub mod conda;
pub mod homebrew;
pub mod npm;
pub mod parse;
pub mod pip;
pub mod pipx;
pub mod poetry;
pub mod pyenv;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::discovery::{Environment, ExecutableSearchResult, TieredPathSearch};
use crate::error::{JanitorError, Result};
use crate::shell::{display_command, CommandResult, CommandRunner};

pub use composer::ComposerHandler;
pub use conda::CondaHandler;
pub use homebrew::HomebrewHandler;
pub use npm::NpmHandler;
pub use pip::PipHandler;
pub use pipx::PipxHandler;
pub use poetry::PoetryHandler;
pub use pyenv::PyenvHandler;

/// Bound on listing and uninstall commands.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(120);

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerId {
    Homebrew,
    Conda,
    Pipx,
    Poetry,
    Pyenv,
    Npm,
    Pip,
    Composer,
}

impl ManagerId {
    /// Every manager, in registration order.
    pub const ALL: [ManagerId; 8] = [
        Self::Homebrew,
        Self::Conda,
        Self::Pipx,
        Self::Poetry,
        Self::Pyenv,
        Self::Npm,
        Self::Pip,
        Self::Composer,
    ];

    /// Stable short identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homebrew => "homebrew",
            Self::Conda => "conda",
            Self::Pipx => "pipx",
            Self::Poetry => "poetry",
            Self::Pyenv => "pyenv",
            Self::Npm => "npm",
            Self::Pip => "pip",
            Self::Composer => "composer",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Homebrew => "Homebrew",
            Self::Conda => "Conda",
            Self::Pipx => "pipx",
            Self::Poetry => "Poetry",
            Self::Pyenv => "pyenv",
            Self::Npm => "npm",
            Self::Pip => "pip",
            Self::Composer => "Composer",
        }
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerId {
    type Err = JanitorError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .or(match wanted.as_str() {
                "brew" => Some(Self::Homebrew),
                "pip3" => Some(Self::Pip),
                _ => None,
            })
            .ok_or_else(|| JanitorError::UnknownManager {
                name: s.to_string(),
            })
    }
}

/// Where a package lives inside its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageLocation {
    Formula,
    Cask,
    CondaEnv,
    PipxVenv,
    PoetryEnv,
    PyenvVersion,
    NpmGlobal,
    PipSite,
    ComposerGlobal,
}

impl PackageLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formula => "formula",
            Self::Cask => "cask",
            Self::CondaEnv => "conda-env",
            Self::PipxVenv => "pipx-venv",
            Self::PoetryEnv => "poetry-env",
            Self::PyenvVersion => "pyenv-version",
            Self::NpmGlobal => "npm-global",
            Self::PipSite => "pip-site",
            Self::ComposerGlobal => "composer-global",
        }
    }
}

impl fmt::Display for PackageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One installed package.
///
/// Construct through [`PackageRecord::new`], which rejects blank names and
/// versions, so every record in circulation has both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub location: PackageLocation,
    pub manager: ManagerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Newest release, when an update check ran and found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(default)]
    pub outdated: bool,
}

impl PackageRecord {
    /// Build a record, or `None` if `name` or `version` is blank.
    pub fn new(
        name: &str,
        version: &str,
        manager: ManagerId,
        location: PackageLocation,
    ) -> Option<Self> {
        let name = name.trim();
        let version = version.trim();
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            version: version.to_string(),
            location,
            manager,
            channel: None,
            environment: None,
            description: None,
            latest: None,
            outdated: false,
        })
    }

    pub fn with_channel(mut self, channel: Option<&str>) -> Self {
        self.channel = parse::non_blank(channel).map(str::to_string);
        self
    }

    pub fn with_environment(mut self, environment: Option<&str>) -> Self {
        self.environment = parse::non_blank(environment).map(str::to_string);
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = parse::non_blank(description).map(str::to_string);
        self
    }

    pub fn with_latest(mut self, latest: Option<&str>) -> Self {
        self.set_latest(latest);
        self
    }

    /// Record the newest release; the package is outdated when it differs
    /// from the installed version.
    pub fn set_latest(&mut self, latest: Option<&str>) {
        self.latest = parse::non_blank(latest).map(str::to_string);
        self.outdated = self
            .latest
            .as_deref()
            .is_some_and(|latest| latest != self.version);
    }
}

/// Extra switches for [`ManagerHandler::uninstall_package`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    /// Remove a Homebrew cask instead of a formula.
    pub cask: bool,

    /// Target environment (Conda `-n`).
    pub environment: Option<String>,
}

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct HandlerContext {
    search: Arc<TieredPathSearch>,
}

impl HandlerContext {
    pub fn new(search: Arc<TieredPathSearch>) -> Self {
        Self { search }
    }

    pub fn search(&self) -> &Arc<TieredPathSearch> {
        &self.search
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        self.search.runner()
    }

    pub fn environment(&self) -> &Environment {
        self.search.environment()
    }

    /// Resolve an executable through the shared search.
    pub fn resolve(&self, executable: &str, common_paths: &[String]) -> Option<ExecutableSearchResult> {
        self.search.find_executable(executable, common_paths)
    }

    /// Resolve the first of several names a binary ships under.
    ///
    /// Each name only gets the common paths ending in that name. A hit that
    /// is reachable through PATH is returned at once; otherwise the first
    /// hit at a common or custom location is kept while the remaining names
    /// are tried.
    pub fn resolve_any(
        &self,
        names: &[&str],
        common_paths: &[String],
    ) -> Option<ExecutableSearchResult> {
        let mut fallback = None;
        for name in names {
            let paths: Vec<String> = common_paths
                .iter()
                .filter(|path| names_binary(path, name))
                .cloned()
                .collect();
            match self.resolve(name, &paths) {
                Some(found) if found.in_path() => return Some(found),
                Some(found) => {
                    fallback.get_or_insert(found);
                }
                None => {}
            }
        }
        fallback
    }

    /// Run a listing or uninstall command under [`LIST_TIMEOUT`].
    pub fn run(&self, program: &str, args: &[&str]) -> Result<CommandResult> {
        tracing::debug!("Running: {}", display_command(program, args));
        self.runner().run(program, args, LIST_TIMEOUT)
    }

    /// Stdout of a command that may exit non-zero while still printing a
    /// usable report. Fails only when it exits non-zero with nothing on stdout.
    pub fn run_lenient(&self, program: &str, args: &[&str]) -> Result<String> {
        let result = self.run(program, args)?;
        if !result.success && result.stdout.trim().is_empty() {
            return Err(JanitorError::CommandFailed {
                command: display_command(program, args),
                code: result.exit_code,
            });
        }
        Ok(result.stdout)
    }

    /// Like [`run`](Self::run), but a non-zero exit is an error.
    pub fn run_checked(&self, program: &str, args: &[&str]) -> Result<String> {
        let result = self.run(program, args)?;
        if result.success {
            Ok(result.stdout)
        } else {
            if !result.stderr.trim().is_empty() {
                tracing::debug!("stderr: {}", result.stderr.trim());
            }
            Err(JanitorError::CommandFailed {
                command: display_command(program, args),
                code: result.exit_code,
            })
        }
    }

    /// Expand `~` and `%VAR%` in a path template for this environment.
    pub fn expand(&self, raw: &str) -> String {
        self.environment()
            .expand_path(raw)
            .to_string_lossy()
            .into_owned()
    }
}

/// Whether the last component of `path` is `name`, with or without `.exe`.
fn names_binary(path: &str, name: &str) -> bool {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file == name
        || file
            .to_ascii_lowercase()
            .strip_suffix(".exe")
            .is_some_and(|stem| stem == name)
}

/// Capability contract for one package manager.
pub trait ManagerHandler: Send + Sync {
    /// Stable identifier.
    fn id(&self) -> ManagerId;

    /// Shared services.
    fn context(&self) -> &HandlerContext;

    /// Binary name handed to the tiered search.
    fn executable(&self) -> &'static str;

    /// Well-known install locations for the current platform, in order.
    fn common_paths(&self) -> Vec<String>;

    /// Human-readable name.
    fn display_name(&self) -> &'static str {
        self.id().display_name()
    }

    /// Resolve the binary, returning its path or bare name.
    fn locate(&self) -> Option<ExecutableSearchResult> {
        self.context()
            .resolve(self.executable(), &self.common_paths())
    }

    /// Whether a working binary can be found.
    fn check_availability(&self) -> bool {
        self.locate().is_some()
    }

    /// Program to invoke, or `ManagerUnavailable`.
    fn program(&self) -> Result<String> {
        self.locate()
            .map(|found| found.path().to_string())
            .ok_or_else(|| JanitorError::ManagerUnavailable {
                manager: self.id().to_string(),
            })
    }

    /// Enumerate installed packages.
    fn list_packages(&self) -> Result<Vec<PackageRecord>>;

    /// Remove a package; `Ok(false)` if the manager reported failure.
    fn uninstall_package(&self, name: &str, options: &UninstallOptions) -> Result<bool>;

    /// Turn raw command output into records. Never fails.
    fn parse_output(&self, raw: &str) -> Vec<PackageRecord>;

    /// Newest release of each package that has one, keyed by package name.
    ///
    /// Packages that are current may be left out. Managers without an
    /// update check report nothing.
    fn latest_versions(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

/// Build one handler of each kind over a shared context.
pub fn default_handlers(ctx: &HandlerContext) -> Vec<Box<dyn ManagerHandler>> {
    vec![
        Box::new(HomebrewHandler::new(ctx.clone())),
        Box::new(CondaHandler::new(ctx.clone())),
        Box::new(PipxHandler::new(ctx.clone())),
        Box::new(PoetryHandler::new(ctx.clone())),
        Box::new(PyenvHandler::new(ctx.clone())),
        Box::new(NpmHandler::new(ctx.clone())),
        Box::new(PipHandler::new(ctx.clone())),
        Box::new(ComposerHandler::new(ctx.clone())),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;

    #[test]
    fn manager_id_round_trips_through_str() {
        for id in ManagerId::ALL {
            assert_eq!(id.as_str().parse::<ManagerId>().unwrap(), id);
        }
    }

    #[test]
    fn manager_id_accepts_aliases_and_case() {
        assert_eq!("brew".parse::<ManagerId>().unwrap(), ManagerId::Homebrew);
        assert_eq!("Conda".parse::<ManagerId>().unwrap(), ManagerId::Conda);
    }

    #[test]
    fn unknown_manager_is_an_error() {
        let err = "cargo".parse::<ManagerId>().unwrap_err();
        assert!(matches!(err, JanitorError::UnknownManager { .. }));
    }

    #[test]
    fn record_rejects_blank_fields() {
        assert!(PackageRecord::new("", "1.0", ManagerId::Pip, PackageLocation::PipSite).is_none());
        assert!(PackageRecord::new("x", "  ", ManagerId::Pip, PackageLocation::PipSite).is_none());
        assert!(PackageRecord::new(" x ", "1.0", ManagerId::Pip, PackageLocation::PipSite).is_some());
    }

    #[test]
    fn record_serializes_camel_case_without_empty_hints() {
        let record = PackageRecord::new("numpy", "1.26.0", ManagerId::Conda, PackageLocation::CondaEnv)
            .unwrap()
            .with_channel(Some("conda-forge"))
            .with_environment(Some(""));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["location"], "conda-env");
        assert_eq!(json["manager"], "conda");
        assert_eq!(json["channel"], "conda-forge");
        assert!(json.get("environment").is_none());
    }

    #[test]
    fn latest_marks_record_outdated_only_when_it_differs() {
        let record = PackageRecord::new("typescript", "5.3.3", ManagerId::Npm, PackageLocation::NpmGlobal)
            .unwrap();

        let newer = record.clone().with_latest(Some("5.4.2"));
        assert!(newer.outdated);
        assert_eq!(newer.latest.as_deref(), Some("5.4.2"));

        let same = record.clone().with_latest(Some("5.3.3"));
        assert!(!same.outdated);

        let blank = record.with_latest(Some(" "));
        assert!(!blank.outdated);
        assert_eq!(blank.latest, None);
    }

    #[test]
    fn record_without_update_fields_deserializes() {
        let record: PackageRecord = serde_json::from_str(
            r#"{"name": "rich", "version": "13.7.0", "location": "pip-site", "manager": "pip"}"#,
        )
        .unwrap();
        assert_eq!(record.latest, None);
        assert!(!record.outdated);

        let json = serde_json::to_value(record.with_latest(Some("13.7.1"))).unwrap();
        assert_eq!(json["latest"], "13.7.1");
        assert_eq!(json["outdated"], true);
    }

    #[test]
    fn run_lenient_keeps_output_of_non_zero_exit() {
        let runner = Arc::new(MockRunner::new());
        runner.fail_with_output("npm outdated -g --json", 1, r#"{"yarn": {}}"#);
        runner.fail("npm list -g --depth=0 --json", 1);
        let ctx = test_support::context(runner);

        let stdout = ctx.run_lenient("npm", &["outdated", "-g", "--json"]).unwrap();
        assert_eq!(stdout, r#"{"yarn": {}}"#);
        assert!(ctx.run_lenient("npm", &["list", "-g", "--depth=0", "--json"]).is_err());
    }

    #[test]
    fn binary_names_match_last_component() {
        assert!(names_binary("/usr/bin/pip", "pip"));
        assert!(names_binary("%APPDATA%\\Python\\Scripts\\pip.exe", "pip"));
        assert!(!names_binary("/usr/bin/pip3", "pip"));
        assert!(names_binary("~/.local/bin/pip3", "pip3"));
        assert!(!names_binary("/opt/pip/bin/pipx", "pip"));
    }

    #[test]
    fn resolve_any_prefers_a_name_on_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let pip = temp.path().join("local/pip");
        std::fs::create_dir_all(pip.parent().unwrap()).unwrap();
        std::fs::write(&pip, "#!/bin/sh\n").unwrap();

        let runner = Arc::new(MockRunner::new());
        runner.succeed(&format!("{} --version", pip.display()), "pip 23.0.1");
        runner.succeed("pip3 --version", "pip 24.0");
        let ctx = test_support::context(runner);

        let found = ctx
            .resolve_any(&["pip", "pip3"], &[pip.display().to_string()])
            .unwrap();

        assert_eq!(found.path(), "pip3");
        assert!(found.in_path());
    }

    #[test]
    fn resolve_any_falls_back_to_first_off_path_hit() {
        let temp = tempfile::TempDir::new().unwrap();
        let pip = temp.path().join("local/pip");
        std::fs::create_dir_all(pip.parent().unwrap()).unwrap();
        std::fs::write(&pip, "#!/bin/sh\n").unwrap();

        let runner = Arc::new(MockRunner::new());
        runner.succeed(&format!("{} --version", pip.display()), "pip 23.0.1");
        let ctx = test_support::context(runner);

        let found = ctx
            .resolve_any(&["pip", "pip3"], &[pip.display().to_string()])
            .unwrap();

        assert_eq!(found.method(), crate::discovery::DiscoveryMethod::CommonPath);
        assert!(ctx.resolve_any(&["pip3"], &[]).is_none());
    }

    #[test]
    fn handlers_without_update_check_report_nothing() {
        let ctx = test_support::context(Arc::new(MockRunner::new()));
        let pyenv = PyenvHandler::new(ctx);
        assert!(pyenv.latest_versions().unwrap().is_empty());
    }

    #[test]
    fn default_handlers_cover_every_manager() {
        let ctx = test_support::context(Arc::new(MockRunner::new()));
        let ids: Vec<ManagerId> = default_handlers(&ctx).iter().map(|h| h.id()).collect();
        assert_eq!(ids, ManagerId::ALL.to_vec());
    }

    #[test]
    fn run_checked_maps_non_zero_exit() {
        let runner = Arc::new(MockRunner::new());
        runner.fail("conda list --json", 2);
        let ctx = test_support::context(runner);

        let err = ctx.run_checked("conda", &["list", "--json"]).unwrap_err();
        assert!(matches!(
            err,
            JanitorError::CommandFailed { code: Some(2), .. }
        ));
    }

    #[test]
    fn every_handler_parse_is_total() {
        let ctx = test_support::context(Arc::new(MockRunner::new()));
        for handler in default_handlers(&ctx) {
            test_support::assert_total(handler.as_ref());
        }
    }
}
