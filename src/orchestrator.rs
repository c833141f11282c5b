//! Package discovery across every registered manager.
//!
//! [`PackageDiscovery`] owns the path cache, the tiered search and one
//! handler per manager. Its public methods never fail: handler errors and
//! panics are logged and turned into `not_installed`, an empty list or
//! `false`, so one broken manager cannot take the others down.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dev_janitor::discovery::{Environment, Platform};
//! use dev_janitor::managers::ManagerId;
//! use dev_janitor::orchestrator::{Availability, PackageDiscovery};
//! use dev_janitor::shell::MockRunner;
//!
//! let runner = Arc::new(MockRunner::new());
//! runner.succeed("pyenv --version", "pyenv 2.3.36");
//! runner.succeed("pyenv versions --bare", "3.11.7\n3.12.1\n");
//!
//! let discovery = PackageDiscovery::with_runner(runner, Environment::new(Platform::Linux));
//! let status = discovery.get_manager_status(ManagerId::Pyenv);
//! assert_eq!(status.status, Availability::Available);
//! assert_eq!(discovery.list_packages(ManagerId::Pyenv).len(), 2);
//! ```

use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use crate::config::{self, CustomConfig};
use crate::discovery::{DiscoveryMethod, Environment, PathCache, TieredPathSearch};
use crate::managers::{
    default_handlers, HandlerContext, ManagerHandler, ManagerId, PackageRecord, UninstallOptions,
};
use crate::shell::{CommandRunner, SystemRunner};

/// Three-state availability of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Resolved by direct command or PATH scan.
    Available,
    /// Resolved only at a common or custom path.
    PathMissing,
    NotInstalled,
}

impl Availability {
    /// Whether a working binary was found at all.
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::NotInstalled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::PathMissing => "path_missing",
            Self::NotInstalled => "not_installed",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discovery outcome for one manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStatus {
    pub manager: ManagerId,
    pub status: Availability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_method: Option<DiscoveryMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_path: Option<String>,
    pub in_path: bool,
    /// Version the binary reported when it was probed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ManagerStatus {
    fn not_installed(manager: ManagerId, message: Option<String>) -> Self {
        Self {
            manager,
            status: Availability::NotInstalled,
            discovery_method: None,
            found_path: None,
            in_path: false,
            version: None,
            message,
        }
    }
}

/// Progress callback: `(manager, status text)`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(ManagerId, &str);

/// Runs discovery, listing and uninstall across all managers.
pub struct PackageDiscovery {
    cache: Arc<PathCache>,
    search: Arc<TieredPathSearch>,
    handlers: BTreeMap<ManagerId, Box<dyn ManagerHandler>>,
}

impl PackageDiscovery {
    /// Discovery over the real process environment.
    pub fn new() -> Self {
        Self::with_runner(Arc::new(SystemRunner::new()), Environment::from_process())
    }

    /// Discovery with every built-in handler over `runner` and `env`.
    pub fn with_runner(runner: Arc<dyn CommandRunner>, env: Environment) -> Self {
        let mut discovery = Self::empty(runner, env);
        for handler in default_handlers(&discovery.context()) {
            discovery.register(handler);
        }
        discovery
    }

    /// Discovery with no handlers registered.
    pub fn empty(runner: Arc<dyn CommandRunner>, env: Environment) -> Self {
        let cache = Arc::new(PathCache::new());
        let search = Arc::new(TieredPathSearch::new(cache.clone(), runner, env));
        Self {
            cache,
            search,
            handlers: BTreeMap::new(),
        }
    }

    /// Add or replace the handler for its manager id.
    pub fn register(&mut self, handler: Box<dyn ManagerHandler>) {
        self.handlers.insert(handler.id(), handler);
    }

    /// Context for building handlers that share this instance's search.
    pub fn context(&self) -> HandlerContext {
        HandlerContext::new(self.search.clone())
    }

    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    pub fn search(&self) -> &Arc<TieredPathSearch> {
        &self.search
    }

    /// Registered managers, in id order.
    pub fn manager_ids(&self) -> Vec<ManagerId> {
        self.handlers.keys().copied().collect()
    }

    pub fn handler(&self, id: ManagerId) -> Option<&dyn ManagerHandler> {
        self.handlers.get(&id).map(|h| h.as_ref())
    }

    fn is_disabled(&self, id: ManagerId) -> bool {
        self.search
            .custom_config()
            .is_some_and(|config| config.is_disabled(id.as_str()))
    }

    /// Status of every registered manager, checked concurrently.
    pub fn discover_available_managers(&self) -> Vec<ManagerStatus> {
        let mut statuses: Vec<ManagerStatus> = self
            .handlers
            .par_iter()
            .map(|(id, _)| self.get_manager_status(*id))
            .collect();
        statuses.sort_by_key(|status| status.manager);
        statuses
    }

    /// Resolve one manager and classify the result.
    pub fn get_manager_status(&self, id: ManagerId) -> ManagerStatus {
        let Some(handler) = self.handler(id) else {
            return ManagerStatus::not_installed(id, Some("no handler registered".to_string()));
        };
        if self.is_disabled(id) {
            return ManagerStatus::not_installed(
                id,
                Some("disabled in configuration".to_string()),
            );
        }

        let located = panic::catch_unwind(AssertUnwindSafe(|| handler.locate()));
        let status = match located {
            Ok(Some(found)) => {
                let method = found.method();
                let (status, message) = if found.in_path() {
                    (Availability::Available, None)
                } else {
                    (
                        Availability::PathMissing,
                        Some(path_missing_message(handler.display_name(), found.path())),
                    )
                };
                ManagerStatus {
                    manager: id,
                    status,
                    discovery_method: Some(method),
                    found_path: Some(found.path().to_string()),
                    in_path: found.in_path(),
                    version: found.version().map(str::to_string),
                    message,
                }
            }
            Ok(None) => ManagerStatus::not_installed(id, None),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!("Discovery of {} panicked: {}", id, reason);
                ManagerStatus::not_installed(id, Some(format!("discovery failed: {}", reason)))
            }
        };

        self.cache
            .set_availability(handler.executable(), status.status.is_usable());
        status
    }

    /// Packages of one manager; empty if it is unavailable or fails.
    pub fn list_packages(&self, id: ManagerId) -> Vec<PackageRecord> {
        let Some(handler) = self.handler(id) else {
            tracing::debug!("No handler registered for {}", id);
            return Vec::new();
        };
        if self.is_disabled(id) {
            return Vec::new();
        }

        let listed = panic::catch_unwind(AssertUnwindSafe(|| {
            if !handler.check_availability() {
                return Ok(Vec::new());
            }
            handler.list_packages()
        }));

        match listed {
            Ok(Ok(packages)) => {
                tracing::debug!("{} listed {} packages", id, packages.len());
                packages
            }
            Ok(Err(e)) => {
                tracing::warn!("Listing {} packages failed: {}", id, e);
                Vec::new()
            }
            Err(payload) => {
                tracing::warn!(
                    "Listing {} packages panicked: {}",
                    id,
                    panic_message(payload.as_ref())
                );
                Vec::new()
            }
        }
    }

    /// Packages of every usable manager, listed one manager at a time.
    ///
    /// `on_progress` is called once before and once after each manager.
    pub fn list_all_packages(&self, mut on_progress: Option<ProgressFn<'_>>) -> Vec<PackageRecord> {
        let mut all = Vec::new();
        for status in self.discover_available_managers() {
            if !status.status.is_usable() {
                continue;
            }
            let id = status.manager;
            let name = id.display_name();

            report(&mut on_progress, id, &format!("Listing {} packages...", name));
            let packages = self.list_packages(id);
            report(
                &mut on_progress,
                id,
                &format!("Found {}", counted(packages.len(), &format!("{} package", name))),
            );
            all.extend(packages);
        }
        all
    }

    /// Fill in `latest` and `outdated` from each manager's update check.
    ///
    /// Every manager present in `packages` is asked once, concurrently. A
    /// manager whose check fails leaves its records as they were. Names are
    /// matched case-insensitively.
    pub fn check_outdated(&self, packages: &mut [PackageRecord]) {
        let managers: Vec<ManagerId> = packages
            .iter()
            .map(|record| record.manager)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let latest: HashMap<ManagerId, HashMap<String, String>> = managers
            .par_iter()
            .filter_map(|id| Some((*id, self.latest_versions(*id)?)))
            .collect();

        for record in packages.iter_mut() {
            let newest = latest
                .get(&record.manager)
                .and_then(|versions| versions.get(&record.name.to_lowercase()));
            if let Some(newest) = newest {
                record.set_latest(Some(newest.as_str()));
            }
        }
    }

    /// Lower-cased package name to newest version, or `None` if the check
    /// could not run.
    fn latest_versions(&self, id: ManagerId) -> Option<HashMap<String, String>> {
        let handler = self.handler(id)?;
        if self.is_disabled(id) {
            return None;
        }

        let checked = panic::catch_unwind(AssertUnwindSafe(|| {
            if !handler.check_availability() {
                return Ok(HashMap::new());
            }
            handler.latest_versions()
        }));
        match checked {
            Ok(Ok(versions)) => {
                tracing::debug!("{} reported {} newer releases", id, versions.len());
                Some(
                    versions
                        .into_iter()
                        .map(|(name, version)| (name.to_lowercase(), version))
                        .collect(),
                )
            }
            Ok(Err(e)) => {
                tracing::warn!("Update check for {} failed: {}", id, e);
                None
            }
            Err(payload) => {
                tracing::warn!(
                    "Update check for {} panicked: {}",
                    id,
                    panic_message(payload.as_ref())
                );
                None
            }
        }
    }

    /// Remove a package; `false` on any failure.
    pub fn uninstall_package(&self, name: &str, id: ManagerId, options: &UninstallOptions) -> bool {
        let Some(handler) = self.handler(id) else {
            return false;
        };
        if self.is_disabled(id) {
            tracing::warn!("{} is disabled in configuration", id);
            return false;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.uninstall_package(name, options)
        }));
        match outcome {
            Ok(Ok(removed)) => {
                if removed {
                    tracing::info!("Removed {} via {}", name, id);
                }
                removed
            }
            Ok(Err(e)) => {
                tracing::warn!("Uninstalling {} via {} failed: {}", name, id, e);
                false
            }
            Err(payload) => {
                tracing::warn!(
                    "Uninstalling {} via {} panicked: {}",
                    name,
                    id,
                    panic_message(payload.as_ref())
                );
                false
            }
        }
    }

    /// Load the override file from its default location and install it.
    pub fn load_custom_config(&self) -> Option<CustomConfig> {
        let config = TieredPathSearch::load_custom_config()?;
        Some(self.install_custom_config(config))
    }

    /// Load the override file at `path` and install it.
    pub fn load_custom_config_from(&self, path: &Path) -> Option<CustomConfig> {
        let config = config::load_optional(path)?;
        Some(self.install_custom_config(config))
    }

    /// Install overrides for all later resolutions.
    ///
    /// Entries keyed by manager id are folded into the executable's key, and
    /// cached resolutions are dropped so the new paths take effect.
    pub fn install_custom_config(&self, config: CustomConfig) -> CustomConfig {
        let config = config.with_aliases(
            self.handlers
                .values()
                .map(|handler| (handler.id().as_str(), handler.executable())),
        );
        self.cache.clear();
        self.search.set_custom_config(Some(config.clone()));
        config
    }
}

impl Default for PackageDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn report(on_progress: &mut Option<ProgressFn<'_>>, id: ManagerId, text: &str) {
    if let Some(callback) = on_progress.as_deref_mut() {
        callback(id, text);
    }
}

/// `count` followed by `noun`, with an `s` unless the count is one.
pub fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn path_missing_message(display_name: &str, found_path: &str) -> String {
    match Path::new(found_path).parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => format!(
            "{} is installed at {} but is not on PATH. Add {} to your PATH.",
            display_name,
            found_path,
            dir.display()
        ),
        None => format!("{} is installed at {} but is not on PATH.", display_name, found_path),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Platform;
    use crate::error::{JanitorError, Result};
    use crate::managers::PackageLocation;
    use crate::shell::MockRunner;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    enum Outcome {
        Packages(Vec<&'static str>),
        Error,
        Panic,
    }

    /// Handler whose listing is scripted; resolves through the shared search.
    struct StubHandler {
        id: ManagerId,
        executable: &'static str,
        ctx: HandlerContext,
        outcome: Outcome,
    }

    impl ManagerHandler for StubHandler {
        fn id(&self) -> ManagerId {
            self.id
        }

        fn context(&self) -> &HandlerContext {
            &self.ctx
        }

        fn executable(&self) -> &'static str {
            self.executable
        }

        fn common_paths(&self) -> Vec<String> {
            Vec::new()
        }

        fn list_packages(&self) -> Result<Vec<PackageRecord>> {
            match &self.outcome {
                Outcome::Packages(names) => Ok(names
                    .iter()
                    .filter_map(|n| {
                        PackageRecord::new(n, "1.0.0", self.id, PackageLocation::PipSite)
                    })
                    .collect()),
                Outcome::Error => Err(JanitorError::CommandFailed {
                    command: format!("{} list", self.executable),
                    code: Some(1),
                }),
                Outcome::Panic => panic!("listing exploded"),
            }
        }

        fn uninstall_package(&self, _name: &str, _options: &UninstallOptions) -> Result<bool> {
            match self.outcome {
                Outcome::Panic => panic!("uninstall exploded"),
                Outcome::Error => Err(JanitorError::UnsupportedOperation {
                    manager: self.id.to_string(),
                    operation: "uninstall".into(),
                }),
                Outcome::Packages(_) => Ok(true),
            }
        }

        fn parse_output(&self, _raw: &str) -> Vec<PackageRecord> {
            Vec::new()
        }
    }

    fn stub_discovery(
        runner: Arc<MockRunner>,
        stubs: Vec<(ManagerId, &'static str, Outcome)>,
    ) -> PackageDiscovery {
        let mut discovery = PackageDiscovery::empty(runner, Environment::new(Platform::Linux));
        for (id, executable, outcome) in stubs {
            let ctx = discovery.context();
            discovery.register(Box::new(StubHandler {
                id,
                executable,
                ctx,
                outcome,
            }));
        }
        discovery
    }

    #[test]
    fn discovery_reports_every_registered_manager() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        let discovery = stub_discovery(
            runner,
            vec![
                (ManagerId::Pip, "pip", Outcome::Packages(vec!["requests"])),
                (ManagerId::Npm, "npm", Outcome::Packages(vec![])),
            ],
        );

        let statuses = discovery.discover_available_managers();

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].manager, ManagerId::Npm);
        assert_eq!(statuses[0].status, Availability::NotInstalled);
        assert_eq!(statuses[1].status, Availability::Available);
        assert_eq!(
            statuses[1].discovery_method,
            Some(DiscoveryMethod::DirectCommand)
        );
        assert!(statuses[1].in_path);
        assert_eq!(discovery.cache().get_availability("pip"), Some(true));
        assert_eq!(discovery.cache().get_availability("npm"), Some(false));
    }

    #[test]
    fn common_path_resolution_is_path_missing_with_message() {
        let temp = TempDir::new().unwrap();
        let brew = temp.path().join("brew");
        fs::write(&brew, "#!/bin/sh\n").unwrap();

        let runner = Arc::new(MockRunner::new());
        runner.succeed(&format!("{} --version", brew.display()), "Homebrew 4.2.0");
        let discovery = stub_discovery(
            runner,
            vec![(ManagerId::Homebrew, "brew", Outcome::Packages(vec![]))],
        );
        discovery.install_custom_config(CustomConfig {
            custom_paths: BTreeMap::from([(
                "homebrew".to_string(),
                vec![brew.display().to_string()],
            )]),
            ..Default::default()
        });

        let status = discovery.get_manager_status(ManagerId::Homebrew);

        assert_eq!(status.status, Availability::PathMissing);
        assert_eq!(status.discovery_method, Some(DiscoveryMethod::CustomPath));
        assert!(!status.in_path);
        let message = status.message.unwrap();
        assert!(message.contains("not on PATH"));
        assert!(message.contains(&temp.path().display().to_string()));
    }

    #[test]
    fn unregistered_manager_is_not_installed() {
        let discovery = stub_discovery(Arc::new(MockRunner::new()), vec![]);
        let status = discovery.get_manager_status(ManagerId::Conda);
        assert_eq!(status.status, Availability::NotInstalled);
        assert!(discovery.list_packages(ManagerId::Conda).is_empty());
        assert!(!discovery.uninstall_package("x", ManagerId::Conda, &UninstallOptions::default()));
    }

    #[test]
    fn failing_manager_does_not_abort_the_others() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        runner.succeed("npm --version", "10.2.4");
        runner.succeed("conda --version", "conda 23.7.4");
        let discovery = stub_discovery(
            runner,
            vec![
                (ManagerId::Pip, "pip", Outcome::Packages(vec!["requests", "rich"])),
                (ManagerId::Npm, "npm", Outcome::Error),
                (ManagerId::Conda, "conda", Outcome::Panic),
            ],
        );

        let packages = discovery.list_all_packages(None);

        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "rich"]);
        assert_eq!(discovery.discover_available_managers().len(), 3);
    }

    #[test]
    fn progress_is_reported_before_and_after_each_manager() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        runner.succeed("npm --version", "10.2.4");
        let discovery = stub_discovery(
            runner,
            vec![
                (ManagerId::Pip, "pip", Outcome::Packages(vec!["requests"])),
                (ManagerId::Npm, "npm", Outcome::Packages(vec!["yarn", "pnpm"])),
                (ManagerId::Conda, "conda", Outcome::Packages(vec!["numpy"])),
            ],
        );

        let events = Mutex::new(Vec::new());
        let mut record = |id: ManagerId, text: &str| {
            events.lock().unwrap().push((id, text.to_string()));
        };
        let packages = discovery.list_all_packages(Some(&mut record));

        assert_eq!(packages.len(), 3);
        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], (ManagerId::Npm, "Listing npm packages...".to_string()));
        assert_eq!(events[1], (ManagerId::Npm, "Found 2 npm packages".to_string()));
        assert_eq!(events[2].0, ManagerId::Pip);
        assert_eq!(events[3], (ManagerId::Pip, "Found 1 pip package".to_string()));
    }

    #[test]
    fn counts_use_singular_for_one() {
        assert_eq!(counted(0, "pip package"), "0 pip packages");
        assert_eq!(counted(1, "pip package"), "1 pip package");
        assert_eq!(counted(12, "manager"), "12 managers");
    }

    #[test]
    fn disabled_manager_is_skipped() {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("pip --version", "pip 23.3.1");
        let discovery = stub_discovery(
            runner.clone(),
            vec![(ManagerId::Pip, "pip", Outcome::Packages(vec!["requests"]))],
        );
        discovery.install_custom_config(CustomConfig {
            disabled: vec!["pip".into()],
            ..Default::default()
        });

        let status = discovery.get_manager_status(ManagerId::Pip);

        assert_eq!(status.status, Availability::NotInstalled);
        assert_eq!(status.message.as_deref(), Some("disabled in configuration"));
        assert!(discovery.list_all_packages(None).is_empty());
        assert_eq!(runner.call_count("pip --version"), 0);
    }

    #[test]
    fn uninstall_failures_are_false() {
        let discovery = stub_discovery(
            Arc::new(MockRunner::new()),
            vec![
                (ManagerId::Pip, "pip", Outcome::Packages(vec![])),
                (ManagerId::Npm, "npm", Outcome::Error),
                (ManagerId::Conda, "conda", Outcome::Panic),
            ],
        );
        let options = UninstallOptions::default();

        assert!(discovery.uninstall_package("x", ManagerId::Pip, &options));
        assert!(!discovery.uninstall_package("x", ManagerId::Npm, &options));
        assert!(!discovery.uninstall_package("x", ManagerId::Conda, &options));
    }

    #[test]
    fn installing_config_merges_manager_keys_and_clears_cache() {
        let discovery = stub_discovery(
            Arc::new(MockRunner::new()),
            vec![(ManagerId::Homebrew, "brew", Outcome::Packages(vec![]))],
        );
        discovery.cache().set_path("brew", None);

        let installed = discovery.install_custom_config(CustomConfig {
            custom_paths: BTreeMap::from([("homebrew".to_string(), vec!["/x/brew".to_string()])]),
            ..Default::default()
        });

        assert_eq!(installed.paths_for("brew"), ["/x/brew".to_string()]);
        assert_eq!(discovery.cache().size(), 0);
        assert!(discovery.search().custom_config().is_some());
    }

    #[test]
    fn load_custom_config_from_ignores_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("package-managers.json");
        fs::write(&path, "not json").unwrap();
        let discovery = stub_discovery(Arc::new(MockRunner::new()), vec![]);

        assert!(discovery.load_custom_config_from(&path).is_none());
        assert!(discovery.search().custom_config().is_none());
    }

    fn npm_and_pip_runner() -> Arc<MockRunner> {
        let runner = Arc::new(MockRunner::new());
        runner.succeed("npm --version", "10.2.4");
        runner.succeed(
            "npm list -g --depth=0 --json",
            r#"{"dependencies": {"typescript": {"version": "5.3.3"}, "yarn": {"version": "1.22.21"}}}"#,
        );
        runner.succeed("pip --version", "pip 23.3.1 from /usr/lib/python3/dist-packages/pip");
        runner.succeed(
            "pip list --format=json",
            r#"[{"name": "Requests", "version": "2.31.0"}, {"name": "rich", "version": "13.7.0"}]"#,
        );
        runner
    }

    #[test]
    fn outdated_check_marks_newer_releases() {
        let runner = npm_and_pip_runner();
        runner.fail_with_output(
            "npm outdated -g --json",
            1,
            r#"{"typescript": {"current": "5.3.3", "wanted": "5.4.2", "latest": "5.4.2"}}"#,
        );
        runner.succeed(
            "pip list --outdated --format=json",
            r#"[{"name": "requests", "version": "2.31.0", "latest_version": "2.32.3"}]"#,
        );
        let discovery = PackageDiscovery::with_runner(runner, Environment::new(Platform::Linux));

        let mut packages = discovery.list_all_packages(None);
        discovery.check_outdated(&mut packages);

        let find = |name: &str| packages.iter().find(|p| p.name == name).unwrap();
        assert!(find("typescript").outdated);
        assert_eq!(find("typescript").latest.as_deref(), Some("5.4.2"));
        assert!(find("Requests").outdated);
        assert_eq!(find("Requests").latest.as_deref(), Some("2.32.3"));
        assert!(!find("yarn").outdated);
        assert!(!find("rich").outdated);
    }

    #[test]
    fn failed_outdated_check_leaves_records_alone() {
        let runner = npm_and_pip_runner();
        runner.fail("pip list --outdated --format=json", 1);
        let discovery = PackageDiscovery::with_runner(runner.clone(), Environment::new(Platform::Linux));

        let mut packages = discovery.list_all_packages(None);
        let before = packages.clone();
        discovery.check_outdated(&mut packages);

        assert_eq!(packages, before);
        assert_eq!(runner.call_count("npm outdated -g --json"), 1);
        assert_eq!(runner.call_count("pip list --outdated --format=json"), 1);
    }

    #[test]
    fn status_carries_reported_version() {
        let runner = npm_and_pip_runner();
        let discovery = PackageDiscovery::with_runner(runner, Environment::new(Platform::Linux));

        assert_eq!(
            discovery.get_manager_status(ManagerId::Pip).version.as_deref(),
            Some("23.3.1")
        );
        assert_eq!(
            discovery.get_manager_status(ManagerId::Npm).version.as_deref(),
            Some("10.2.4")
        );
        assert_eq!(discovery.get_manager_status(ManagerId::Conda).version, None);
    }

    #[test]
    fn built_in_handlers_are_registered() {
        let discovery =
            PackageDiscovery::with_runner(Arc::new(MockRunner::new()), Environment::new(Platform::Linux));
        assert_eq!(discovery.manager_ids(), ManagerId::ALL.to_vec());
    }

    #[test]
    fn status_serializes_camel_case() {
        let status = ManagerStatus::not_installed(ManagerId::Pipx, None);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "not_installed");
        assert_eq!(json["inPath"], false);
        assert!(json.get("foundPath").is_none());
    }
}
