//! Tiered executable search.
//!
//! Package managers are frequently installed but invisible to a
//! non-interactive process: Homebrew under `/opt/homebrew`, pipx under
//! `~/.local/bin`, Conda under `~/miniconda3`. The search tries four
//! strategies in a fixed order and stops at the first one that yields a
//! working binary:
//!
//! 1. **Direct command**: `<name> --version` as-is.
//! 2. **PATH scan**: look for `<name>` in each PATH directory, then verify.
//! 3. **Common paths**: the handler's well-known install locations.
//! 4. **Custom paths**: user overrides from [`CustomConfig`].
//!
//! Every outcome, including "not found anywhere", is written to the shared
//! [`PathCache`] so later lookups skip the probes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dev_janitor::discovery::{DiscoveryMethod, Environment, PathCache, Platform, TieredPathSearch};
//! use dev_janitor::shell::MockRunner;
//!
//! let runner = Arc::new(MockRunner::new());
//! runner.succeed("pyenv --version", "pyenv 2.3.36\n");
//!
//! let search = TieredPathSearch::new(
//!     Arc::new(PathCache::new()),
//!     runner,
//!     Environment::new(Platform::Linux),
//! );
//! let found = search.find_executable("pyenv", &[]).unwrap();
//! assert_eq!(found.method(), DiscoveryMethod::DirectCommand);
//! assert!(found.in_path());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::time::Duration;

use crate::config::CustomConfig;
use crate::shell::CommandRunner;

use super::cache::PathCache;
use super::environment::Environment;

/// Bound on a single `--version` probe unless the config overrides it.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:\.\d+)+(?:[-+][0-9A-Za-z.]+)*").expect("VERSION_REGEX must compile")
});

/// First dotted version number in `--version` output.
///
/// `pip 23.3.1 from /usr/lib/...` gives `23.3.1`, `Poetry (version 1.7.1)`
/// gives `1.7.1`.
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| VERSION_REGEX.find(line))
        .map(|m| m.as_str().to_string())
}

/// Which tier resolved an executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    DirectCommand,
    PathScan,
    CommonPath,
    CustomPath,
}

impl DiscoveryMethod {
    /// Whether executables found this way are reachable through PATH.
    pub fn in_path(&self) -> bool {
        matches!(self, Self::DirectCommand | Self::PathScan)
    }

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectCommand => "direct_command",
            Self::PathScan => "path_scan",
            Self::CommonPath => "common_path",
            Self::CustomPath => "custom_path",
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableSearchResult {
    path: String,
    method: DiscoveryMethod,
    in_path: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

impl ExecutableSearchResult {
    /// Build a result; `in_path` follows from the method.
    pub fn new(path: impl Into<String>, method: DiscoveryMethod) -> Self {
        Self {
            path: path.into(),
            method,
            in_path: method.in_path(),
            version: None,
        }
    }

    /// Attach the version the binary reported.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Path (or bare command name for direct commands) to invoke.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The tier that found it.
    pub fn method(&self) -> DiscoveryMethod {
        self.method
    }

    /// Whether it is reachable without a qualified path.
    pub fn in_path(&self) -> bool {
        self.in_path
    }

    /// Version parsed from the `--version` output that verified it.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Four-tier executable resolver backed by the shared [`PathCache`].
pub struct TieredPathSearch {
    cache: Arc<PathCache>,
    runner: Arc<dyn CommandRunner>,
    env: Environment,
    config: RwLock<Option<CustomConfig>>,
}

impl TieredPathSearch {
    /// Create a search over `env`, probing through `runner`.
    pub fn new(cache: Arc<PathCache>, runner: Arc<dyn CommandRunner>, env: Environment) -> Self {
        Self {
            cache,
            runner,
            env,
            config: RwLock::new(None),
        }
    }

    /// The environment snapshot this search resolves against.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The shared cache.
    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    /// The runner used for probes.
    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    /// Install (or remove) user overrides for subsequent resolutions.
    pub fn set_custom_config(&self, config: Option<CustomConfig>) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// The currently installed overrides.
    pub fn custom_config(&self) -> Option<CustomConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Timeout for a single `--version` probe.
    pub fn probe_timeout(&self) -> Duration {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(CustomConfig::probe_timeout)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }

    /// Read the override file from its default location.
    ///
    /// A missing or malformed file yields `None`.
    pub fn load_custom_config() -> Option<CustomConfig> {
        CustomConfig::load()
    }

    /// Resolve `executable`, trying each tier in order.
    ///
    /// Never fails: every probe error falls through to the next tier, and
    /// exhausting all tiers yields `None` (which is cached).
    pub fn find_executable(
        &self,
        executable: &str,
        common_paths: &[String],
    ) -> Option<ExecutableSearchResult> {
        if let Some(cached) = self.cache.get_path(executable) {
            tracing::debug!("Path cache hit for '{}': {:?}", executable, cached);
            return cached.map(|path| {
                let method = self
                    .cache
                    .get_method(executable)
                    .unwrap_or(DiscoveryMethod::DirectCommand);
                ExecutableSearchResult::new(path, method)
                    .with_version(self.cache.get_version(executable))
            });
        }

        let found = self
            .try_direct_command(executable)
            .or_else(|| self.try_path_scan(executable))
            .or_else(|| self.try_candidates(common_paths, DiscoveryMethod::CommonPath))
            .or_else(|| {
                let custom = self
                    .custom_config()
                    .map(|config| config.paths_for(executable).to_vec())
                    .unwrap_or_default();
                self.try_candidates(&custom, DiscoveryMethod::CustomPath)
            });

        match &found {
            Some(result) => {
                tracing::debug!(
                    "Resolved '{}' to {} via {}",
                    executable,
                    result.path(),
                    result.method()
                );
                self.cache
                    .set_path(executable, Some(result.path().to_string()));
                self.cache.set_method(executable, result.method());
                if let Some(version) = result.version() {
                    self.cache.set_version(executable, version);
                }
            }
            None => {
                tracing::debug!("'{}' not found by any tier", executable);
                self.cache.set_path(executable, None);
            }
        }

        found
    }

    fn try_direct_command(&self, executable: &str) -> Option<ExecutableSearchResult> {
        let version = self.probe(executable)?;
        Some(
            ExecutableSearchResult::new(executable, DiscoveryMethod::DirectCommand)
                .with_version(version),
        )
    }

    fn try_path_scan(&self, executable: &str) -> Option<ExecutableSearchResult> {
        let mut names = vec![executable.to_string()];
        if self.env.platform().is_windows() && !executable.to_lowercase().ends_with(".exe") {
            names.push(format!("{}.exe", executable));
        }

        for dir in self.env.path_entries() {
            for name in &names {
                let candidate = dir.join(name);
                if !candidate.is_file() {
                    continue;
                }
                if let Some(version) = self.verify(&candidate) {
                    return Some(
                        ExecutableSearchResult::new(
                            candidate.to_string_lossy(),
                            DiscoveryMethod::PathScan,
                        )
                        .with_version(version),
                    );
                }
            }
        }
        None
    }

    fn try_candidates(
        &self,
        candidates: &[String],
        method: DiscoveryMethod,
    ) -> Option<ExecutableSearchResult> {
        candidates
            .iter()
            .map(|raw| self.env.expand_path(raw))
            .filter(|candidate| candidate.is_file())
            .find_map(|candidate: PathBuf| {
                let version = self.verify(&candidate)?;
                Some(
                    ExecutableSearchResult::new(candidate.to_string_lossy(), method)
                        .with_version(version),
                )
            })
    }

    fn verify(&self, candidate: &Path) -> Option<Option<String>> {
        self.probe(&candidate.to_string_lossy())
    }

    /// `Some(version)` when `program --version` succeeds.
    ///
    /// Some tools print their version on stderr, so both streams are read.
    fn probe(&self, program: &str) -> Option<Option<String>> {
        match self
            .runner
            .run(program, &["--version"], self.probe_timeout())
        {
            Ok(result) if result.success => {
                Some(parse_version(&result.stdout).or_else(|| parse_version(&result.stderr)))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Probe of '{}' failed: {}", program, e);
                None
            }
        }
    }
}
