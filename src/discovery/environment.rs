//! Environment provider for executable discovery.
//!
//! Discovery needs the PATH string, the home directory, the platform and a
//! handful of environment variables. Reading those from process globals makes
//! tests depend on the machine they run on, so the search is constructed with
//! an explicit [`Environment`] snapshot instead.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

/// `%NAME%` references in Windows-style paths.
static WINDOWS_VAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([^%]+)%").expect("WINDOWS_VAR_REGEX must compile"));

/// Operating system family, as far as discovery cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
}

impl Platform {
    /// Detect the current platform.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Separator between entries of the PATH variable.
    pub fn path_separator(&self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::MacOS | Platform::Linux => ':',
        }
    }

    /// Whether this is Windows.
    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

/// Snapshot of the process environment used by discovery.
#[derive(Debug, Clone)]
pub struct Environment {
    platform: Platform,
    path: String,
    home: Option<PathBuf>,
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment for `platform` (no PATH, no home, no vars).
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            path: String::new(),
            home: None,
            vars: HashMap::new(),
        }
    }

    /// Capture the real process environment.
    pub fn from_process() -> Self {
        // Non-UTF-8 variables can't name a path we would probe anyway.
        let vars: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        let mut env = Self::from_vars(Platform::current(), vars);
        env.home = dirs::home_dir();
        env
    }

    /// Build an environment from a variable map, taking PATH from it.
    ///
    /// Windows usually spells the variable `Path`, so the lookup ignores case
    /// there.
    pub fn from_vars(platform: Platform, vars: HashMap<String, String>) -> Self {
        let mut env = Self::new(platform);
        env.vars = vars;
        env.path = env.var("PATH").map(str::to_string).unwrap_or_default();
        env
    }

    /// Replace the PATH string.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Replace the home directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Set an environment variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// The platform this environment describes.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The raw PATH string.
    pub fn path_var(&self) -> &str {
        &self.path
    }

    /// The home directory, if known.
    pub fn home(&self) -> Option<&PathBuf> {
        self.home.as_ref()
    }

    /// Look up an environment variable. Names are case-insensitive on Windows.
    pub fn var(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.vars.get(key) {
            return Some(value.as_str());
        }
        if !self.platform.is_windows() {
            return None;
        }
        self.vars
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// PATH split on the platform separator, empty entries dropped.
    pub fn path_entries(&self) -> Vec<PathBuf> {
        self.path
            .split(self.platform.path_separator())
            .filter(|entry| !entry.trim().is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Expand a configured path into a concrete candidate.
    ///
    /// `~` is only honoured as a prefix. On Windows, `%NAME%` references are
    /// replaced by the variable's value; undefined references are left intact.
    pub fn expand_path(&self, raw: &str) -> PathBuf {
        let expanded = if self.platform.is_windows() {
            self.expand_windows_vars(raw)
        } else {
            raw.to_string()
        };

        if let Some(home) = &self.home {
            if expanded == "~" {
                return home.clone();
            }
            if let Some(rest) = expanded
                .strip_prefix("~/")
                .or_else(|| expanded.strip_prefix("~\\"))
            {
                return home.join(rest);
            }
        }

        PathBuf::from(expanded)
    }

    fn expand_windows_vars(&self, raw: &str) -> String {
        WINDOWS_VAR_REGEX
            .replace_all(raw, |caps: &regex::Captures| {
                // Windows variable names are case-insensitive.
                self.var(&caps[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
