//! Custom configuration schema.
//!
//! The override file is JSON with camelCase keys:
//!
//! ```json
//! {
//!   "customPaths": { "brew": ["/opt/tools/brew/bin/brew"], "conda": ["~/mambaforge/bin/conda"] },
//!   "disabled": ["composer"],
//!   "timeout": 5000
//! }
//! ```
//!
//! Every field is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// User overrides for package-manager discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomConfig {
    /// Extra executable locations, keyed by executable name or manager id.
    pub custom_paths: BTreeMap<String, Vec<String>>,

    /// Manager ids to skip entirely.
    pub disabled: Vec<String>,

    /// Probe timeout in milliseconds.
    pub timeout: Option<u64>,
}

impl CustomConfig {
    /// Custom locations registered under `key`.
    pub fn paths_for(&self, key: &str) -> &[String] {
        self.custom_paths
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the manager with this id is disabled.
    pub fn is_disabled(&self, manager_id: &str) -> bool {
        self.disabled
            .iter()
            .any(|d| d.eq_ignore_ascii_case(manager_id))
    }

    /// Configured probe timeout; zero is treated as unset.
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.timeout
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Fold entries keyed by manager id into the executable's key.
    ///
    /// Tier 4 looks paths up by executable name, so `{"homebrew": [...]}`
    /// must become `{"brew": [...]}` before the config is installed.
    /// Executable-keyed entries keep precedence over id-keyed ones.
    pub fn with_aliases<'a>(mut self, aliases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        for (manager_id, executable) in aliases {
            if manager_id == executable {
                continue;
            }
            if let Some(paths) = self.custom_paths.remove(manager_id) {
                let entry = self.custom_paths.entry(executable.to_string()).or_default();
                for path in paths {
                    if !entry.contains(&path) {
                        entry.push(path);
                    }
                }
            }
        }
        self
    }
}
