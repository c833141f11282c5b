//! User configuration for package-manager discovery.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use dev_janitor::config::CustomConfig;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("package-managers.json");
//! fs::write(&path, r#"{"customPaths": {"conda": ["~/mambaforge/bin/conda"]}}"#).unwrap();
//!
//! let config = CustomConfig::load_from(&path).unwrap();
//! assert_eq!(config.paths_for("conda").len(), 1);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config_file, load_optional, parse_config};
pub use schema::CustomConfig;
