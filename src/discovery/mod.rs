//! Executable discovery.
//!
//! This module finds package-manager binaries that may not be on PATH.
//!
//! # Modules
//!
//! - [`environment`] - Explicit PATH/home/platform snapshot
//! - [`cache`] - Session cache of resolved locations
//! - [`search`] - Four-tier executable search

pub mod cache;
pub mod environment;
pub mod search;

pub use cache::PathCache;
pub use environment::{Environment, Platform};
pub use search::{
    parse_version, DiscoveryMethod, ExecutableSearchResult, TieredPathSearch,
    DEFAULT_PROBE_TIMEOUT,
};
