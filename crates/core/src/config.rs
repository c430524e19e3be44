//! Project configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum_macros::{Display, EnumString};

/// Logger verbosity requested by the embedding host.
///
/// The logging backend itself is process-global `tracing`; this only
/// selects the level a host should install its subscriber at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

/// Configuration for a project analysis run.
///
/// Use [`ProjectConfig::builder`] or rely on [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
#[serde(default)]
pub struct ProjectConfig {
    /// Descend into `<…>` system includes.
    #[builder(default = "false")]
    pub parse_headers: bool,

    /// Chase local includes/imports at all.
    #[builder(default = "true")]
    pub follow_includes: bool,

    /// When false, imports of modules outside the project are silently
    /// accepted; when true they count as unresolved.
    #[builder(default = "false")]
    pub resolve_external_symbols: bool,

    /// Hard cap on project files; 0 means unlimited.
    #[builder(default = "0")]
    pub max_files: usize,

    /// Bound on recursion through include/import chains.
    #[builder(default = "DEFAULT_MAX_INCLUDE_DEPTH")]
    pub max_include_depth: usize,

    /// Roots that `<…>` includes are joined against.
    #[builder(default = "default_system_include_roots()")]
    pub system_include_roots: Vec<PathBuf>,

    #[builder(default)]
    pub log_level: LogLevel,
}

const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

fn default_system_include_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/usr/include")]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            parse_headers: false,
            follow_includes: true,
            resolve_external_symbols: false,
            max_files: 0,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            system_include_roots: default_system_include_roots(),
            log_level: LogLevel::default(),
        }
    }
}

impl ProjectConfig {
    pub fn builder() -> ProjectConfigBuilder {
        ProjectConfigBuilder::default()
    }
}
