//! Generator configuration and config-file loading.
//!
//! A config file is optional. When present it is JSON or YAML, chosen by
//! extension, and every field may be omitted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::loader::DEFAULT_SKIP_DIRS;

/// File names looked for in the scan root, in order.
pub const CONFIG_FILE_NAMES: &[&str] =
    &[".go-test-generator.json", ".go-test-generator.yaml", ".go-test-generator.yml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unsupported config file format (expected .json, .yaml or .yml): {0}")]
    UnsupportedFormat(PathBuf),
}

/// Everything a generation run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory to scan.
    pub root: PathBuf,
    /// Run interface-dependency analysis and mock bookkeeping.
    pub enable_go_mock: bool,
    /// Module qualifier: only call targets in packages whose identity
    /// contains it are considered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Also consider targets without a package (predeclared `error`) when no
    /// module qualifier is set.
    pub include_universe_targets: bool,
    /// Directory names never scanned.
    pub skip_dirs: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            enable_go_mock: false,
            module: None,
            include_universe_targets: false,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), ..Self::default() }
    }

    pub fn with_go_mock(mut self, enable: bool) -> Self {
        self.enable_go_mock = enable;
        self
    }
}

/// Parse a JSON or YAML config file.
pub fn load_config_file(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let format = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let text = || {
        fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })
    };

    match format.as_deref() {
        Some("json") => serde_json::from_str(&text()?)
            .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source }),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text()?)
            .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source }),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// The first well-known config file present in `root`.
pub fn discover_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES.iter().map(|name| root.join(name)).find(|path| path.is_file())
}
