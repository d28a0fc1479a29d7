//! Layered configuration
//!
//! Values are merged from, lowest to highest precedence: built-in defaults,
//! the user config (`<config dir>/tender/config.yaml`), the project config
//! (`.tender/config.yaml`) and `TENDER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::core::project::Project;

pub const DEFAULT_MAX_QUOTATIONS: u32 = 3;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Acting user recorded as creator of requirements and quotations
    pub author: Option<String>,

    /// Maximum quotations accepted per requirement
    pub max_quotations: u32,

    /// Company name printed on purchase orders
    pub company: Option<String>,

    /// City printed on purchase orders
    pub city: Option<String>,

    /// How long a write waits for the database lock
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            author: None,
            max_quotations: DEFAULT_MAX_QUOTATIONS,
            company: None,
            city: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// One config source; absent keys leave lower layers untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigLayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_quotations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
}

impl ConfigLayer {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read `TENDER_AUTHOR` and `TENDER_MAX_QUOTATIONS`
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the environment layer from a variable lookup
    ///
    /// Each key is read on its own: an invalid value is reported and skipped
    /// without dropping the other keys.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let mut errors = Vec::new();

        let author = var("TENDER_AUTHOR").filter(|a| !a.trim().is_empty());

        let max_quotations = var("TENDER_MAX_QUOTATIONS").and_then(|raw| {
            let parsed = raw.trim().parse::<u32>();
            match parsed {
                Ok(max) => Some(max),
                Err(_) => {
                    errors.push(ConfigError::InvalidValue {
                        key: "TENDER_MAX_QUOTATIONS",
                        value: raw,
                    });
                    None
                }
            }
        });

        let layer = Self {
            author,
            max_quotations,
            ..Self::default()
        };
        (layer, errors)
    }
}

impl Config {
    /// Load configuration for the project containing the current directory
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load configuration, logging and skipping any malformed layer
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        let mut files = Vec::new();
        if let Some(path) = Self::user_config_path() {
            files.push(path);
        }
        if let Some(project) = project {
            files.push(project.config_path());
        }

        for path in files.iter().filter(|p| p.exists()) {
            match ConfigLayer::from_file(path) {
                Ok(layer) => config.merge(layer),
                Err(e) => warn!("ignoring config layer: {}", e),
            }
        }

        let (env_layer, errors) = ConfigLayer::from_env();
        for e in errors {
            warn!("ignoring environment override: {}", e);
        }
        config.merge(env_layer);

        config
    }

    /// Apply a layer on top of the current values
    pub fn merge(&mut self, layer: ConfigLayer) {
        if let Some(author) = layer.author {
            self.author = Some(author);
        }
        if let Some(max) = layer.max_quotations {
            self.max_quotations = max;
        }
        if let Some(company) = layer.company {
            self.company = Some(company);
        }
        if let Some(city) = layer.city {
            self.city = Some(city);
        }
        if let Some(timeout) = layer.busy_timeout_ms {
            self.busy_timeout_ms = timeout;
        }
    }

    /// Get the author name, falling back to the login user
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tender")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }
}
