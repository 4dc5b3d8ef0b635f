//! TOML configuration for the planning service, the health probe, and logging.
//!
//! Every key is optional. A missing file section falls back to its defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gridnav_rt::solver::SolverConfig;
use serde::Deserialize;

use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "gridnav.toml";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GridnavConfig {
    #[serde(default)]
    pub solver: SolverSection,
    #[serde(default)]
    pub health: HealthSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Planning service connection
#[derive(Clone, Debug, Deserialize)]
pub struct SolverSection {
    /// Base URL; `/path` and `/status` are appended (default: http://127.0.0.1:5001)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds (default: 2000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Forwarded verbatim as the request's `retrying` flag
    #[serde(default)]
    pub retrying: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HealthSection {
    /// Seconds a settled probe result stays visible (default: 10)
    #[serde(default = "default_clear_after_secs")]
    pub clear_after_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggingSection {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_clear_after_secs() -> u64 {
    10
}

fn default_filter() -> String {
    "gridnav_app=info,gridnav_rt=info".to_string()
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            retrying: false,
        }
    }
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            clear_after_secs: default_clear_after_secs(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl SolverSection {
    pub fn to_solver_config(&self) -> SolverConfig {
        SolverConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            retrying: self.retrying,
        }
    }
}

impl HealthSection {
    pub fn clear_after(&self) -> Duration {
        Duration::from_secs(self.clear_after_secs)
    }
}

impl GridnavConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// An explicit path always wins, even when it does not exist.
pub fn locate(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let fallback = working_dir.join(DEFAULT_CONFIG_FILE);
    fallback.is_file().then_some(fallback)
}
