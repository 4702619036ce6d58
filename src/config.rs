//! Workspace configuration read from `config.json`.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::registry::DEFAULT_API_URL;
use crate::runtime::Runtime;

/// Configuration file at the workspace root.
pub const CONFIG_FILE: &str = "config.json";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prepended to release archive names: `<prefix>-<name>.zip`
    pub prefix: String,
    /// Directory receiving release archives
    pub release_dir: PathBuf,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Config {
    /// Read `config.json` from `root`. A relative `release_dir` is resolved
    /// against `root`.
    #[tracing::instrument(level = "debug", skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !runtime.exists(&path) {
            bail!("Configuration file {:?} not found", path);
        }

        let content = runtime.read_to_string(&path)?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration {:?}", path))?;

        if config.release_dir.is_relative() {
            config.release_dir = root.join(&config.release_dir);
        }
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Override the registry API URL, e.g. from the command line.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
