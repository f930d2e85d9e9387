//! Configuration file support for logtriage.
//!
//! Loads `logtriage.toml` from the working directory, an explicit path, or
//! the user config directory, in that order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use logtriage_agent::DEFAULT_BASE_PROMPT;
use logtriage_model::{BackendConfig, ModelRegistry};
use logtriage_stats::DEFAULT_TOP_N;
use serde::Deserialize;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "logtriage.toml";

/// Application configuration loaded from `logtriage.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Instruction preamble prepended to every prompt
    #[serde(default = "default_base_prompt")]
    pub base_prompt: String,
    /// Evidence rows kept per keyword
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_bucket_interval_secs")]
    pub bucket_interval_secs: u64,
    /// Selector used by `triage` when `--model` is not given
    #[serde(default)]
    pub default_model: Option<String>,
    /// Append pipeline events to this JSONL file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    /// Selectable reasoning backends, keyed by model selector
    #[serde(default)]
    pub models: BTreeMap<String, BackendConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_prompt: default_base_prompt(),
            top_n: default_top_n(),
            bucket_interval_secs: default_bucket_interval_secs(),
            default_model: None,
            log_file: None,
            server: ServerConfig::default(),
            models: BTreeMap::new(),
        }
    }
}

fn default_base_prompt() -> String {
    DEFAULT_BASE_PROMPT.to_string()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_bucket_interval_secs() -> u64 {
    1
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `logtriage.toml` in
    /// `working_dir` is tried, then `<config_dir>/logtriage/logtriage.toml`,
    /// then built-in defaults. A file that exists but fails to parse is a
    /// hard error.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_file(path)?, Some(path.to_path_buf())));
        }

        let candidates = std::iter::once(working_dir.join(CONFIG_FILE_NAME)).chain(
            dirs::config_dir().map(|dir| dir.join("logtriage").join(CONFIG_FILE_NAME)),
        );
        for path in candidates {
            if path.exists() {
                return Ok((Self::load_file(&path)?, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.bucket_interval_secs == 0 {
            bail!("bucket_interval_secs must be at least 1");
        }
        if let Some(ref selector) = self.default_model {
            if !self.models.contains_key(selector) {
                bail!("default_model '{}' is not listed under [models]", selector);
            }
        }
        Ok(())
    }

    pub fn bucket_interval(&self) -> Duration {
        Duration::from_secs(self.bucket_interval_secs)
    }

    /// Pick the model selector for a one-off run.
    ///
    /// Priority: explicit flag > `default_model` > the only configured model.
    pub fn select_model(&self, flag: Option<&str>) -> Result<String> {
        if let Some(selector) = flag.or(self.default_model.as_deref()) {
            return Ok(selector.to_string());
        }
        match self.models.keys().next() {
            Some(only) if self.models.len() == 1 => Ok(only.clone()),
            Some(_) => bail!(
                "Several models are configured; choose one with --model ({})",
                self.models.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
            None => bail!("No models configured. Add a [models.<name>] table to {}", CONFIG_FILE_NAME),
        }
    }

    /// Build clients for every configured model
    pub fn build_registry(&self) -> Result<ModelRegistry> {
        ModelRegistry::from_config(&self.models).context("Failed to set up reasoning backends")
    }

    /// Build a registry holding only `selector`
    pub fn build_registry_for(&self, selector: &str) -> Result<ModelRegistry> {
        let backend = self
            .models
            .get_key_value(selector)
            .with_context(|| format!("Unknown model selector: {}", selector))?;
        ModelRegistry::from_config([backend])
            .with_context(|| format!("Failed to set up model '{}'", selector))
    }
}
