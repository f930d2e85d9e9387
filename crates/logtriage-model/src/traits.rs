use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while asking a backend for a completion
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Reasoning backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend configuration error: {0}")]
    Config(String),
}

/// Text-in, text-out completion capability.
///
/// Implementations do not retry; a failed call is reported once to the caller.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Human-readable backend name (e.g., "openai:gpt-4o")
    fn name(&self) -> &str;

    /// Send one prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    /// Check if the backend can currently be reached
    async fn is_available(&self) -> bool;
}

/// Backend selection for one configured model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Hosted chat-completions API
    #[serde(rename = "openai")]
    OpenAi(OpenAiConfig),
    /// Locally installed inference binary
    Local(LocalModelConfig),
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::OpenAi(_) => "openai",
            BackendConfig::Local(_) => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// Model identifier sent with each request
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Optional request timeout (None = wait indefinitely)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl OpenAiConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalModelConfig {
    /// Inference binary (looked up on PATH when relative)
    #[serde(default = "default_local_binary")]
    pub binary: PathBuf,
    /// Model weights file handed to the binary
    #[serde(default)]
    pub model_path: PathBuf,
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    /// Argument template; `{model_path}`, `{context_window}` and `{prompt}` are substituted
    #[serde(default = "default_local_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LocalModelConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: default_local_binary(),
            model_path: model_path.into(),
            context_window: default_context_window(),
            args: default_local_args(),
            timeout_secs: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_local_binary() -> PathBuf {
    PathBuf::from("llama-cli")
}

fn default_context_window() -> u32 {
    1024
}

fn default_local_args() -> Vec<String> {
    [
        "-m",
        "{model_path}",
        "-c",
        "{context_window}",
        "--no-display-prompt",
        "-p",
        "{prompt}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_backend_defaults() {
        let cfg: BackendConfig =
            serde_json::from_str(r#"{"backend":"openai","model":"gpt-4o"}"#).unwrap();
        match cfg {
            BackendConfig::OpenAi(c) => {
                assert_eq!(c.model, "gpt-4o");
                assert_eq!(c.api_key_env, "OPENAI_API_KEY");
                assert_eq!(c.timeout_secs, None);
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn test_local_backend_defaults() {
        let cfg: BackendConfig =
            serde_json::from_str(r#"{"backend":"local","model_path":"/models/m.gguf"}"#).unwrap();
        assert_eq!(cfg.kind(), "local");
        if let BackendConfig::Local(c) = cfg {
            assert_eq!(c.binary, PathBuf::from("llama-cli"));
            assert_eq!(c.context_window, 1024);
            assert!(c.args.contains(&"{prompt}".to_string()));
        }
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<BackendConfig, _> =
            serde_json::from_str(r#"{"backend":"carrier-pigeon"}"#);
        assert!(result.is_err());
    }
}
