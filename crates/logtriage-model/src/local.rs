use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{LocalModelConfig, ModelError, ProcessSpawner, ReasoningClient};

/// Reasoning client backed by a locally installed inference binary
pub struct LocalModelClient {
    config: LocalModelConfig,
    name: String,
}

impl LocalModelClient {
    pub fn new(config: LocalModelConfig) -> Self {
        let name = format!("local:{}", config.model_path.display());
        Self { config, name }
    }

    /// Expand the argument template for one prompt
    fn build_args(&self, prompt: &str) -> Vec<String> {
        let model_path = self.config.model_path.display().to_string();
        let context_window = self.config.context_window.to_string();
        self.config
            .args
            .iter()
            .map(|arg| {
                // The prompt is substituted last so its text is never re-expanded
                arg.replace("{model_path}", &model_path)
                    .replace("{context_window}", &context_window)
                    .replace("{prompt}", prompt)
            })
            .collect()
    }
}

#[async_trait]
impl ReasoningClient for LocalModelClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        debug!(
            backend = self.name(),
            prompt_len = prompt.len(),
            "Running local inference"
        );

        let args = self.build_args(prompt);
        let timeout = self.config.timeout_secs.map(Duration::from_secs);
        let output = ProcessSpawner::spawn(&self.config.binary, &args, timeout).await?;

        if !output.success() {
            warn!(
                exit_code = output.exit_code,
                stderr = output.stderr_tail(),
                "Local inference exited with failure"
            );
            return Err(ModelError::InferenceFailed(format!(
                "{} exited with code {}: {}",
                self.config.binary.display(),
                output.exit_code,
                output.stderr_tail()
            )));
        }

        Ok(output.stdout.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_substitutes_placeholders() {
        let client = LocalModelClient::new(LocalModelConfig::new("/models/small.gguf"));
        let args = client.build_args("Should a summary be generated?");
        assert_eq!(
            args,
            vec![
                "-m",
                "/models/small.gguf",
                "-c",
                "1024",
                "--no-display-prompt",
                "-p",
                "Should a summary be generated?",
            ]
        );
    }

    #[test]
    fn test_prompt_text_is_not_reexpanded() {
        let client = LocalModelClient::new(
            LocalModelConfig::new("/m.gguf").with_args(vec!["{prompt}".to_string()]),
        );
        let args = client.build_args("literal {model_path}");
        assert_eq!(args, vec!["literal {model_path}"]);
    }

    #[test]
    fn test_name_includes_model_path() {
        let client = LocalModelClient::new(LocalModelConfig::new("/m.gguf"));
        assert_eq!(client.name(), "local:/m.gguf");
    }
}
