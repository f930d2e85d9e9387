use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::{ModelError, OpenAiConfig, ReasoningClient};

/// Reasoning client for a hosted chat-completions API
pub struct OpenAiClient {
    config: OpenAiConfig,
    api_key: String,
    client: reqwest::Client,
    name: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client, reading the API key from the configured environment variable
    pub fn new(config: OpenAiConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ModelError::Config(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: OpenAiConfig, api_key: String) -> Result<Self, ModelError> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(10);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ModelError::Config(e.to_string()))?;
        let name = format!("openai:{}", config.model);

        Ok(Self {
            config,
            api_key,
            client,
            name,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(Duration::from_secs(self.config.timeout_secs.unwrap_or(0)))
        } else if e.is_connect() || e.is_request() {
            ModelError::BackendUnavailable(e.to_string())
        } else {
            ModelError::InferenceFailed(e.to_string())
        }
    }
}

#[async_trait]
impl ReasoningClient for OpenAiClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, backend = self.name(), "Health check failed");
                false
            }
        }
    }

    #[instrument(skip(self, prompt), fields(backend = %self.name, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "system",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Completion request failed");
            return Err(match status.as_u16() {
                502..=504 => ModelError::BackendUnavailable(format!("Status {}: {}", status, body)),
                _ => ModelError::InferenceFailed(format!("Status {}: {}", status, body)),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InferenceFailed(format!("Undecodable response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InferenceFailed("Response had no choices".into()))?;

        let content = choice.message.content.unwrap_or_default();
        debug!(response_len = content.len(), "Completion received");
        Ok(content)
    }
}
