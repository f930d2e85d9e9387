mod chat;
mod models;
mod stats;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use logtriage_logging::Logger;
use logtriage_model::ModelRegistry;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;

/// Per-request pipeline settings, fixed at startup
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub base_prompt: String,
    pub top_n: usize,
    pub bucket_interval: Duration,
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_prompt: config.base_prompt.clone(),
            top_n: config.top_n,
            bucket_interval: config.bucket_interval(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registry: ModelRegistry,
    pub settings: Arc<PipelineSettings>,
    pub logger: Arc<Logger>,
}

pub fn create_router(
    registry: ModelRegistry,
    settings: PipelineSettings,
    logger: Arc<Logger>,
) -> Router {
    let state = AppState {
        registry,
        settings: Arc::new(settings),
        logger,
    };

    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/stats", post(stats::compute))
        .route("/api/models", get(models::list_models))
        .route("/api/health", get(models::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use logtriage_logging::LogFormat;
    use logtriage_model::{ModelError, ReasoningClient};
    use serde_json::{json, Value};

    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String, ModelError>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String, ModelError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl ReasoningClient for ScriptedClient {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    async fn serve(responses: Vec<Result<String, ModelError>>) -> String {
        let mut registry = ModelRegistry::new();
        registry.insert("scripted", ScriptedClient::new(responses));
        let router = create_router(
            registry,
            PipelineSettings::from(&AppConfig::default()),
            Arc::new(Logger::new(LogFormat::Compact)),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn chat_body(message: &str, selector: &str) -> Value {
        json!({
            "message": message,
            "knownIssues": {},
            "logs": [
                {"timestamp": "2025-02-21T18:19:57.000Z", "level": "Info", "messages": ["::[UTIL] ready"]},
                {"timestamp": "2025-02-21T18:19:58.000Z", "level": "Error", "messages": ["::[UTIL] failed"]}
            ],
            "modelSelector": selector
        })
    }

    /// Collect the `data:` payloads of an SSE body, skipping keep-alive comments
    fn data_frames(body: &str) -> Vec<String> {
        body.lines()
            .filter_map(|line| line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")))
            .map(|data| data.trim().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_chat_streams_actions_then_done() {
        let base = serve(vec![
            Ok("yes: give context".into()),
            Ok("Quiet logs with one error.".into()),
            Ok("no: no problems asked".into()),
            Ok("no: nothing to filter".into()),
        ])
        .await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .json(&chat_body("summarize", "scripted"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let frames = data_frames(&response.text().await.unwrap());
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[4], "[DONE]");

        let types: Vec<String> = frames[..4]
            .iter()
            .map(|f| serde_json::from_str::<Value>(f).unwrap()["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            types,
            vec!["summary_decision", "generate_summary", "issue_decision", "filter_decision"]
        );

        let summary: Value = serde_json::from_str(&frames[1]).unwrap();
        assert_eq!(summary["body"]["summary"], "Quiet logs with one error.");
        assert_eq!(summary["body"]["stats"]["Error"], 1);
        assert_eq!(summary["body"]["stats"]["Most Common Keywords"][0], "::[UTIL]");
    }

    #[tokio::test]
    async fn test_chat_backend_error_ends_without_done() {
        let base = serve(vec![Err(ModelError::InferenceFailed("quota exceeded".into()))]).await;

        let body = reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .json(&chat_body("summarize", "scripted"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        let frames = data_frames(&body);
        assert_eq!(frames.len(), 1);
        let error: Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(error["type"], "error");
        assert!(error["body"]["message"].as_str().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_chat_input_errors_are_bad_request() {
        let base = serve(vec![]).await;
        let client = reqwest::Client::new();

        let cases = [
            (chat_body("", "scripted"), "No message provided"),
            (chat_body("q", "gpt-9"), "Unknown model selector: gpt-9"),
            (
                json!({"message": "q", "logs": [], "modelSelector": "scripted"}),
                "No logs provided",
            ),
            (
                json!({"message": "q", "modelSelector": "scripted",
                       "logs": [{"timestamp": "yesterday", "level": "Info", "messages": []}]}),
                "Malformed log data",
            ),
        ];

        for (body, expected) in cases {
            let response = client
                .post(format!("{}/api/chat", base))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 400);
            let text = response.text().await.unwrap();
            assert!(text.contains(expected), "{} does not contain {}", text, expected);
        }
    }

    #[tokio::test]
    async fn test_chat_unknown_level_is_bad_request() {
        let base = serve(vec![]).await;
        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", base))
            .json(&json!({"message": "q", "modelSelector": "scripted",
                          "logs": [{"timestamp": "2025-02-21T18:19:57Z", "level": "Trace"}]}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let base = serve(vec![]).await;
        let response: Value = reqwest::Client::new()
            .post(format!("{}/api/stats", base))
            .json(&json!({
                "logs": [
                    {"timestamp": "2025-02-21T18:19:57.000Z", "level": "Info", "messages": ["a b"]},
                    {"timestamp": "2025-02-21T18:19:57.500Z", "level": "Warn", "messages": ["a"]},
                    {"timestamp": "2025-02-21T18:19:59.000Z", "level": "Info", "messages": ["c"]}
                ],
                "intervalSecs": 2
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(response["stats"]["overall_total"], 3);
        assert_eq!(response["stats"]["count_intervals"], 2);
        assert_eq!(response["simple"]["Info"], 2);
        assert_eq!(response["simple"]["Most Common Keywords"][0], "a");
    }

    #[tokio::test]
    async fn test_models_and_health() {
        let base = serve(vec![]).await;
        let client = reqwest::Client::new();

        let models: Value = client
            .get(format!("{}/api/models", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            models,
            json!({"models": [{"selector": "scripted", "backend": "scripted"}]})
        );

        let health: Value = client
            .get(format!("{}/api/health", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
    }
}
