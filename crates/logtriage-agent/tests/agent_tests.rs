use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use logtriage_agent::{AgentError, DecisionAgent, DetectedIssues, IssueAssessment};
use logtriage_model::{ModelError, ReasoningClient};
use logtriage_stats::{KnownIssue, Level, LogRecord, OrderedMap, Stats};
use serde_json::json;

/// Reasoning client that replays canned responses and records every prompt
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn replying(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
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

fn sample_logs() -> Vec<LogRecord> {
    vec![
        LogRecord::new(
            "2025-02-21T18:19:57.000Z",
            Level::Info,
            vec!["::[AudioEngine] started".into()],
        ),
        LogRecord::new(
            "2025-02-21T18:19:57.500Z",
            Level::Error,
            vec!["::[AudioEngine] No Track! vid=1".into()],
        ),
        LogRecord::new(
            "2025-02-21T18:19:58.100Z",
            Level::Warn,
            vec!["::[UTIL] retry".into()],
        ),
    ]
}

fn sample_stats() -> Stats {
    Stats::from_logs(&sample_logs(), Duration::from_secs(1)).unwrap()
}

fn detected_media_issue() -> DetectedIssues {
    let mut keywords = OrderedMap::new();
    keywords.insert("media", vec!["No Track!".to_string()]);
    let mut detected = DetectedIssues::new();
    detected.insert(
        "Missing Media Track Error",
        KnownIssue {
            description: "Media track missing".into(),
            keywords,
            ..Default::default()
        },
    );
    detected
}

#[tokio::test]
async fn test_decide_summary_yes() {
    let client = ScriptedClient::replying(&["yes: needs more context"]);
    let agent = DecisionAgent::new(client.clone(), "BASE");

    let decision = agent
        .decide_summary("summarize please", &sample_stats())
        .await
        .unwrap();

    assert_eq!(decision.into_parts(), (true, "needs more context".to_string()));
    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("BASE\nLog Statistics:\n{"));
    assert!(prompts[0].contains("\"overall_total\": 3"));
    assert!(prompts[0].contains("User Query: summarize please"));
}

#[tokio::test]
async fn test_decide_summary_without_colon_is_no() {
    let client = ScriptedClient::replying(&["maybe not sure"]);
    let agent = DecisionAgent::new(client, "BASE");

    let decision = agent.decide_summary("q", &sample_stats()).await.unwrap();
    assert!(decision.is_fallback());
    assert_eq!(decision.into_parts(), (false, "maybe not sure".to_string()));
}

#[tokio::test]
async fn test_generate_summary_returns_simple_stats() {
    let client = ScriptedClient::replying(&["Mostly info logs with one error burst."]);
    let agent = DecisionAgent::new(client.clone(), "BASE");
    let logs = sample_logs();

    let (summary, simple) = agent
        .generate_summary("summarize", &sample_stats(), &logs)
        .await
        .unwrap();

    assert_eq!(summary, "Mostly info logs with one error burst.");
    assert_eq!(simple.levels.error, 1);
    assert_eq!(simple.levels.info, 1);
    assert_eq!(simple.top_keywords[0], "::[AudioEngine]");
    assert!(client.prompts()[0].ends_with("Respond with just the explanation:"));
}

#[tokio::test]
async fn test_evaluate_decision_prompt_has_no_stats() {
    let client = ScriptedClient::replying(&["no: the user asked for a filter"]);
    let agent = DecisionAgent::new(client.clone(), "BASE");

    let decision = agent.evaluate_decision("filter debug logs").await.unwrap();
    assert!(!decision.decision());
    assert!(!client.prompts()[0].contains("Log Statistics"));
}

#[tokio::test]
async fn test_evaluate_issue_empty_response_not_flagged() {
    let client = ScriptedClient::replying(&["  \n"]);
    let agent = DecisionAgent::new(client.clone(), "BASE");

    let assessment = agent
        .evaluate_issue(
            "Missing Media Track Error",
            &json!({"description": "Media track missing", "logs": {}}),
            "any issues?",
            &json!([]),
        )
        .await
        .unwrap();

    assert_eq!(assessment, IssueAssessment::NotFlagged);
    let prompt = &client.prompts()[0];
    assert!(prompt.contains("Known Issue: \"Missing Media Track Error\""));
    assert!(prompt.contains("\"logs\": {}"));
}

#[tokio::test]
async fn test_evaluate_issue_flagged() {
    let client =
        ScriptedClient::replying(&["**Issue Summary**:\nTrack lookup fails\n**Resolution**:\nRejoin"]);
    let agent = DecisionAgent::new(client, "BASE");

    let assessment = agent
        .evaluate_issue("Missing Media Track Error", &json!({}), "q", &json!([]))
        .await
        .unwrap();
    assert!(assessment.summary().unwrap().contains("Track lookup fails"));
}

#[tokio::test]
async fn test_decide_filter_embeds_detected_issues() {
    let client = ScriptedClient::replying(&["yes: the detected issue keywords make good filters"]);
    let agent = DecisionAgent::new(client.clone(), "BASE");

    let decision = agent
        .decide_filter("show problems", &detected_media_issue())
        .await
        .unwrap();

    assert!(decision.decision());
    let prompt = &client.prompts()[0];
    assert!(prompt.contains("\"Missing Media Track Error\": {"));
    assert!(prompt.contains("No Track!"));
}

#[tokio::test]
async fn test_generate_filter_group_decodes_fenced_json() {
    let response = r##"```json
{"title": "Media errors", "description": "Track issues", "filters": [{"text": "No Track!", "regex": false, "caseSensitive": false, "color": "#FFD580", "description": "missing track"}]}
```"##;
    let client = ScriptedClient::replying(&[response]);
    let agent = DecisionAgent::new(client, "BASE");

    let group = agent
        .generate_filter_group("filter problems", &detected_media_issue())
        .await
        .unwrap();
    assert_eq!(group.as_group().unwrap().title, "Media errors");
}

#[tokio::test]
async fn test_generate_filter_group_undecodable_is_empty() {
    let client = ScriptedClient::replying(&["Sorry, I can't produce JSON today."]);
    let agent = DecisionAgent::new(client, "BASE");

    let group = agent
        .generate_filter_group("q", &DetectedIssues::new())
        .await
        .unwrap();
    assert!(group.is_empty());
    assert_eq!(serde_json::to_value(&group).unwrap(), json!({}));
}

#[tokio::test]
async fn test_backend_error_propagates() {
    let client = ScriptedClient::new(vec![Err(ModelError::BackendUnavailable(
        "connection refused".into(),
    ))]);
    let agent = DecisionAgent::new(client, "BASE");

    let err = agent.evaluate_decision("q").await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::Backend(ModelError::BackendUnavailable(_))
    ));
}

#[tokio::test]
async fn test_agent_is_stateless_across_calls() {
    // Both summary operations see the stats they are handed, not a cached copy
    let client = ScriptedClient::replying(&["yes: ok", "summary"]);
    let agent = DecisionAgent::new(client.clone(), "BASE");
    let logs = sample_logs();
    let full = sample_stats();
    let partial = Stats::from_logs(&logs[..1], Duration::from_secs(1)).unwrap();

    agent.decide_summary("q", &full).await.unwrap();
    agent.generate_summary("q", &partial, &logs).await.unwrap();

    let prompts = client.prompts();
    assert!(prompts[0].contains("\"overall_total\": 3"));
    assert!(prompts[1].contains("\"overall_total\": 1"));
}
