use std::sync::Arc;

use logtriage_model::ReasoningClient;
use logtriage_stats::{simple_stats, KnownIssue, LogRecord, OrderedMap, SimpleStats, Stats};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::decision::DecisionParse;
use crate::error::AgentError;
use crate::filter::GeneratedFilterGroup;
use crate::issue::IssueAssessment;
use crate::prompts::AgentPrompts;

/// Base prompt used when none is configured
pub const DEFAULT_BASE_PROMPT: &str = "You are a helpful assistant integrated with a log viewer tool for engineers. \
Your role is to help analyze and filter large log files quickly. \
Do not include any additional text.";

/// Issues flagged during a run, keyed by issue name in catalog order
pub type DetectedIssues = OrderedMap<KnownIssue>;

/// Asks a reasoning backend the triage questions.
///
/// The agent holds no per-request state. Statistics are computed by the
/// caller once per request and passed into the summary operations.
#[derive(Clone)]
pub struct DecisionAgent {
    client: Arc<dyn ReasoningClient>,
    base_prompt: String,
}

impl DecisionAgent {
    pub fn new(client: Arc<dyn ReasoningClient>, base_prompt: impl Into<String>) -> Self {
        Self {
            client,
            base_prompt: base_prompt.into(),
        }
    }

    pub fn with_default_prompt(client: Arc<dyn ReasoningClient>) -> Self {
        Self::new(client, DEFAULT_BASE_PROMPT)
    }

    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }

    /// Should a summary of the statistics be generated for this query?
    #[instrument(skip_all, fields(backend = %self.client.name()))]
    pub async fn decide_summary(
        &self,
        query: &str,
        stats: &Stats,
    ) -> Result<DecisionParse, AgentError> {
        let prompt = AgentPrompts::build_summary_decision_prompt(
            &self.base_prompt,
            &to_pretty_json(stats)?,
            query,
        );
        self.ask_decision(&prompt).await
    }

    /// Natural-language summary of `stats`, with level counts and top keywords of `logs`
    #[instrument(skip_all, fields(backend = %self.client.name(), logs = logs.len()))]
    pub async fn generate_summary(
        &self,
        query: &str,
        stats: &Stats,
        logs: &[LogRecord],
    ) -> Result<(String, SimpleStats), AgentError> {
        let prompt =
            AgentPrompts::build_summary_prompt(&self.base_prompt, &to_pretty_json(stats)?, query);
        let summary = self.client.complete(&prompt).await?;
        info!(summary_len = summary.len(), "Summary generated");
        Ok((summary, simple_stats(logs)))
    }

    /// Should the known-issue catalog be checked for this query?
    #[instrument(skip_all, fields(backend = %self.client.name()))]
    pub async fn evaluate_decision(&self, query: &str) -> Result<DecisionParse, AgentError> {
        let prompt = AgentPrompts::build_issue_decision_prompt(&self.base_prompt, query);
        self.ask_decision(&prompt).await
    }

    /// Ask whether one known issue applies, given its details and evidence
    #[instrument(skip(self, details, similar_logs, query), fields(backend = %self.client.name()))]
    pub async fn evaluate_issue(
        &self,
        issue_name: &str,
        details: &Value,
        query: &str,
        similar_logs: &Value,
    ) -> Result<IssueAssessment, AgentError> {
        let prompt = AgentPrompts::build_issue_evaluation_prompt(
            &self.base_prompt,
            issue_name,
            &to_pretty_json(details)?,
            &to_pretty_json(similar_logs)?,
            query,
        );
        let response = self.client.complete(&prompt).await?;
        let assessment = IssueAssessment::from_response(&response);
        debug!(flagged = assessment.is_flagged(), "Issue evaluated");
        Ok(assessment)
    }

    /// Should a filter group be proposed?
    #[instrument(skip_all, fields(backend = %self.client.name(), detected = detected.len()))]
    pub async fn decide_filter(
        &self,
        query: &str,
        detected: &DetectedIssues,
    ) -> Result<DecisionParse, AgentError> {
        let prompt = AgentPrompts::build_filter_decision_prompt(
            &self.base_prompt,
            query,
            &to_pretty_json(detected)?,
        );
        self.ask_decision(&prompt).await
    }

    /// Generate a filter group. Undecodable output becomes `{}`.
    #[instrument(skip_all, fields(backend = %self.client.name(), detected = detected.len()))]
    pub async fn generate_filter_group(
        &self,
        query: &str,
        detected: &DetectedIssues,
    ) -> Result<GeneratedFilterGroup, AgentError> {
        let prompt = AgentPrompts::build_filter_group_prompt(
            &self.base_prompt,
            query,
            &to_pretty_json(detected)?,
        );
        let response = self.client.complete(&prompt).await?;
        Ok(GeneratedFilterGroup::parse(&response))
    }

    async fn ask_decision(&self, prompt: &str) -> Result<DecisionParse, AgentError> {
        let response = self.client.complete(prompt).await?;
        let parsed = DecisionParse::parse(&response);
        debug!(
            decision = parsed.decision(),
            fallback = parsed.is_fallback(),
            "Decision parsed"
        );
        Ok(parsed)
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AgentError> {
    Ok(serde_json::to_string_pretty(value)?)
}
