use std::sync::Arc;
use std::time::Duration;

use logtriage_model::{ModelRegistry, ReasoningClient};
use logtriage_stats::{KnownIssue, LogRecord, OrderedMap, Stats};
use serde::Deserialize;

use crate::error::RequestError;

/// A triage request: the user's question, the logs, and the issue catalog
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TriageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "knownIssues")]
    pub known_issues: OrderedMap<KnownIssue>,
    #[serde(default)]
    pub logs: Vec<LogRecord>,
    #[serde(default, alias = "modelSelector")]
    pub model_selector: String,
}

/// Everything a run needs once a request has been accepted
pub struct Admitted {
    pub client: Arc<dyn ReasoningClient>,
    pub stats: Stats,
}

impl TriageRequest {
    pub fn new(message: impl Into<String>, logs: Vec<LogRecord>) -> Self {
        Self {
            message: message.into(),
            logs,
            ..Default::default()
        }
    }

    pub fn with_known_issues(mut self, known_issues: OrderedMap<KnownIssue>) -> Self {
        self.known_issues = known_issues;
        self
    }

    pub fn with_model(mut self, selector: impl Into<String>) -> Self {
        self.model_selector = selector.into();
        self
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.message.trim().is_empty() {
            return Err(RequestError::MissingMessage);
        }
        if self.logs.is_empty() {
            return Err(RequestError::MissingLogs);
        }
        if self.model_selector.trim().is_empty() {
            return Err(RequestError::MissingModelSelector);
        }
        Ok(())
    }

    /// Validate, resolve the model and compute statistics in one step.
    ///
    /// Statistics are computed here, once per request, so malformed
    /// timestamps are rejected before any stage starts.
    pub fn admit(
        &self,
        registry: &ModelRegistry,
        interval: Duration,
    ) -> Result<Admitted, RequestError> {
        self.validate()?;
        let client = registry
            .get(&self.model_selector)
            .ok_or_else(|| RequestError::UnknownModel(self.model_selector.clone()))?;
        let stats = Stats::from_logs(&self.logs, interval)
            .map_err(|e| RequestError::MalformedLogData(e.to_string()))?;
        Ok(Admitted { client, stats })
    }
}
