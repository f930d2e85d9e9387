use async_trait::async_trait;
use logtriage_stats::{extract_top_rows, KnownIssue, LogRecord, DEFAULT_TOP_N};
use serde_json::Value;

use crate::error::PipelineError;

/// Context handed to the agent when evaluating one known issue
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    /// Issue details as shown to the model
    pub details: Value,
    /// Nearest-neighbour hits from a similarity store, if any
    pub similar_logs: Value,
    /// Number of log records attached to `details`
    pub rows: usize,
}

/// Gathers supporting log records for a known issue.
///
/// A remote similarity store plugs in by implementing this trait.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn gather(
        &self,
        issue_name: &str,
        issue: &KnownIssue,
        query: &str,
        logs: &[LogRecord],
    ) -> Result<Evidence, PipelineError>;
}

/// Keyword-matched Warn/Error rows, attached under `logs` in the issue details
#[derive(Debug, Clone)]
pub struct KeywordEvidence {
    top_n: usize,
}

impl KeywordEvidence {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }
}

impl Default for KeywordEvidence {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

#[async_trait]
impl EvidenceSource for KeywordEvidence {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn gather(
        &self,
        issue_name: &str,
        issue: &KnownIssue,
        _query: &str,
        logs: &[LogRecord],
    ) -> Result<Evidence, PipelineError> {
        let rows = extract_top_rows(logs, &issue.keywords, self.top_n);
        let row_count = rows.iter().map(|(_, records)| records.len()).sum();

        let encode = |e: serde_json::Error| {
            PipelineError::Evidence(format!("{}: {}", issue_name, e))
        };
        let mut details = serde_json::to_value(issue).map_err(encode)?;
        if let Some(obj) = details.as_object_mut() {
            obj.insert("logs".to_string(), serde_json::to_value(&rows).map_err(encode)?);
        }

        Ok(Evidence {
            details,
            similar_logs: Value::Array(Vec::new()),
            rows: row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtriage_stats::{Level, OrderedMap};

    #[tokio::test]
    async fn test_keyword_evidence_attaches_logs() {
        let mut keywords = OrderedMap::new();
        keywords.insert("media", vec!["No Track!".to_string()]);
        let issue = KnownIssue {
            description: "Media track missing".into(),
            keywords,
            ..Default::default()
        };
        let logs = vec![
            LogRecord::new("2025-02-21T18:19:57Z", Level::Info, vec!["No Track!".into()]),
            LogRecord::new("2025-02-21T18:19:58Z", Level::Error, vec!["No Track! vid=1".into()]),
        ];

        let evidence = KeywordEvidence::default()
            .gather("Missing Media Track Error", &issue, "q", &logs)
            .await
            .unwrap();

        assert_eq!(evidence.rows, 1);
        assert_eq!(evidence.details["description"], "Media track missing");
        assert_eq!(evidence.details["logs"]["media"][0]["level"], "Error");
        assert_eq!(evidence.similar_logs, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_issue_without_keywords_gets_empty_logs() {
        let evidence = KeywordEvidence::new(5)
            .gather("Empty", &KnownIssue::default(), "q", &[])
            .await
            .unwrap();
        assert_eq!(evidence.rows, 0);
        assert_eq!(evidence.details["logs"], serde_json::json!({}));
    }
}
