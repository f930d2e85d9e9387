use serde::Serialize;

/// Whether a known issue was flagged by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "summary", rename_all = "snake_case")]
pub enum IssueAssessment {
    /// Non-empty response: the issue applies, with the model's summary and resolution
    Flagged(String),
    /// Empty or whitespace-only response
    NotFlagged,
}

impl IssueAssessment {
    pub fn from_response(response: &str) -> Self {
        let trimmed = response.trim();
        if trimmed.is_empty() {
            IssueAssessment::NotFlagged
        } else {
            IssueAssessment::Flagged(trimmed.to_string())
        }
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, IssueAssessment::Flagged(_))
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            IssueAssessment::Flagged(summary) => Some(summary),
            IssueAssessment::NotFlagged => None,
        }
    }
}
