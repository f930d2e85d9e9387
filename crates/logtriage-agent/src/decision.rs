use serde::Serialize;
use tracing::debug;

use crate::filter::strip_code_fences;

/// Outcome of reading a `yes: <reason>` / `no: <reason>` answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "parse", rename_all = "snake_case")]
pub enum DecisionParse {
    /// The answer had a `decision: explanation` shape
    Parsed { decision: bool, explanation: String },
    /// The answer could not be read; the decision is `false` and the raw text is kept
    Fallback { decision: bool, raw: String },
}

impl DecisionParse {
    /// Parse a decision from raw model output.
    ///
    /// Splits on the first `:`. The left side, trimmed and lower-cased, must
    /// equal `yes` for a positive decision. Without a colon the whole cleaned
    /// text becomes the explanation of a negative fallback.
    pub fn parse(response: &str) -> Self {
        let cleaned = strip_code_fences(response.trim());
        if cleaned.is_empty() {
            debug!("Empty decision response");
            return Self::fallback(String::new());
        }

        match cleaned.split_once(':') {
            Some((decision_part, explanation)) => {
                let token = decision_part
                    .trim()
                    .trim_matches(|c: char| c == '*' || c == '`' || c == '"')
                    .to_lowercase();
                DecisionParse::Parsed {
                    decision: token == "yes",
                    explanation: explanation.trim().to_string(),
                }
            }
            None => {
                debug!(response = cleaned, "Decision response had no colon");
                Self::fallback(cleaned.to_string())
            }
        }
    }

    fn fallback(raw: String) -> Self {
        DecisionParse::Fallback {
            decision: false,
            raw,
        }
    }

    pub fn decision(&self) -> bool {
        match self {
            DecisionParse::Parsed { decision, .. } | DecisionParse::Fallback { decision, .. } => {
                *decision
            }
        }
    }

    /// Explanation for a parsed answer, or the raw text of a fallback
    pub fn explanation(&self) -> &str {
        match self {
            DecisionParse::Parsed { explanation, .. } => explanation,
            DecisionParse::Fallback { raw, .. } => raw,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DecisionParse::Fallback { .. })
    }

    pub fn into_parts(self) -> (bool, String) {
        match self {
            DecisionParse::Parsed {
                decision,
                explanation,
            } => (decision, explanation),
            DecisionParse::Fallback { decision, raw } => (decision, raw),
        }
    }
}
