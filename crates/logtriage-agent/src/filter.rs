use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One highlight rule in a filter group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Keyword or regex pattern to match
    pub text: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Hex highlight color
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

/// A named set of filters proposed for the log viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub filters: Vec<Filter>,
}

/// Serializes as `{}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyObject {}

/// Result of asking the model for a filter group: the group, or `{}` when
/// the response could not be decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedFilterGroup {
    Group(FilterGroup),
    Empty(EmptyObject),
}

impl GeneratedFilterGroup {
    /// Decode a filter group from raw model output.
    ///
    /// Markdown code fences are removed first. If the remaining text is not a
    /// group on its own, the outermost `{...}` span is tried before giving up.
    pub fn parse(response: &str) -> Self {
        let cleaned = strip_code_fences(response);

        match serde_json::from_str::<FilterGroup>(cleaned) {
            Ok(group) => return GeneratedFilterGroup::Group(group),
            Err(e) => debug!(error = %e, "Filter group is not bare JSON"),
        }

        if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
            if start < end {
                if let Ok(group) = serde_json::from_str::<FilterGroup>(&cleaned[start..=end]) {
                    return GeneratedFilterGroup::Group(group);
                }
            }
        }

        warn!(
            response_len = response.len(),
            "Could not decode filter group, using empty group"
        );
        GeneratedFilterGroup::Empty(EmptyObject {})
    }

    pub fn as_group(&self) -> Option<&FilterGroup> {
        match self {
            GeneratedFilterGroup::Group(group) => Some(group),
            GeneratedFilterGroup::Empty(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GeneratedFilterGroup::Empty(_))
    }
}

/// Remove a surrounding Markdown code fence (with optional info string).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
