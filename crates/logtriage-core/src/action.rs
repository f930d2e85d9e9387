use logtriage_agent::GeneratedFilterGroup;
use logtriage_stats::SimpleStats;
use serde::Serialize;

/// Completion marker sent after the last action of a run
pub const DONE_SENTINEL: &str = "[DONE]";

/// One completed pipeline step, as delivered to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum Action {
    SummaryDecision {
        generate_summary: bool,
        explanation: String,
    },
    GenerateSummary {
        summary: String,
        stats: SimpleStats,
    },
    IssueDecision {
        evaluate_issues: bool,
        explanation: String,
    },
    FlagIssue {
        issue: String,
        summary: String,
    },
    FilterDecision {
        should_add_filter: bool,
        explanation: String,
    },
    AddFilter {
        filter_group: GeneratedFilterGroup,
    },
}

impl Action {
    /// The `type` tag this action serializes with
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SummaryDecision { .. } => "summary_decision",
            Action::GenerateSummary { .. } => "generate_summary",
            Action::IssueDecision { .. } => "issue_decision",
            Action::FlagIssue { .. } => "flag_issue",
            Action::FilterDecision { .. } => "filter_decision",
            Action::AddFilter { .. } => "add_filter",
        }
    }

    /// The yes/no outcome for decision actions
    pub fn decision(&self) -> Option<bool> {
        match self {
            Action::SummaryDecision {
                generate_summary, ..
            } => Some(*generate_summary),
            Action::IssueDecision {
                evaluate_issues, ..
            } => Some(*evaluate_issues),
            Action::FilterDecision {
                should_add_filter, ..
            } => Some(*should_add_filter),
            _ => None,
        }
    }
}

/// Items carried on a run's event channel
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Action(Action),
    /// The run was aborted by a backend failure; no `Done` follows
    Error(String),
    Done,
}

impl StreamEvent {
    /// Payload for one stream frame: a JSON object, or the completion sentinel
    pub fn to_data(&self) -> String {
        match self {
            StreamEvent::Action(action) => {
                serde_json::to_string(action).unwrap_or_else(|_| "{}".to_string())
            }
            StreamEvent::Error(message) => serde_json::json!({
                "type": "error",
                "body": { "message": message },
            })
            .to_string(),
            StreamEvent::Done => DONE_SENTINEL.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Action(action) => action.kind(),
            StreamEvent::Error(_) => "error",
            StreamEvent::Done => "done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Error(_) | StreamEvent::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtriage_agent::EmptyObject;
    use serde_json::json;

    #[test]
    fn test_action_wire_shape() {
        let action = Action::SummaryDecision {
            generate_summary: true,
            explanation: "needs more context".into(),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "summary_decision",
                "body": {"generate_summary": true, "explanation": "needs more context"}
            })
        );
        assert_eq!(action.decision(), Some(true));
    }

    #[test]
    fn test_add_filter_with_empty_group() {
        let event = StreamEvent::Action(Action::AddFilter {
            filter_group: GeneratedFilterGroup::Empty(EmptyObject {}),
        });
        assert_eq!(
            event.to_data(),
            r#"{"type":"add_filter","body":{"filter_group":{}}}"#
        );
    }

    #[test]
    fn test_sentinel_and_error_frames() {
        assert_eq!(StreamEvent::Done.to_data(), "[DONE]");
        let error: serde_json::Value =
            serde_json::from_str(&StreamEvent::Error("backend down".into()).to_data()).unwrap();
        assert_eq!(error["type"], "error");
        assert_eq!(error["body"]["message"], "backend down");
        assert!(StreamEvent::Done.is_terminal());
    }
}
