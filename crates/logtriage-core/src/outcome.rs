use serde::Serialize;
use std::time::Duration;

/// How a triage run ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage ran and the completion sentinel was sent
    Completed {
        actions: usize,
        detected_issues: Vec<String>,
        total_duration_secs: f64,
    },
    /// The consumer closed the stream; remaining stages were not started
    Cancelled {
        actions: usize,
        total_duration_secs: f64,
    },
    /// A backend or evidence failure stopped the run
    Aborted {
        actions: usize,
        error: String,
        total_duration_secs: f64,
    },
}

impl RunOutcome {
    pub fn completed(actions: usize, detected_issues: Vec<String>, duration: Duration) -> Self {
        Self::Completed {
            actions,
            detected_issues,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn cancelled(actions: usize, duration: Duration) -> Self {
        Self::Cancelled {
            actions,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn aborted(actions: usize, error: String, duration: Duration) -> Self {
        Self::Aborted {
            actions,
            error,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    /// Number of actions delivered before the run ended
    pub fn actions(&self) -> usize {
        match self {
            Self::Completed { actions, .. }
            | Self::Cancelled { actions, .. }
            | Self::Aborted { actions, .. } => *actions,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { .. } => 0,
            Self::Cancelled { .. } => 130,
            Self::Aborted { .. } => 2,
        }
    }
}
