use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for one triage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    PipelineStarted {
        run_id: String,
        query_preview: String,
        backend: String,
        log_records: usize,
        known_issues: usize,
    },
    /// One action has been produced and handed to the stream
    StageCompleted {
        run_id: String,
        action: String,
        decision: Option<bool>,
    },
    IssueEvaluated {
        run_id: String,
        issue: String,
        evidence_rows: usize,
        flagged: bool,
    },
    PipelineCompleted {
        run_id: String,
        actions: usize,
        detected_issues: usize,
        duration_secs: f64,
    },
    PipelineAborted {
        run_id: String,
        actions: usize,
        error: String,
    },
    /// The consumer went away before the run finished
    PipelineCancelled {
        run_id: String,
        actions: usize,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }

    pub fn run_id(&self) -> &str {
        match self {
            LogEvent::PipelineStarted { run_id, .. }
            | LogEvent::StageCompleted { run_id, .. }
            | LogEvent::IssueEvaluated { run_id, .. }
            | LogEvent::PipelineCompleted { run_id, .. }
            | LogEvent::PipelineAborted { run_id, .. }
            | LogEvent::PipelineCancelled { run_id, .. } => run_id,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for triage runs - writes to stderr and optionally to a JSONL file
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger that also appends every event to `log_path` as JSON
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let _ = writeln!(file, "{}", event.with_timestamp());
            }
        }

        let mut stderr = std::io::stderr();
        let line = match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Self::render_pretty(event),
            LogFormat::Compact => Some(Self::render_compact(event)),
        };
        if let Some(line) = line {
            let _ = writeln!(stderr, "{}", line);
        }
    }

    fn render_pretty(event: &LogEvent) -> Option<String> {
        let text = match event {
            LogEvent::PipelineStarted {
                run_id,
                query_preview,
                backend,
                log_records,
                known_issues,
            } => format!(
                "{} {} {}\n  {} {}\n  {} {} records, {} known issues, backend {}",
                "▶".bright_blue(),
                "Triage".bold().bright_white(),
                short_id(run_id).dimmed(),
                "Query:".dimmed(),
                truncate(query_preview, 60).dimmed(),
                "Input:".dimmed(),
                log_records,
                known_issues,
                backend.bright_cyan()
            ),
            LogEvent::StageCompleted {
                action, decision, ..
            } => match decision {
                Some(true) => format!("  {} {} {}", "✓".bright_green(), action, "yes".green()),
                Some(false) => format!("  {} {} {}", "·".dimmed(), action, "no".dimmed()),
                None => format!("  {} {}", "✓".bright_green(), action),
            },
            LogEvent::IssueEvaluated {
                issue,
                evidence_rows,
                flagged,
                ..
            } => {
                if *flagged {
                    format!(
                        "    {} {} ({} rows)",
                        "⚠".bright_yellow(),
                        issue.bright_yellow(),
                        evidence_rows
                    )
                } else {
                    format!(
                        "    {} {} ({} rows)",
                        "·".dimmed(),
                        issue.dimmed(),
                        evidence_rows
                    )
                }
            }
            LogEvent::PipelineCompleted {
                actions,
                detected_issues,
                duration_secs,
                ..
            } => format!(
                "{} Done: {} actions, {} issues flagged ({:.1}s)",
                "✓".bright_green(),
                actions,
                detected_issues,
                duration_secs
            ),
            LogEvent::PipelineAborted { error, actions, .. } => format!(
                "{} Aborted after {} actions: {}",
                "✗".bright_red(),
                actions,
                error.bright_red()
            ),
            LogEvent::PipelineCancelled { actions, .. } => format!(
                "{} Cancelled by consumer after {} actions",
                "⚠".bright_yellow(),
                actions
            ),
        };
        Some(text)
    }

    fn render_compact(event: &LogEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let id = short_id(event.run_id());
        match event {
            LogEvent::PipelineStarted {
                log_records,
                known_issues,
                backend,
                ..
            } => format!(
                "[{}] {} run:start logs={} issues={} backend={}",
                timestamp, id, log_records, known_issues, backend
            ),
            LogEvent::StageCompleted {
                action, decision, ..
            } => match decision {
                Some(d) => format!("[{}] {} {}={}", timestamp, id, action, d),
                None => format!("[{}] {} {}", timestamp, id, action),
            },
            LogEvent::IssueEvaluated {
                issue,
                evidence_rows,
                flagged,
                ..
            } => format!(
                "[{}] {} issue:{} rows={} flagged={}",
                timestamp, id, issue, evidence_rows, flagged
            ),
            LogEvent::PipelineCompleted {
                actions,
                duration_secs,
                ..
            } => format!(
                "[{}] {} run:done actions={} {:.1}s",
                timestamp, id, actions, duration_secs
            ),
            LogEvent::PipelineAborted { error, .. } => {
                format!("[{}] {} run:error {}", timestamp, id, error)
            }
            LogEvent::PipelineCancelled { actions, .. } => {
                format!("[{}] {} run:cancelled actions={}", timestamp, id, actions)
            }
        }
    }
}

fn short_id(run_id: &str) -> &str {
    run_id.get(..8).unwrap_or(run_id)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
