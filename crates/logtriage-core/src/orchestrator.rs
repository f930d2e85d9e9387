use std::sync::Arc;
use std::time::Instant;

use logtriage_agent::{AgentError, DecisionAgent, DetectedIssues, IssueAssessment};
use logtriage_logging::{LogEvent, Logger};
use logtriage_stats::Stats;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::action::{Action, StreamEvent};
use crate::error::PipelineError;
use crate::evidence::{EvidenceSource, KeywordEvidence};
use crate::outcome::RunOutcome;
use crate::request::TriageRequest;

/// Capacity of the per-run event channel
pub const EVENT_BUFFER: usize = 64;

/// Why a run stopped before reaching the end
enum Halt {
    Cancelled,
    Failed(PipelineError),
}

impl From<PipelineError> for Halt {
    fn from(e: PipelineError) -> Self {
        Halt::Failed(e)
    }
}

impl From<AgentError> for Halt {
    fn from(e: AgentError) -> Self {
        Halt::Failed(PipelineError::Backend(e))
    }
}

struct RunState {
    run_id: String,
    actions: usize,
    detected: DetectedIssues,
    started: Instant,
}

impl RunState {
    fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            actions: 0,
            detected: DetectedIssues::new(),
            started: Instant::now(),
        }
    }
}

/// Drives one request through the decision stages and streams an action per step.
///
/// Stages run strictly in order:
/// summary decision, optional summary, issue decision, one evaluation per
/// known issue, filter decision, optional filter group. Known issues are
/// evaluated one at a time in catalog order. Before each stage the event
/// channel is checked; once the consumer has gone, no further stage starts.
#[derive(Clone)]
pub struct StreamOrchestrator {
    agent: DecisionAgent,
    evidence: Arc<dyn EvidenceSource>,
    logger: Arc<Logger>,
}

impl StreamOrchestrator {
    pub fn new(
        agent: DecisionAgent,
        evidence: Arc<dyn EvidenceSource>,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            agent,
            evidence,
            logger,
        }
    }

    /// Orchestrator using keyword-matched evidence with `top_n` rows per keyword
    pub fn with_keyword_evidence(agent: DecisionAgent, top_n: usize, logger: Arc<Logger>) -> Self {
        Self::new(agent, Arc::new(KeywordEvidence::new(top_n)), logger)
    }

    /// Run on a background task and return the receiving end of the stream
    pub fn spawn(
        self,
        request: TriageRequest,
        stats: Stats,
    ) -> (mpsc::Receiver<StreamEvent>, JoinHandle<RunOutcome>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let handle = tokio::spawn(async move { self.run(&request, &stats, tx).await });
        (rx, handle)
    }

    /// Run every stage, sending events on `tx`.
    ///
    /// Ends with [`StreamEvent::Done`] on success or [`StreamEvent::Error`]
    /// when a backend fails. Events already sent stay delivered either way.
    pub async fn run(
        &self,
        request: &TriageRequest,
        stats: &Stats,
        tx: mpsc::Sender<StreamEvent>,
    ) -> RunOutcome {
        let mut state = RunState::new();
        let span = info_span!("triage_run", run_id = %state.run_id);

        async {
            self.logger.log(&LogEvent::PipelineStarted {
                run_id: state.run_id.clone(),
                query_preview: request.message.chars().take(100).collect(),
                backend: self.agent.client_name().to_string(),
                log_records: request.logs.len(),
                known_issues: request.known_issues.len(),
            });

            let result = self.run_stages(request, stats, &tx, &mut state).await;
            let duration = state.started.elapsed();

            match result {
                Ok(()) => {
                    let _ = tx.send(StreamEvent::Done).await;
                    self.logger.log(&LogEvent::PipelineCompleted {
                        run_id: state.run_id.clone(),
                        actions: state.actions,
                        detected_issues: state.detected.len(),
                        duration_secs: duration.as_secs_f64(),
                    });
                    info!(actions = state.actions, "Triage run completed");
                    RunOutcome::completed(
                        state.actions,
                        state.detected.keys().map(String::from).collect(),
                        duration,
                    )
                }
                Err(Halt::Cancelled) => {
                    self.logger.log(&LogEvent::PipelineCancelled {
                        run_id: state.run_id.clone(),
                        actions: state.actions,
                    });
                    info!(actions = state.actions, "Consumer disconnected, run stopped");
                    RunOutcome::cancelled(state.actions, duration)
                }
                Err(Halt::Failed(e)) => {
                    warn!(error = %e, "Triage run aborted");
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                    self.logger.log(&LogEvent::PipelineAborted {
                        run_id: state.run_id.clone(),
                        actions: state.actions,
                        error: e.to_string(),
                    });
                    RunOutcome::aborted(state.actions, e.to_string(), duration)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        request: &TriageRequest,
        stats: &Stats,
        tx: &mpsc::Sender<StreamEvent>,
        state: &mut RunState,
    ) -> Result<(), Halt> {
        let query = request.message.as_str();

        // Summary
        checkpoint(tx)?;
        let (generate_summary, explanation) =
            self.agent.decide_summary(query, stats).await?.into_parts();
        self.emit(
            tx,
            state,
            Action::SummaryDecision {
                generate_summary,
                explanation,
            },
        )
        .await?;

        if generate_summary {
            checkpoint(tx)?;
            let (summary, simple) = self
                .agent
                .generate_summary(query, stats, &request.logs)
                .await?;
            self.emit(
                tx,
                state,
                Action::GenerateSummary {
                    summary,
                    stats: simple,
                },
            )
            .await?;
        }

        // Known issues
        checkpoint(tx)?;
        let (evaluate_issues, explanation) =
            self.agent.evaluate_decision(query).await?.into_parts();
        self.emit(
            tx,
            state,
            Action::IssueDecision {
                evaluate_issues,
                explanation,
            },
        )
        .await?;

        if evaluate_issues {
            for (name, issue) in request.known_issues.iter() {
                checkpoint(tx)?;
                let evidence = self
                    .evidence
                    .gather(name, issue, query, &request.logs)
                    .await?;
                let assessment = self
                    .agent
                    .evaluate_issue(name, &evidence.details, query, &evidence.similar_logs)
                    .await?;

                self.logger.log(&LogEvent::IssueEvaluated {
                    run_id: state.run_id.clone(),
                    issue: name.to_string(),
                    evidence_rows: evidence.rows,
                    flagged: assessment.is_flagged(),
                });

                if let IssueAssessment::Flagged(summary) = assessment {
                    state.detected.insert(name, issue.clone());
                    self.emit(
                        tx,
                        state,
                        Action::FlagIssue {
                            issue: name.to_string(),
                            summary,
                        },
                    )
                    .await?;
                }
            }
        }

        // Filter
        checkpoint(tx)?;
        let (should_add_filter, explanation) = self
            .agent
            .decide_filter(query, &state.detected)
            .await?
            .into_parts();
        self.emit(
            tx,
            state,
            Action::FilterDecision {
                should_add_filter,
                explanation,
            },
        )
        .await?;

        if should_add_filter {
            checkpoint(tx)?;
            let filter_group = self
                .agent
                .generate_filter_group(query, &state.detected)
                .await?;
            self.emit(tx, state, Action::AddFilter { filter_group })
                .await?;
        }

        Ok(())
    }

    async fn emit(
        &self,
        tx: &mpsc::Sender<StreamEvent>,
        state: &mut RunState,
        action: Action,
    ) -> Result<(), Halt> {
        let kind = action.kind();
        let decision = action.decision();
        tx.send(StreamEvent::Action(action))
            .await
            .map_err(|_| Halt::Cancelled)?;
        state.actions += 1;
        self.logger.log(&LogEvent::StageCompleted {
            run_id: state.run_id.clone(),
            action: kind.to_string(),
            decision,
        });
        Ok(())
    }
}

fn checkpoint(tx: &mpsc::Sender<StreamEvent>) -> Result<(), Halt> {
    if tx.is_closed() {
        debug!("Event stream closed before next stage");
        return Err(Halt::Cancelled);
    }
    Ok(())
}
