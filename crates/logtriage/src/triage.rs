use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use logtriage_agent::DecisionAgent;
use logtriage_core::{RunOutcome, StreamEvent, StreamOrchestrator, TriageRequest, EVENT_BUFFER};
use logtriage_logging::Logger;
use logtriage_stats::{simple_stats, KnownIssue, LogRecord, OrderedMap, Stats};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::{mpsc, watch};

use crate::config::AppConfig;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub struct TriageArgs<'a> {
    pub logs: &'a Path,
    pub message: &'a str,
    pub issues: Option<&'a Path>,
    pub model: Option<&'a str>,
}

/// Run the pipeline once and print each event as a JSON line.
///
/// `interrupts` counts Ctrl+C presses. The first closes the event stream so
/// no further stage starts. A second one abandons the stage in progress.
pub async fn handle_triage_command(
    config: &AppConfig,
    args: TriageArgs<'_>,
    logger: Arc<Logger>,
    mut interrupts: watch::Receiver<u32>,
) -> Result<RunOutcome> {
    let logs: Vec<LogRecord> = read_json(args.logs)?;
    let known_issues: OrderedMap<KnownIssue> = match args.issues {
        Some(path) => read_json(path)?,
        None => OrderedMap::new(),
    };

    let selector = config.select_model(args.model)?;
    let registry = config.build_registry_for(&selector)?;

    let request = TriageRequest::new(args.message, logs)
        .with_known_issues(known_issues)
        .with_model(selector);
    let admitted = request
        .admit(&registry, config.bucket_interval())
        .context("Request rejected")?;

    let agent = DecisionAgent::new(admitted.client, config.base_prompt.clone());
    let orchestrator = StreamOrchestrator::with_keyword_evidence(agent, config.top_n, logger);
    let stats = admitted.stats;

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    // Closed before the run starts so the first stage sees it
    let mut stopping = *interrupts.borrow_and_update() > 0;
    if stopping {
        rx.close();
    }

    let started = Instant::now();
    let mut handle = tokio::spawn(async move { orchestrator.run(&request, &stats, tx).await });
    let mut delivered = 0;

    while !stopping {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    if matches!(event, StreamEvent::Action(_)) {
                        delivered += 1;
                    }
                    println!("{}", event.to_data());
                }
                None => break,
            },
            _ = next_interrupt(&mut interrupts) => {
                eprintln!("\nInterrupted. Stopping after the current stage (Ctrl+C again to abort)...");
                rx.close();
                stopping = true;
            }
        }
    }
    // Events sent before the stream closed are still printed
    while let Ok(event) = rx.try_recv() {
        if matches!(event, StreamEvent::Action(_)) {
            delivered += 1;
        }
        println!("{}", event.to_data());
    }

    tokio::select! {
        joined = &mut handle => joined.context("Triage task failed"),
        _ = next_interrupt(&mut interrupts), if stopping => {
            handle.abort();
            eprintln!("Abandoned the stage in progress");
            Ok(RunOutcome::cancelled(delivered, started.elapsed()))
        }
    }
}

/// Resolves on the next Ctrl+C; never resolves once the handler is gone
async fn next_interrupt(interrupts: &mut watch::Receiver<u32>) {
    if interrupts.changed().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Print bucketed statistics and simple stats as pretty JSON
pub fn handle_stats_command(config: &AppConfig, logs: &Path, interval_secs: Option<u64>) -> Result<()> {
    let logs: Vec<LogRecord> = read_json(logs)?;
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.bucket_interval());

    let stats = Stats::from_logs(&logs, interval).context("Failed to compute statistics")?;
    let output = json!({
        "stats": stats,
        "simple": simple_stats(&logs),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
