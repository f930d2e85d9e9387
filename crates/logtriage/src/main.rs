mod api;
mod config;
mod server;
mod triage;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tokio::sync::watch;

use logtriage_core::RunOutcome;
use logtriage_logging::{init_tracing, LogFormat, Logger};

use crate::config::AppConfig;
use crate::triage::TriageArgs;

#[derive(Parser, Debug)]
#[command(
    name = "logtriage",
    about = "LLM-assisted log triage: summaries, known-issue detection and filter suggestions",
    version
)]
struct Cli {
    /// Path to a config file (default: ./logtriage.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level for diagnostics (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the triage pipeline once and print each action as a JSON line
    Triage {
        /// JSON file with an array of log records
        #[arg(short, long)]
        logs: PathBuf,

        /// The question to answer about the logs
        #[arg(short, long)]
        message: String,

        /// JSON file with the known-issue catalog
        #[arg(short, long)]
        issues: Option<PathBuf>,

        /// Model selector from [models]
        #[arg(long)]
        model: Option<String>,
    },
    /// Print bucketed statistics for a log file
    Stats {
        /// JSON file with an array of log records
        #[arg(short, long)]
        logs: PathBuf,

        /// Bucket width in seconds (overrides bucket_interval_secs)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let (mut config, config_path) = AppConfig::load(cli.config.as_deref(), &working_dir)?;
    match config_path {
        Some(path) => tracing::debug!(path = %path.display(), "Loaded configuration"),
        None => tracing::debug!("No configuration file found, using defaults"),
    }

    let logger = Arc::new(match config.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    });

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::handle_serve_command(&config, logger).await
        }
        Commands::Triage {
            logs,
            message,
            issues,
            model,
        } => {
            let (interrupt, interrupts) = watch::channel(0u32);
            ctrlc::set_handler(move || {
                interrupt.send_modify(|presses| *presses += 1);
            })
            .context("Failed to set Ctrl+C handler")?;

            let outcome = triage::handle_triage_command(
                &config,
                TriageArgs {
                    logs: &logs,
                    message: &message,
                    issues: issues.as_deref(),
                    model: model.as_deref(),
                },
                logger,
                interrupts,
            )
            .await?;

            print_outcome(&outcome);
            std::process::exit(outcome.exit_code());
        }
        Commands::Stats {
            logs,
            interval_secs,
        } => triage::handle_stats_command(&config, &logs, interval_secs),
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed {
            actions,
            detected_issues,
            total_duration_secs,
        } => {
            eprintln!(
                "{} {} actions in {:.1}s",
                "✓".bright_green(),
                actions,
                total_duration_secs
            );
            if !detected_issues.is_empty() {
                eprintln!("  {} {}", "Flagged:".dimmed(), detected_issues.join(", "));
            }
        }
        RunOutcome::Cancelled { actions, .. } => {
            eprintln!("{} Stopped after {} actions", "⚠".bright_yellow(), actions);
        }
        RunOutcome::Aborted { actions, error, .. } => {
            eprintln!(
                "{} Failed after {} actions: {}",
                "✗".bright_red(),
                actions,
                error.bright_red()
            );
        }
    }
}
