use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use logtriage_logging::Logger;
use tracing::{info, warn};

use crate::api::{self, PipelineSettings};
use crate::config::AppConfig;

/// Run the HTTP API until Ctrl+C
pub async fn handle_serve_command(config: &AppConfig, logger: Arc<Logger>) -> Result<()> {
    let registry = config.build_registry()?;
    if registry.is_empty() {
        warn!("No models configured; every chat request will be rejected");
    }
    for selector in registry.selectors() {
        if let Some(client) = registry.get(selector) {
            if !client.is_available().await {
                warn!(selector, backend = client.name(), "Model backend is not reachable yet");
            }
        }
    }

    let router = api::create_router(registry, PipelineSettings::from(config), logger);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://{}", addr).bold()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();
    info!(%addr, "API server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
