use std::convert::Infallible;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use logtriage_agent::DecisionAgent;
use logtriage_core::{StreamOrchestrator, TriageRequest};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use super::AppState;

/// `POST /api/chat` - run the triage pipeline and stream one action per step.
///
/// Input errors are answered with `400` before any stage runs. Once the
/// stream has started, a backend failure arrives as an `error` event and the
/// stream ends without `[DONE]`. Dropping the connection stops the run
/// before its next stage.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<TriageRequest>, JsonRejection>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)>
{
    let Json(request) = payload.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;

    let admitted = request
        .admit(&state.registry, state.settings.bucket_interval)
        .map_err(|e| {
            warn!(error = %e, "Rejected triage request");
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    info!(
        model = %request.model_selector,
        logs = request.logs.len(),
        known_issues = request.known_issues.len(),
        "Starting triage stream"
    );

    let agent = DecisionAgent::new(admitted.client, state.settings.base_prompt.clone());
    let orchestrator =
        StreamOrchestrator::with_keyword_evidence(agent, state.settings.top_n, state.logger.clone());
    let (rx, _handle) = orchestrator.spawn(request, admitted.stats);

    let stream = ReceiverStream::new(rx).map(|event| Ok(Event::default().data(event.to_data())));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
