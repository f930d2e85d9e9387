use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub selector: String,
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// `GET /api/models` - configured model selectors
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = state
        .registry
        .selectors()
        .filter_map(|selector| {
            state.registry.get(selector).map(|client| ModelInfo {
                selector: selector.to_string(),
                backend: client.name().to_string(),
            })
        })
        .collect();
    Json(ModelsResponse { models })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models: usize,
}

/// `GET /api/health` - liveness
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        models: state.registry.len(),
    })
}
