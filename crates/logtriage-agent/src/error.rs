use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Reasoning backend error: {0}")]
    Backend(#[from] logtriage_model::ModelError),

    #[error("Failed to encode prompt context: {0}")]
    Encode(#[from] serde_json::Error),
}
