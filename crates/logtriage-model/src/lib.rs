mod local;
mod openai;
mod output;
mod registry;
mod spawner;
mod traits;

pub use local::LocalModelClient;
pub use openai::OpenAiClient;
pub use output::ProcessOutput;
pub use registry::ModelRegistry;
pub use spawner::ProcessSpawner;
pub use traits::{
    BackendConfig, LocalModelConfig, ModelError, OpenAiConfig, ReasoningClient,
};

use std::sync::Arc;

/// Create a reasoning client for a configured backend
pub fn create_client(config: &BackendConfig) -> Result<Arc<dyn ReasoningClient>, ModelError> {
    match config {
        BackendConfig::OpenAi(cfg) => Ok(Arc::new(OpenAiClient::new(cfg.clone())?)),
        BackendConfig::Local(cfg) => Ok(Arc::new(LocalModelClient::new(cfg.clone()))),
    }
}
