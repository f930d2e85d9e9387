use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::{create_client, BackendConfig, ModelError, ReasoningClient};

/// Process-wide set of reasoning clients, keyed by model selector.
///
/// Built once at startup and only read afterwards.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    clients: BTreeMap<String, Arc<dyn ReasoningClient>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a client for every configured model
    pub fn from_config<'a>(
        models: impl IntoIterator<Item = (&'a String, &'a BackendConfig)>,
    ) -> Result<Self, ModelError> {
        let mut registry = Self::new();
        for (selector, backend) in models {
            let client = create_client(backend).map_err(|e| {
                ModelError::Config(format!("model '{}': {}", selector, e))
            })?;
            info!(selector = %selector, backend = backend.kind(), "Registered model");
            registry.insert(selector.clone(), client);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, selector: impl Into<String>, client: Arc<dyn ReasoningClient>) {
        self.clients.insert(selector.into(), client);
    }

    pub fn get(&self, selector: &str) -> Option<Arc<dyn ReasoningClient>> {
        self.clients.get(selector).cloned()
    }

    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
