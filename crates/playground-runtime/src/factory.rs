//! Factory for [`HttpEngine`] handles.

use std::sync::Arc;

use async_trait::async_trait;
use playground_core::{EngineError, EngineFactory, InferenceEngine};
use reqwest::Client;
use tracing::debug;

use crate::config::EngineEndpoint;
use crate::engine::{HttpEngine, fetch_model_ids};

/// Creates engine handles that share one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct HttpEngineFactory {
    client: Client,
    endpoint: EngineEndpoint,
}

impl HttpEngineFactory {
    /// Build a factory for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the HTTP client cannot be built.
    pub fn new(endpoint: EngineEndpoint) -> Result<Self, EngineError> {
        let client = Client::builder()
            .connect_timeout(endpoint.connect_timeout())
            .build()
            .map_err(|e| EngineError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    pub const fn endpoint(&self) -> &EngineEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl EngineFactory for HttpEngineFactory {
    fn create_engine(&self) -> Arc<dyn InferenceEngine> {
        debug!(endpoint = %self.endpoint, "Creating engine handle");
        Arc::new(HttpEngine::new(self.client.clone(), self.endpoint.clone()))
    }

    async fn list_available_models(&self) -> Result<Vec<String>, EngineError> {
        let ids = fetch_model_ids(&self.client, &self.endpoint).await?;
        debug!(count = ids.len(), "Listed engine models");
        Ok(ids)
    }
}
