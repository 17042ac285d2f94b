pub mod image_client;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::GeminiConfig,
    credentials::{ApiKeyProvider, EnvKeyProvider, StaticKeyProvider},
    error::Result,
    models::{ImageGenerationRequest, ImageGenerationResponse},
};

pub use image_client::ImageClient;

/// The sole network boundary. One call is one attempt against the remote
/// generation service; retry lives above this trait, in the executor.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &ImageGenerationRequest) -> Result<ImageGenerationResponse>;
}

#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let key_provider: Arc<dyn ApiKeyProvider> = match &config.api_key {
            Some(key) => Arc::new(StaticKeyProvider::new(key.clone())),
            None => Arc::new(EnvKeyProvider),
        };
        Self::with_key_provider(config, key_provider)
    }

    /// Swap in a custom credential source, e.g. one backed by a key vault or
    /// a test fixture. The provider is consulted on every request.
    pub fn with_key_provider(config: GeminiConfig, key_provider: Arc<dyn ApiKeyProvider>) -> Self {
        Self {
            image_client: ImageClient::new(config, key_provider),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
