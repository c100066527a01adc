pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod loader;
pub mod logging;
pub mod summarize;
pub mod validate;

use std::sync::Arc;

use reqwest::{Client, ClientBuilder};

use config::Config;
use error::{AppError, Result};
use llm::ProviderBackend;
use loader::{Loaders, WebArticleLoader, YoutubeLoader};
use summarize::SummaryPipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: SummaryPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: SummaryPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// Wires the real loaders and the configured provider around one HTTP client.
    pub fn from_config(config: Config) -> Result<Self> {
        // One client for every outbound call so connections are reused
        let client: Client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let loaders = Loaders::new(
            Arc::new(YoutubeLoader::new(client.clone()).with_base_url(&config.youtube_base_url)),
            Arc::new(WebArticleLoader::new(client.clone())),
        );
        let backend = Arc::new(ProviderBackend::from_config(client, &config));

        Ok(Self::new(config, SummaryPipeline::new(loaders, backend)))
    }
}
