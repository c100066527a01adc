use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::llm::Provider;

pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub provider: Provider,
    pub model: String,
    pub llm_base_url: String,
    /// Pre-seeded key for local testing. Used only when a request omits its own key.
    pub seeded_api_key: Option<String>,
    pub site_url: Option<String>,
    pub site_name: Option<String>,
    pub youtube_base_url: String,
}

// Hand-written so the seeded key never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("llm_base_url", &self.llm_base_url)
            .field("seeded_api_key", &self.seeded_api_key.as_ref().map(|_| "<redacted>"))
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("youtube_base_url", &self.youtube_base_url)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `load` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = non_empty("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let provider = match non_empty("LLM_PROVIDER") {
            Some(name) => name.parse::<Provider>()?,
            None => Provider::default(),
        };
        let model = non_empty("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let llm_base_url =
            non_empty("LLM_BASE_URL").unwrap_or_else(|| provider.default_base_url().to_string());
        let youtube_base_url = non_empty("YOUTUBE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_BASE_URL.to_string());

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            provider,
            model,
            llm_base_url: llm_base_url.trim_end_matches('/').to_string(),
            seeded_api_key: non_empty("SUMMARIZER_API_KEY"),
            site_url: non_empty("SITE_URL"),
            site_name: non_empty("SITE_NAME"),
            youtube_base_url: youtube_base_url.trim_end_matches('/').to_string(),
        })
    }
}
