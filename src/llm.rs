use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Anything that can answer a system + user chat turn with text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Builds a [`ChatCompletion`] for one run from the caller's API key.
pub trait CompletionBackend: Send + Sync {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn ChatCompletion>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Featherless,
    OpenRouter,
    OpenAi,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::Featherless => "https://api.featherless.ai/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Featherless => "featherless-ai/summarizer",
            Provider::OpenRouter => "deepseek/deepseek-chat-v3-0324",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Featherless => "Featherless",
            Provider::OpenRouter => "OpenRouter",
            Provider::OpenAi => "OpenAI",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "featherless" => Ok(Provider::Featherless),
            "openrouter" => Ok(Provider::OpenRouter),
            "openai" => Ok(Provider::OpenAi),
            other => Err(AppError::Config(format!("Unknown LLM provider: {}", other))),
        }
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Connection settings shared by every run; the key arrives per request.
#[derive(Debug, Clone)]
pub struct ProviderBackend {
    http: Client,
    provider: Provider,
    model: String,
    base_url: String,
    site_url: Option<String>,
    site_name: Option<String>,
}

impl ProviderBackend {
    pub fn new(http: Client, provider: Provider, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            provider,
            model: model.into(),
            base_url: base_url.into(),
            site_url: None,
            site_name: None,
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        let mut backend = Self::new(http, config.provider, &config.model, &config.llm_base_url);
        backend.site_url = config.site_url.clone();
        backend.site_name = config.site_name.clone();
        backend
    }
}

impl CompletionBackend for ProviderBackend {
    fn connect(&self, api_key: &str) -> Result<Arc<dyn ChatCompletion>> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::LlmInit(format!("missing {} API key", self.provider)));
        }
        // A key that cannot travel in a header is a construction failure, not a send failure.
        if HeaderValue::from_str(&format!("Bearer {}", api_key)).is_err() {
            return Err(AppError::LlmInit(format!(
                "{} API key contains characters that cannot be sent in a request header",
                self.provider
            )));
        }

        Ok(Arc::new(OpenAiCompatibleClient {
            http: self.http.clone(),
            provider: self.provider,
            api_key: api_key.to_string(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            site_url: self.site_url.clone(),
            site_name: self.site_name.clone(),
        }))
    }
}

/// Chat client for the OpenAI-style `/chat/completions` endpoint every supported provider exposes.
pub struct OpenAiCompatibleClient {
    http: Client,
    provider: Provider,
    api_key: String,
    model: String,
    base_url: String,
    site_url: Option<String>,
    site_name: Option<String>,
}

#[async_trait]
impl ChatCompletion for OpenAiCompatibleClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system_prompt },
                Message { role: "user", content: user_prompt },
            ],
        };

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        // Attribution headers are an OpenRouter convention
        if self.provider == Provider::OpenRouter {
            if let Some(url) = &self.site_url {
                request = request.header("HTTP-Referer", url);
            }
            if let Some(name) = &self.site_name {
                request = request.header("X-Title", name);
            }
        }

        tracing::debug!(provider = %self.provider, model = %self.model, "Sending chat completion request");
        let res = request
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))
            .map_err(|e| AppError::Summarize(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().await.unwrap_or_default();
            return Err(AppError::Summarize(format!(
                "{} API error: {} - {}",
                self.provider, status, message
            )));
        }

        let response: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::Summarize(format!("Invalid response format from LLM: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Summarize("No content in LLM response".to_string()))
    }
}
