use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to initialize LLM client: {0}")]
    LlmInit(String),

    #[error("Failed to load content: {0}")]
    Load(String),

    #[error("Summarization failed: {0}")]
    Summarize(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Short machine-readable name, surfaced to the page next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::LlmInit(_) => "llm_init",
            AppError::Load(_) => "load",
            AppError::Summarize(_) => "summarize",
            AppError::Config(_) => "config",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::LlmInit(_) => StatusCode::UNAUTHORIZED,
            AppError::Load(_) => StatusCode::BAD_GATEWAY,
            AppError::Summarize(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error::<()>(&self).into_response()
    }
}

// Bare conversions only happen on the fetch side; the completion client maps
// its own reqwest failures to `Summarize`.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Load(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
