use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::api::models::{SummarizeRequest, SummarizeResponse};
use crate::api::{page, response};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/health", get(health_handler))
        .route("/api/summarize", post(summarize_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected malformed request body");
            return AppError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    let api_key = req
        .api_key
        .or_else(|| state.config.seeded_api_key.clone())
        .unwrap_or_default();

    let start_time = std::time::Instant::now();
    let result = state.pipeline.run(&api_key, &req.url).await;
    tracing::info!(elapsed = ?start_time.elapsed(), ok = result.is_ok(), "Request processed");

    match result {
        Ok(summary) => response::success(SummarizeResponse::from(summary)).into_response(),
        Err(err) => err.into_response(),
    }
}
