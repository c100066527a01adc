use axum::{extract::State, response::Html};

use crate::AppState;

const INDEX_TEMPLATE: &str = include_str!("../../static/index.html");

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(
        state.config.provider.display_name(),
        state.config.seeded_api_key.is_some(),
    ))
}

/// Fills the page placeholders. The seeded key itself never reaches the page.
pub fn render_index(provider: &str, has_seeded_key: bool) -> String {
    let placeholder = if has_seeded_key {
        "Leave blank to use the server's key"
    } else {
        "Enter your API key"
    };
    INDEX_TEMPLATE
        .replace("{{provider}}", provider)
        .replace("{{key_placeholder}}", placeholder)
        .replace("{{seeded_key}}", if has_seeded_key { "true" } else { "false" })
}
