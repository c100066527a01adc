use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::loader::LoaderKind;
use crate::summarize::Summary;

/// Form contents sent by the page. No `Debug`: it carries the API key.
#[derive(Deserialize)]
pub struct SummarizeRequest {
    /// Absent means "use the server's pre-seeded key", if any.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub url: String,
    pub summary: String,
    pub loader: LoaderKind,
    pub title: Option<String>,
    pub word_count: usize,
    pub summarized_at: DateTime<Utc>,
}

impl From<Summary> for SummarizeResponse {
    fn from(summary: Summary) -> Self {
        Self {
            url: summary.source_url,
            summary: summary.text,
            loader: summary.loader,
            title: summary.title,
            word_count: summary.word_count,
            summarized_at: Utc::now(),
        }
    }
}
