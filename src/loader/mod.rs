pub mod web;
pub mod youtube;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub use web::WebArticleLoader;
pub use youtube::YoutubeLoader;

/// Substring that routes a URL to the video transcript loader.
pub const VIDEO_HOST_MARKER: &str = "youtube.com";

/// Fetched text plus whatever the loader learned about its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").map(String::as_str)
    }
}

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderKind {
    Video,
    Article,
}

impl LoaderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LoaderKind::Video => "video",
            LoaderKind::Article => "article",
        }
    }
}

/// Which loader a URL goes to, together with the URLs it will fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderChoice {
    Video { url: String },
    Article { urls: Vec<String> },
}

impl LoaderChoice {
    pub fn kind(&self) -> LoaderKind {
        match self {
            LoaderChoice::Video { .. } => LoaderKind::Video,
            LoaderChoice::Article { .. } => LoaderKind::Article,
        }
    }

    pub fn fetch_set(&self) -> &[String] {
        match self {
            LoaderChoice::Video { url } => std::slice::from_ref(url),
            LoaderChoice::Article { urls } => urls,
        }
    }
}

/// Plain substring test on the whole URL, so a query parameter mentioning
/// the video host also picks the video loader and short links do not.
pub fn select_loader(url: &str) -> LoaderChoice {
    if url.contains(VIDEO_HOST_MARKER) {
        LoaderChoice::Video { url: url.to_string() }
    } else {
        LoaderChoice::Article { urls: vec![url.to_string()] }
    }
}

/// The two loader implementations a run can be routed to.
#[derive(Clone)]
pub struct Loaders {
    pub video: Arc<dyn DocumentLoader>,
    pub article: Arc<dyn DocumentLoader>,
}

impl Loaders {
    pub fn new(video: Arc<dyn DocumentLoader>, article: Arc<dyn DocumentLoader>) -> Self {
        Self { video, article }
    }

    pub fn for_choice(&self, choice: &LoaderChoice) -> &dyn DocumentLoader {
        match choice {
            LoaderChoice::Video { .. } => self.video.as_ref(),
            LoaderChoice::Article { .. } => self.article.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_url_selects_video_loader() {
        let choice = select_loader("https://www.youtube.com/watch?v=abc");
        assert_eq!(choice.kind(), LoaderKind::Video);
        assert_eq!(choice.fetch_set(), ["https://www.youtube.com/watch?v=abc".to_string()]);
    }

    #[test]
    fn marker_anywhere_in_url_selects_video_loader() {
        for url in [
            "https://example.com/?ref=youtube.com",
            "https://blog.example.org/posts/why-i-left-youtube.com-for-good",
            "https://m.youtube.com/shorts/xyz",
        ] {
            assert_eq!(select_loader(url).kind(), LoaderKind::Video, "{url}");
        }
    }

    #[test]
    fn other_urls_select_article_loader_with_one_url() {
        for url in [
            "https://example.com",
            "https://youtu.be/abc",
            "https://vimeo.com/12345",
            "https://www.YouTube.com/watch?v=abc",
        ] {
            let choice = select_loader(url);
            assert_eq!(choice.kind(), LoaderKind::Article, "{url}");
            assert_eq!(choice.fetch_set().len(), 1);
            assert_eq!(choice.fetch_set()[0], url);
        }
    }

    #[test]
    fn document_title_comes_from_metadata() {
        let doc = Document::new("body").with_metadata("title", "A title");
        assert_eq!(doc.title(), Some("A title"));
        assert_eq!(Document::new("body").title(), None);
    }
}
