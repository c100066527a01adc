use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html, Selector};

use super::{Document, DocumentLoader};
use crate::error::Result;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

// Create static selectors to avoid recompiling them each time
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

const BLOCK_TAGS: [&str; 29] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

const CELL_TAGS: [&str; 2] = ["td", "th"];

/// Fetches web pages and keeps their readable text.
#[derive(Debug, Clone)]
pub struct WebArticleLoader {
    client: Client,
}

impl WebArticleLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;
        Ok(html)
    }
}

#[async_trait]
impl DocumentLoader for WebArticleLoader {
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            tracing::info!(%url, "Fetching article");
            let html = self
                .fetch_html(url)
                .await
                .inspect_err(|e| tracing::warn!(%url, error = %e, "Article fetch failed"))?;

            let document = to_document(url, &html);
            tracing::debug!(%url, chars = document.content.len(), "Extracted article text");
            documents.push(document);
        }
        Ok(documents)
    }
}

// Parsed pages are not `Send`, so parsing stays out of the async fn body.
fn to_document(url: &str, html: &str) -> Document {
    let page = Html::parse_document(html);
    let mut document = Document::new(extract_text(&page)).with_metadata("source", url);
    if let Some(title) = extract_title(&page) {
        document = document.with_metadata("title", title);
    }
    document
}

/// Readable text of the page body, or of the whole document when it has none.
pub fn extract_text(document: &Html) -> String {
    let root = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());
    let mut text = String::new();
    collect_text(root, &mut text);
    format_text(&text)
}

pub fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<Vec<_>>().join(" "))
        .map(|title| title.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|title| !title.is_empty())
}

// Blocks get a line break on both sides and cells a trailing space,
// so neighbouring words never run together.
fn collect_text(element: ElementRef<'_>, text: &mut String) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }
    let block = BLOCK_TAGS.contains(&name);
    if block {
        text.push('\n');
    }
    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            collect_text(child, text);
        } else if let Some(fragment) = child.value().as_text() {
            text.push_str(fragment);
        }
    }
    if block {
        text.push('\n');
    } else if CELL_TAGS.contains(&name) {
        text.push(' ');
    }
}

/// Collapses whitespace inside lines and drops empty ones.
pub fn format_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&collapsed);
    }

    result
}
