//! Transcript loader for YouTube videos.
//!
//! Reads the caption track list out of the watch page's embedded player
//! response, downloads one track in the `json3` timed-text format and keeps
//! the video details (title, author, description, length, views, publish
//! date, thumbnail) as metadata.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use serde_json::Value;
use url::Url;

use super::web::BROWSER_USER_AGENT;
use super::{Document, DocumentLoader};
use crate::config::DEFAULT_YOUTUBE_BASE_URL;
use crate::error::{AppError, Result};

static PLAYER_RESPONSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)ytInitialPlayerResponse\s*=\s*(\{.+?\})\s*;\s*(?:var\s|</script>)")
        .expect("Failed to compile player response pattern")
});

const PREFERRED_LANGUAGE: &str = "en";
const ID_PATH_PREFIXES: [&str; 4] = ["embed", "shorts", "live", "v"];

#[derive(Debug, Clone)]
pub struct YoutubeLoader {
    client: Client,
    base_url: String,
}

impl YoutubeLoader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_YOUTUBE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }

    async fn load_video(&self, url: &str) -> Result<Document> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| AppError::Load(format!("Could not determine YouTube video id from {}", url)))?;

        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        tracing::info!(%video_id, "Fetching YouTube watch page");
        let page = self.get_text(&watch_url).await?;
        let player = parse_player_response(&page)?;

        if let Some(status) = player.pointer("/playabilityStatus/status").and_then(Value::as_str) {
            if status != "OK" {
                let reason = player
                    .pointer("/playabilityStatus/reason")
                    .and_then(Value::as_str)
                    .unwrap_or("no reason given");
                return Err(AppError::Load(format!("Video {} is not playable: {}", video_id, reason)));
            }
        }

        let track_url = pick_caption_track(&player)
            .ok_or_else(|| AppError::Load(format!("No English transcript available for video {}", video_id)))?;
        let track_url = json3_track_url(&self.base_url, track_url)?;

        tracing::debug!(%video_id, "Fetching caption track");
        let raw_track = self.get_text(track_url.as_str()).await?;
        let track: Value = serde_json::from_str(&raw_track)
            .map_err(|e| AppError::Load(format!("Failed to parse transcript: {}", e)))?;

        let content = transcript_from_json3(&track);
        if content.is_empty() {
            return Err(AppError::Load(format!("Transcript for video {} is empty", video_id)));
        }

        let mut document = Document::new(content)
            .with_metadata("source", url)
            .with_metadata("video_id", video_id);
        for (key, value) in video_info(&player) {
            document = document.with_metadata(key, value);
        }
        Ok(document)
    }
}

#[async_trait]
impl DocumentLoader for YoutubeLoader {
    async fn load(&self, urls: &[String]) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            let document = self
                .load_video(url)
                .await
                .inspect_err(|e| tracing::warn!(%url, error = %e, "Transcript load failed"))?;
            documents.push(document);
        }
        Ok(documents)
    }
}

/// Video id from `watch?v=`, or from `/embed/`, `/shorts/`, `/live/` and `/v/` paths.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !is_youtube_host(parsed.host_str()?) {
        return None;
    }

    let from_query = || {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    };
    let from_path = || {
        let mut segments = parsed.path_segments()?;
        let prefix = segments.next()?;
        if !ID_PATH_PREFIXES.contains(&prefix) {
            return None;
        }
        segments.next().map(str::to_string)
    };

    let id = if parsed.path().starts_with("/watch") {
        from_query()
    } else {
        from_path()
    }?;

    let id = id.trim();
    let well_formed = !id.is_empty()
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    well_formed.then(|| id.to_string())
}

/// `youtube.com` itself or any of its subdomains (www, m, music, ...).
fn is_youtube_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "youtube.com" || host.ends_with(".youtube.com")
}

fn parse_player_response(page: &str) -> Result<Value> {
    let captures = PLAYER_RESPONSE_RE
        .captures(page)
        .ok_or_else(|| AppError::Load("Player response not found in watch page".to_string()))?;
    serde_json::from_str(&captures[1])
        .map_err(|e| AppError::Load(format!("Failed to parse player response: {}", e)))
}

/// Manually created English track first, then the auto-generated one. No English, no track.
fn pick_caption_track(player: &Value) -> Option<&str> {
    let tracks = player
        .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")?
        .as_array()?;
    let english = |track: &&Value| track["languageCode"].as_str() == Some(PREFERRED_LANGUAGE);
    let generated = |track: &&Value| track["kind"].as_str() == Some("asr");

    tracks
        .iter()
        .filter(english)
        .find(|track| !generated(track))
        .or_else(|| tracks.iter().find(english))
        .and_then(|track| track["baseUrl"].as_str())
}

/// Video details kept as document metadata, when the player response has them.
fn video_info(player: &Value) -> Vec<(&'static str, String)> {
    let mut info = Vec::new();
    for (key, pointer) in [
        ("title", "/videoDetails/title"),
        ("author", "/videoDetails/author"),
        ("description", "/videoDetails/shortDescription"),
        ("length_seconds", "/videoDetails/lengthSeconds"),
        ("view_count", "/videoDetails/viewCount"),
        ("publish_date", "/microformat/playerMicroformatRenderer/publishDate"),
    ] {
        if let Some(value) = player.pointer(pointer).and_then(Value::as_str) {
            info.push((key, value.to_string()));
        }
    }

    // Thumbnails are listed smallest first
    let thumbnail = player
        .pointer("/videoDetails/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbnails| thumbnails.last())
        .and_then(|thumbnail| thumbnail["url"].as_str());
    if let Some(url) = thumbnail {
        info.push(("thumbnail_url", url.to_string()));
    }
    info
}

fn json3_track_url(base_url: &str, track_url: &str) -> Result<Url> {
    let base = Url::parse(base_url)
        .map_err(|e| AppError::Load(format!("Invalid YouTube base URL: {}", e)))?;
    let mut url = base
        .join(track_url)
        .map_err(|e| AppError::Load(format!("Invalid caption track URL: {}", e)))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");
    Ok(url)
}

fn transcript_from_json3(track: &Value) -> String {
    let Some(events) = track["events"].as_array() else {
        return String::new();
    };
    events
        .iter()
        .filter_map(|event| event["segs"].as_array())
        .map(|segs| {
            segs.iter()
                .filter_map(|seg| seg["utf8"].as_str())
                .collect::<String>()
        })
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_from_watch_and_path_urls() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Some("dQw4w9WgXcQ")),
            ("https://youtube.com/watch?feature=share&v=abc_-1", Some("abc_-1")),
            ("https://www.youtube.com/embed/XYZ123", Some("XYZ123")),
            ("https://m.youtube.com/shorts/short1", Some("short1")),
            ("https://www.youtube.com/live/live42?si=x", Some("live42")),
            ("https://www.youtube.com/", None),
            ("https://www.youtube.com/watch", None),
            ("https://www.youtube.com/channel/UCxyz", None),
            ("https://example.com/?ref=youtube.com", None),
            ("https://www.youtube.com/watch?v=bad%20id", None),
            ("https://music.youtube.com/watch?v=song1", Some("song1")),
            ("https://example.com/watch?v=dQw4w9WgXcQ&ref=youtube.com", None),
            ("https://evil.example/embed/dQw4w9WgXcQ?from=youtube.com", None),
            ("https://notyoutube.com/watch?v=dQw4w9WgXcQ", None),
        ];
        for (url, expected) in cases {
            assert_eq!(extract_video_id(url).as_deref(), expected, "{url}");
        }
    }

    #[test]
    fn player_response_is_found_before_next_statement() {
        let page = r#"<script>var ytInitialPlayerResponse = {"a":{"b":"};"},"c":1};var meta = {};</script>"#;
        let player = parse_player_response(page).unwrap();
        assert_eq!(player["c"], 1);

        let page = r#"<script>ytInitialPlayerResponse = {"x":true};</script>"#;
        assert_eq!(parse_player_response(page).unwrap()["x"], true);

        assert!(matches!(parse_player_response("<html></html>"), Err(AppError::Load(_))));
    }

    #[test]
    fn manual_english_track_beats_generated_one() {
        let player = serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"languageCode": "de", "baseUrl": "https://yt/de"},
                {"languageCode": "en", "kind": "asr", "baseUrl": "https://yt/en-auto"},
                {"languageCode": "en", "baseUrl": "https://yt/en"}
            ]}}
        });
        assert_eq!(pick_caption_track(&player), Some("https://yt/en"));
    }

    #[test]
    fn generated_english_track_is_the_fallback() {
        let player = serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"languageCode": "fr", "baseUrl": "https://yt/fr"},
                {"languageCode": "en", "kind": "asr", "baseUrl": "https://yt/en-auto"}
            ]}}
        });
        assert_eq!(pick_caption_track(&player), Some("https://yt/en-auto"));
    }

    #[test]
    fn no_english_track_means_no_transcript() {
        let player = serde_json::json!({
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"languageCode": "fr", "baseUrl": "https://yt/fr"},
                {"languageCode": "en-GB", "baseUrl": "https://yt/en-gb"}
            ]}}
        });
        assert_eq!(pick_caption_track(&player), None);
        assert_eq!(pick_caption_track(&serde_json::json!({})), None);
    }

    #[test]
    fn video_info_collects_details_and_largest_thumbnail() {
        let player = serde_json::json!({
            "videoDetails": {
                "title": "A talk",
                "author": "A channel",
                "shortDescription": "What the talk is about",
                "lengthSeconds": "600",
                "thumbnail": {"thumbnails": [
                    {"url": "https://i.ytimg.com/small.jpg", "width": 120},
                    {"url": "https://i.ytimg.com/large.jpg", "width": 1280}
                ]}
            },
            "microformat": {"playerMicroformatRenderer": {"publishDate": "2024-05-01"}}
        });
        let info: std::collections::HashMap<_, _> = video_info(&player).into_iter().collect();

        assert_eq!(info["title"], "A talk");
        assert_eq!(info["author"], "A channel");
        assert_eq!(info["description"], "What the talk is about");
        assert_eq!(info["length_seconds"], "600");
        assert_eq!(info["publish_date"], "2024-05-01");
        assert_eq!(info["thumbnail_url"], "https://i.ytimg.com/large.jpg");
        assert!(!info.contains_key("view_count"));
    }

    #[test]
    fn track_url_is_rewritten_to_json3() {
        let url = json3_track_url("https://www.youtube.com", "/api/timedtext?v=abc&fmt=srv3&lang=en").unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/api/timedtext?v=abc&lang=en&fmt=json3");

        let url = json3_track_url("https://www.youtube.com", "https://other.example/tt?v=1").unwrap();
        assert_eq!(url.as_str(), "https://other.example/tt?v=1&fmt=json3");
    }

    #[test]
    fn json3_segments_join_into_text() {
        let track = serde_json::json!({"events": [
            {"tStartMs": 0},
            {"segs": [{"utf8": "hello"}, {"utf8": " "}, {"utf8": "world"}]},
            {"segs": [{"utf8": "\n"}]},
            {"segs": [{"utf8": "again\nand again"}]}
        ]});
        assert_eq!(transcript_from_json3(&track), "hello world again and again");
        assert_eq!(transcript_from_json3(&serde_json::json!({})), "");
    }
}
