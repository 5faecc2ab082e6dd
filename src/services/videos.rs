//! Related-video lookup against the YouTube results page.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::services::resources::LinkChecker;

pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const MAX_RESULTS: usize = 10;

const MAX_DURATION_SECS: u64 = 30 * 60;
// "Type: video" search filter.
const VIDEO_FILTER: &str = "EgIQAQ==";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

static RENDERER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""videoRenderer":\{"videoId":"([\w-]{11})""#).expect("renderer pattern compiles")
});
static LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""lengthText":\{.*?"simpleText":"(\d+(?::\d{2}){1,2})""#).expect("length pattern compiles")
});

/// `max_results` as sent by the frontend: a number or numeric string,
/// clamped to `1..=10`. Anything unreadable falls back to the default.
pub fn clamp_max_results(value: Option<&Value>) -> usize {
    let requested = match value {
        None => Some(DEFAULT_MAX_RESULTS as i64),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    match requested {
        Some(n) => n.clamp(1, MAX_RESULTS as i64) as usize,
        None => DEFAULT_MAX_RESULTS,
    }
}

/// `"4:59"` or `"1:02:03"` to seconds.
pub fn parse_duration(text: &str) -> Option<u64> {
    text.split(':')
        .try_fold(0u64, |total, part| Some(total * 60 + part.parse::<u64>().ok()?))
}

/// Video ids from a results page, in page order and without repeats.
/// Live streams (no length) and videos over 30 minutes are skipped.
pub fn video_ids(html: &str) -> Vec<String> {
    let renderers: Vec<(usize, &str)> = RENDERER
        .captures_iter(html)
        .filter_map(|c| Some((c.get(0)?.start(), c.get(1)?.as_str())))
        .collect();

    let mut ids: Vec<String> = Vec::new();
    for (i, (start, id)) in renderers.iter().enumerate() {
        let end = renderers.get(i + 1).map_or(html.len(), |(next, _)| *next);
        let short_enough = LENGTH
            .captures(&html[*start..end])
            .and_then(|c| parse_duration(c.get(1)?.as_str()))
            .is_some_and(|secs| secs <= MAX_DURATION_SECS);
        if short_enough && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[derive(Clone)]
pub struct VideoSearch {
    client: Client,
    base_url: String,
    checker: LinkChecker,
}

impl VideoSearch {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            checker: LinkChecker::new()?,
        })
    }

    pub fn watch_url(&self, id: &str) -> String {
        format!("{}/watch?v={}", self.base_url, id)
    }

    /// Up to `max_results` reachable watch URLs for `query`. Upstream
    /// failures yield an empty list.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let html = match self.fetch_results(query).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Video search for '{}' failed: {}", query, e);
                return Vec::new();
            }
        };

        let mut videos = Vec::with_capacity(max_results);
        for id in video_ids(&html).into_iter().take(max_results * 2) {
            if videos.len() >= max_results {
                break;
            }
            let url = self.watch_url(&id);
            if self.checker.is_live(&url).await {
                videos.push(url);
            }
        }

        info!("Found {} videos for '{}'", videos.len(), query);
        videos
    }

    async fn fetch_results(&self, query: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &format!("{}/results", self.base_url),
            &[("search_query", query), ("sp", VIDEO_FILTER)],
        )
        .map_err(|e| AppError::Generation(format!("Invalid search url: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Generation(format!("Search request failed: {}", e)))?;

        response
            .text()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to read search page: {}", e)))
    }
}
