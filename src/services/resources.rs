use std::sync::LazyLock;
use std::time::Duration;

use futures::future::join_all;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::error::AppError;
use crate::models::Resource;
use crate::models::coerce::value_to_text;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'`]+"#).expect("url pattern compiles"));

const LABEL_KEYS: [&str; 4] = ["text", "title", "name", "label"];
const URL_KEYS: [&str; 3] = ["url", "link", "href"];

/// Normalizes heterogeneous resource entries (objects, free strings)
/// into [`Resource`]s owned by `unit_title`. Entries without an
/// http(s) URL are dropped; order is preserved.
pub fn extract_resources(raw: &[Value], unit_title: &str) -> Vec<Resource> {
    raw.iter()
        .filter_map(|entry| extract_one(entry, unit_title))
        .collect()
}

fn extract_one(entry: &Value, unit_title: &str) -> Option<Resource> {
    match entry {
        Value::Object(map) => {
            let url = URL_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|v| first_url(&value_to_text(v)))
                .or_else(|| first_url(&value_to_text(entry)))?;
            let text = LABEL_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .map(|v| value_to_text(v).trim().to_string())
                .find(|label| !label.is_empty() && label != &url)
                .unwrap_or_else(|| url.clone());
            Some(Resource {
                unit_title: unit_title.to_string(),
                text,
                url,
            })
        }
        other => resource_from_line(&value_to_text(other), unit_title),
    }
}

fn resource_from_line(line: &str, unit_title: &str) -> Option<Resource> {
    let found = URL_PATTERN.find(line)?;
    let url = trim_url(found.as_str());
    if url.len() <= "https://".len() {
        return None;
    }

    let mut label = String::with_capacity(line.len());
    label.push_str(&line[..found.start()]);
    label.push(' ');
    label.push_str(&line[found.end()..]);
    let label = label
        .replace("()", "")
        .replace("<>", "")
        .trim_matches(|c: char| c.is_whitespace() || "-*•·:–—|[]()".contains(c))
        .to_string();

    Some(Resource {
        unit_title: unit_title.to_string(),
        text: if label.is_empty() { url.clone() } else { label },
        url,
    })
}

fn first_url(text: &str) -> Option<String> {
    URL_PATTERN
        .find(text)
        .map(|m| trim_url(m.as_str()))
        .filter(|url| url.len() > "https://".len())
}

fn trim_url(raw: &str) -> String {
    let mut url = raw;
    loop {
        let Some(last) = url.chars().last() else { break };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | ']' | '}' | '\'' | '"' => true,
            ')' => url.matches('(').count() < url.matches(')').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url.to_string()
}

/// Scans free text for an "Additional Resources" section and collects
/// the URLs listed under it, up to the first blank line after an entry.
pub fn resources_from_text(text: &str, unit_title: &str) -> Vec<Resource> {
    let mut resources = Vec::new();
    let mut inside = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if !inside {
            let heading = trimmed
                .trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace())
                .to_lowercase();
            inside = heading.starts_with("additional resources");
            continue;
        }
        if trimmed.is_empty() {
            if resources.is_empty() {
                continue;
            }
            break;
        }
        if let Some(resource) = resource_from_line(trimmed, unit_title) {
            resources.push(resource);
        }
    }

    resources
}

#[derive(Clone)]
pub struct LinkChecker {
    client: Client,
}

impl LinkChecker {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client })
    }

    /// HEAD first; servers that reject HEAD get a GET. Live iff the
    /// final status is below 400.
    pub async fn is_live(&self, url: &str) -> bool {
        let head = self
            .client
            .head(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await;
        match head {
            Ok(response) if response.status().as_u16() < 400 => true,
            Ok(_) => match self
                .client
                .get(url)
                .timeout(Duration::from_secs(8))
                .send()
                .await
            {
                Ok(response) => response.status().as_u16() < 400,
                Err(_) => false,
            },
            Err(e) => {
                tracing::debug!("link check failed for {}: {}", url, e);
                false
            }
        }
    }

    pub async fn retain_live(&self, resources: Vec<Resource>) -> Vec<Resource> {
        let checks = join_all(resources.iter().map(|r| self.is_live(&r.url))).await;
        resources
            .into_iter()
            .zip(checks)
            .filter_map(|(resource, live)| live.then_some(resource))
            .collect()
    }
}
