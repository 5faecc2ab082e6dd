use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_content_type() -> String {
    "lesson".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub max_results: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichContentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub max_results: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoList {
    pub videos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub query: String,
    pub count: usize,
}

impl VideoList {
    pub fn new(videos: Vec<String>, query: String, title: Option<String>) -> Self {
        Self {
            count: videos.len(),
            videos,
            title,
            query,
        }
    }
}
