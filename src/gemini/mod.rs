pub mod dto;
pub mod schema;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::GeminiConfig;
use crate::error::AppError;

/// Opaque completion service: ordered prompt segments plus an optional
/// structured-output schema in, raw response text out.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &[String], schema: Option<&Value>) -> Result<String, AppError>;
}

pub struct GeminiHttpClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiHttpClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationClient for GeminiHttpClient {
    async fn generate(&self, prompt: &[String], schema: Option<&Value>) -> Result<String, AppError> {
        let request_body = dto::GenerateContentRequest {
            contents: vec![dto::Content {
                role: Some("user".to_string()),
                parts: prompt
                    .iter()
                    .map(|text| dto::Part { text: text.clone() })
                    .collect(),
            }],
            generation_config: Some(dto::GenerationConfig {
                response_mime_type: if schema.is_some() {
                    "application/json".to_string()
                } else {
                    "text/plain".to_string()
                },
                response_schema: schema.cloned(),
            }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!("Gemini API error {}: {}", status, body)));
        }

        let parsed: dto::GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse Gemini response: {}", e)))?;

        let candidate = parsed.candidates.into_iter().next().ok_or_else(|| {
            AppError::Generation(format!(
                "Gemini returned no candidates (feedback: {})",
                parsed.prompt_feedback.unwrap_or(Value::Null)
            ))
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AppError::Generation(format!(
                "Gemini returned an empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        tracing::debug!("Gemini returned {} bytes", text.len());
        Ok(text)
    }
}

/// Deserializes generator output, tolerating a surrounding markdown
/// code fence.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T, AppError> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| AppError::Generation(format!("Failed to parse generated JSON: {}", e)))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // opening line may carry a language tag such as ```json
    match rest.find('\n') {
        Some(i) if !rest[..i].contains(['{', '[']) => rest[i + 1..].trim(),
        _ => rest.trim(),
    }
}
