use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::services::expander::DEFAULT_CONCURRENCY;
use crate::services::videos;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub audience: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub gemini: GeminiConfig,
    pub auth: AuthConfig,
    pub expander_concurrency: usize,
    pub verify_resource_links: bool,
    pub video_base_url: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = optional("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://luminous.db?mode=rwc".to_string());
        let bind_addr = parsed("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8080)))?;

        let gemini = GeminiConfig {
            api_key: required("GEMINI_API_KEY")?,
            model: optional("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            base_url: optional("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            timeout_secs: parsed("GEMINI_TIMEOUT_SECS", 120)?,
        };

        let auth = AuthConfig {
            jwt_secret: required("JWT_SECRET")?,
            audience: optional("JWT_AUDIENCE"),
        };

        let expander_concurrency = parsed::<usize>("EXPANDER_CONCURRENCY", DEFAULT_CONCURRENCY)?.max(1);
        let verify_resource_links = parsed("VERIFY_RESOURCE_LINKS", false)?;
        let video_base_url =
            optional("YOUTUBE_BASE_URL").unwrap_or_else(|| videos::DEFAULT_BASE_URL.to_string());

        let cors_origins = optional("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            gemini,
            auth,
            expander_concurrency,
            verify_resource_links,
            video_base_url,
            cors_origins,
        })
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
