use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use luminous_backend::api::{cors_layer, router};
use luminous_backend::auth::TokenVerifier;
use luminous_backend::config::AppConfig;
use luminous_backend::gemini::GeminiHttpClient;
use luminous_backend::services::{LessonExpander, LinkChecker, VideoSearch};
use luminous_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "luminous_backend=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let generator = Arc::new(GeminiHttpClient::new(config.gemini.clone())?);
    let mut expander = LessonExpander::new(generator.clone(), config.expander_concurrency);
    if config.verify_resource_links {
        expander = expander.with_link_checker(LinkChecker::new()?);
    }
    info!(
        "model {}, {} expansion workers, link check {}",
        config.gemini.model,
        expander.concurrency(),
        if config.verify_resource_links { "on" } else { "off" }
    );

    let videos = VideoSearch::new(&config.video_base_url)?;

    let state = AppState::new(
        pool,
        generator,
        TokenVerifier::new(&config.auth),
        expander,
        videos,
    );
    let app = router(state).layer(cors_layer(&config.cors_origins));

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
