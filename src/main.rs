use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vibe_captioner::{app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vibe_captioner=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("Cannot load configuration")?;
    let router = app(AppState::from_config(&config), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Cannot bind {}", config.bind_addr))?;

    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}
