use anyhow::{Context, Result};
use chore_tracker_server::backend::{config::AppConfig, create_router, initialize_backend};
use log::info;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting chore tracker server with database {}", config.database_url);

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.cors_origin)?;

    let listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.http_addr))?;
    info!("Server listening on http://{}", config.http_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
