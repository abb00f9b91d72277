use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tubely::{config::Config, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    tokio::fs::create_dir_all(&config.assets_root)
        .await
        .with_context(|| {
            format!(
                "Failed to create assets directory {}",
                config.assets_root.display()
            )
        })?;

    let port = config.port;
    let state = Arc::new(AppState::new(config).context("Failed to initialize storage")?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind to port {}", port))?;

    info!("Tubely running on http://0.0.0.0:{}", port);
    info!("Endpoints:");
    info!("   POST   /api/users                      - Create an account");
    info!("   POST   /api/login                      - Log in and get a token");
    info!("   POST   /api/videos                     - Create a video");
    info!("   GET    /api/videos                     - List your videos");
    info!("   GET    /api/videos/{{videoID}}           - Get a video");
    info!("   DELETE /api/videos/{{videoID}}           - Delete a video");
    info!("   POST   /api/thumbnail_upload/{{videoID}} - Upload a thumbnail");
    info!("   GET    /assets/{{file}}                  - Stored thumbnails");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
