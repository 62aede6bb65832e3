use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use artlens::ArtService;
use artlens::config::{Config, SessionBackend};
use artlens::handlers::{AppState, router};
use artlens::redis::RedisManager;
use artlens::session::{MemorySessionStore, RedisSessionStore, SessionStore};
use artlens::uploads::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration; refuse to start without usable credentials
    let config = Arc::new(Config::load());
    config.validate().context("Invalid configuration")?;

    let service = Arc::new(ArtService::new(&config)?);

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Memory => {
            tracing::info!("main: Using in-memory session store");
            Arc::new(MemorySessionStore::new(config.session.ttl_seconds))
        }
        SessionBackend::Redis => {
            let redis = Arc::new(RedisManager::new_with_config(&config).await?);
            Arc::new(RedisSessionStore::new(redis, config.session.ttl_seconds))
        }
    };

    let uploads = Arc::new(UploadStore::new(
        config.server.uploads_dir.clone(),
        &config.server.uploads_url_prefix,
        config.server.max_upload_bytes,
    ));
    uploads.ensure_dir().await?;

    let state = AppState {
        service,
        sessions,
        uploads,
        cookie_name: config.session.cookie_name.clone(),
    };
    let app = router(
        state,
        &config.server.uploads_url_prefix,
        config.server.max_upload_bytes,
    );

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        model = %config.gemini.model,
        scheme = ?config.intent.scheme,
        "Starting artlens HTTP server"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
