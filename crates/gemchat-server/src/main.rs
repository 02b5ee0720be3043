mod config;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use gemchat_api::auth::{AppState, AppStateInner};
use gemchat_api::llm::GeminiClient;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gemchat_server=debug,gemchat_api=debug,gemchat_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = gemchat_db::Database::open(&config.db_path)?;

    let llm = GeminiClient::new(config.gemini_api_key, config.gemini_model, config.gemini_timeout)?
        .with_base_url(config.gemini_base_url);
    info!("Relaying chat to model {}", llm.model());

    match config.token_ttl_secs {
        Some(ttl) => info!("Session tokens expire after {}s", ttl),
        None => warn!("GEMCHAT_TOKEN_TTL_SECS unset, session tokens never expire"),
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        llm,
        token_ttl_secs: config.token_ttl_secs,
    });

    if let Some(dir) = &config.static_dir {
        info!("Serving static client from {}", dir.display());
    }

    let app = gemchat_api::router(state, config.static_dir.as_deref())
        .layer(TraceLayer::new_for_http());

    info!("gemchat listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Could not install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
