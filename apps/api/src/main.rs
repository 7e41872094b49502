mod config;
mod errors;
mod extract;
mod interview;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::AppError;
use crate::interview::session::{SessionStore, SWEEP_INTERVAL};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing GROQ_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScout API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.groq_api_key.clone(),
        config.groq_model.clone(),
        config.groq_api_url.clone(),
        config.completion_timeout,
    )
    .map_err(AppError::from)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm.model(),
        config.completion_timeout
    );

    let sessions = Arc::new(SessionStore::new(config.session_idle_ttl));
    let _sweeper = sessions.spawn_sweeper(SWEEP_INTERVAL);
    info!("Idle sessions expire after {:?}", config.session_idle_ttl);

    let state = AppState {
        sessions,
        llm: Arc::new(llm),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
