//! HTTP front end for the gleaner search engine.

mod handlers;
mod routes;
mod state;

use std::net::SocketAddr;

use gleaner_core::GleanerConfig;
use tracing_subscriber::EnvFilter;

use crate::routes::create_router;
use crate::state::AppState;

const DEFAULT_PORT: u16 = 3001;

fn port_from_env() -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(value) => Ok(value.trim().parse()?),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gleaner_server=info,gleaner_core=info,tower_http=info".into()),
        )
        .init();

    let config = GleanerConfig::from_env();
    if config.providers.serper_api_key.is_none() && config.providers.serpapi_api_key.is_none() {
        tracing::warn!("no search API keys configured; every search will return the placeholder result");
    }

    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port_from_env()?));
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
