mod assist;
mod config;
mod document;
mod errors;
mod export;
mod frame;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::assist::AssistClient;
use crate::config::Config;
use crate::document::store::SessionStore;
use crate::export::host::{FontLibrary, ServerHost};
use crate::export::svg::SvgRasterizer;
use crate::frame::DEFAULT_VIEWPORT_WIDTH;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Genie API v{}", env!("CARGO_PKG_VERSION"));

    // Fonts load lazily on first export; warm them up in the background
    let fonts = Arc::new(FontLibrary::new());
    {
        let fonts = Arc::clone(&fonts);
        tokio::spawn(async move {
            if let Err(e) = fonts.database().await {
                warn!("Font preload failed: {e:#}");
            }
        });
    }

    // Initialize assist client (optional)
    let assist = match &config.assist_backend_url {
        Some(url) => {
            let client = AssistClient::new(url.clone())?;
            info!("Assist client initialized ({url})");
            Some(client)
        }
        None => {
            warn!("ASSIST_BACKEND_URL not set; assist routes will answer 503");
            None
        }
    };

    info!(
        "Export defaults: {} paper, {:?} margins",
        config.default_paper,
        config.default_margins.resolve()
    );

    // Build app state
    let state = AppState {
        store: SessionStore::new(DEFAULT_VIEWPORT_WIDTH),
        config: config.clone(),
        assist,
        host: Arc::new(ServerHost::new(Arc::clone(&fonts))),
        rasterizer: Arc::new(SvgRasterizer::new(fonts)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
