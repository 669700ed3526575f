//! Bot router - conversational menu bot for a multichannel chat platform
//!
//! Walks customers through per-channel menu trees, collects form answers
//! into their profile, and hands the conversation to a human agent or
//! resolves it when a branch ends.

mod agent;
mod api;
mod config;
mod layer;
mod office_hours;
mod platform;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::RouterConfig;
use layer::LayerStore;
use platform::MultichannelClient;
use runtime::ProductionRuntime;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local runs keep their settings in .env
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bot_router=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Arc::new(RouterConfig::from_env());
    if config.platform.app_id.is_empty() {
        tracing::warn!("MULTICHANNEL_APP_ID is not set. Platform calls will be rejected.");
    }
    tracing::info!(
        layer_dir = %config.layers.dir.display(),
        all_in_one = config.layers.all_in_one,
        office_hours = config.routing.office_hours_enabled,
        pool_division = %config.routing.pool_division,
        "Configuration loaded"
    );

    let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    let layers = LayerStore::new(config.layers.clone(), http.clone());
    let platform = Arc::new(MultichannelClient::new(config.platform.clone(), http));
    let runtime = ProductionRuntime::new(platform, layers.clone(), Arc::clone(&config));

    // Create application state
    let state = AppState::new(Arc::new(runtime), layers);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bot router listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
