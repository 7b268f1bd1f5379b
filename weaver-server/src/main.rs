use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod llm;
pub mod runner;
pub mod service;
pub mod store;

use crate::llm::gemini::GeminiProvider;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weaver_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Weaver server...");

    let config = config::Config::from_env();
    for check in config.validate() {
        if check.ok {
            tracing::info!("{}: {}", check.name, check.detail);
        } else {
            tracing::warn!("{}: {}", check.name, check.detail);
        }
    }

    let provider = Arc::new(GeminiProvider::from_config(&config));
    let state = api::AppState::new(config.clone(), provider);

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
