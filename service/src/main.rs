mod config;
mod routes;
mod storage;
mod models;

use axum::{Router, extract::DefaultBodyLimit};
use crate::config::ServiceConfig;
use crate::routes::AppState;
use crate::storage::SessionStorage;
use tower_http::cors::{CorsLayer, Any};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omci_service=debug,omci_parser=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load()?;
    tracing::debug!("Loaded config: {:?}", config);

    let storage = SessionStorage::new(&config.data_dir)?;
    let state = AppState::new(storage);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Captures can run to hundreds of MB
    let app = Router::new()
        .merge(routes::create_routes(state))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(cors);

    tracing::info!(
        "Starting OMCI service on {} (data dir {})",
        config.bind_addr,
        config.data_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
