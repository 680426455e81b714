//! Story Forge API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use storyforge_api::config::AppConfig;
use storyforge_api::error::AppError;
use storyforge_api::routes;
use storyforge_api::state::AppState;
use storyforge_api::telemetry;
use storyforge_catalog::domain::catalog::TemplateCatalog;
use storyforge_core::clock::SystemClock;
use storyforge_event_store::memory_event_repository::InMemoryEventRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    tracing::info!(service = %config.service_name, "Starting Story Forge API server");

    let catalog = TemplateCatalog::builtin()?;
    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(catalog),
    );

    // TODO: Replace CorsLayer::permissive() with the UI origin once it is configurable.
    let app = routes::api_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    telemetry.shutdown();
    served?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
    tracing::info!("Shutting down");
}
