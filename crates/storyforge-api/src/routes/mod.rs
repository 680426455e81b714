//! Route modules organized by bounded context.

pub mod health;
pub mod stories;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Assembles every route under its public prefix.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/templates", templates::router())
        .nest("/api/v1/stories", stories::router())
}
