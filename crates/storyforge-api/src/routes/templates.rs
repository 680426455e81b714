//! Routes for the Template Catalog bounded context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use tracing::instrument;

use storyforge_catalog::application::query_handlers::{
    self, TemplateDetailView, TemplateListView,
};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
async fn list_templates(State(state): State<AppState>) -> Json<TemplateListView> {
    Json(query_handlers::list_templates(&state.catalog))
}

/// GET /{template_id}
#[instrument(skip(state))]
async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateDetailView>, ApiError> {
    let view = query_handlers::get_template(&state.catalog, &template_id)?;
    Ok(Json(view))
}

/// Returns the router for the template catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates))
        .route("/{template_id}", get(get_template))
}
