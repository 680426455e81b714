//! Routes for the Story Session bounded context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use storyforge_core::repository::StoredEvent;
use storyforge_session::application::command_handlers;
use storyforge_session::application::query_handlers::{
    self, AgentContextView, BoardView, StorySnapshotView, WizardView,
};
use storyforge_session::domain::commands;
use storyforge_story::domain::patch::RejectedField;
use storyforge_story::domain::state::ElementKind;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{session_id}/template.
#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    /// Wire id of the template, e.g. `fantasy`.
    pub template_id: String,
}

/// Request body for POST /{session_id}/wizard/count.
#[derive(Debug, Deserialize)]
pub struct ChooseCountRequest {
    pub category: ElementKind,
    pub count: u32,
}

/// Request body for POST /{session_id}/wizard/toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleOptionRequest {
    pub category: ElementKind,
    /// Exact text of a template option.
    pub option: String,
    /// `true` to select, `false` to deselect. Repeating either is a no-op.
    pub selected: bool,
}

/// Request body for POST /{session_id}/wizard/custom.
#[derive(Debug, Deserialize)]
pub struct AddCustomEntryRequest {
    pub category: ElementKind,
    pub entry: String,
}

/// Request body for POST /{session_id}/wizard/back.
#[derive(Debug, Deserialize)]
pub struct GoBackRequest {
    pub category: ElementKind,
}

/// Request body for POST /{session_id}/board/remove.
#[derive(Debug, Deserialize)]
pub struct RemoveBoardItemRequest {
    pub category: ElementKind,
    /// Zero-based position in the list.
    pub index: usize,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The story session the command was applied to.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

impl CommandResponse {
    fn new(aggregate_id: Uuid, stored_events: &[StoredEvent]) -> Self {
        Self {
            aggregate_id,
            event_ids: stored_events.iter().map(|e| e.event_id).collect(),
        }
    }
}

/// Response body for an agent patch.
#[derive(Debug, Serialize)]
pub struct PatchResponse {
    pub aggregate_id: Uuid,
    pub event_ids: Vec<Uuid>,
    /// Fields dropped from the payload, with the reason for each.
    pub rejected_fields: Vec<RejectedField>,
}

/// POST /
#[instrument(skip(state))]
async fn start_story(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::StartStory {
        correlation_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
    };

    info!(
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        "handling start_story command"
    );

    let stored_events = command_handlers::handle_start_story(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(command.session_id, &stored_events)))
}

/// GET /{session_id}
#[instrument(skip_all, fields(session_id = %session_id))]
async fn get_story(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<StorySnapshotView>, ApiError> {
    let view = query_handlers::get_story_by_id(session_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// GET /{session_id}/context
#[instrument(skip_all, fields(session_id = %session_id))]
async fn get_agent_context(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AgentContextView>, ApiError> {
    let view = query_handlers::get_agent_context(session_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// GET /{session_id}/wizard
#[instrument(skip_all, fields(session_id = %session_id))]
async fn get_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<WizardView>, ApiError> {
    let view =
        query_handlers::get_wizard(session_id, &state.catalog, &*state.event_repository).await?;
    Ok(Json(view))
}

/// GET /{session_id}/board
#[instrument(skip_all, fields(session_id = %session_id))]
async fn get_board(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<BoardView>, ApiError> {
    let view = query_handlers::get_board(session_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{session_id}/template
#[instrument(skip_all, fields(session_id = %session_id, template_id = %request.template_id))]
async fn select_template(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectTemplateRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SelectTemplate {
        correlation_id: Uuid::new_v4(),
        session_id,
        template_id: request.template_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_template command");

    let stored_events = command_handlers::handle_select_template(
        &command,
        &state.catalog,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/reset
#[instrument(skip_all, fields(session_id = %session_id))]
async fn reset_story(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ResetStory {
        correlation_id: Uuid::new_v4(),
        session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_story command");

    let stored_events = command_handlers::handle_reset_story(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/wizard/count
#[instrument(skip_all, fields(session_id = %session_id, category = ?request.category))]
async fn choose_count(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChooseCountRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ChooseCount {
        correlation_id: Uuid::new_v4(),
        session_id,
        category: request.category,
        count: request.count,
    };

    info!(
        correlation_id = %command.correlation_id,
        count = command.count,
        "handling choose_count command"
    );

    let stored_events = command_handlers::handle_choose_count(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/wizard/toggle
#[instrument(skip_all, fields(session_id = %session_id, category = ?request.category))]
async fn toggle_option(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ToggleOptionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ToggleOption {
        correlation_id: Uuid::new_v4(),
        session_id,
        category: request.category,
        option: request.option,
        selected: request.selected,
    };

    info!(correlation_id = %command.correlation_id, "handling toggle_option command");

    let stored_events = command_handlers::handle_toggle_option(
        &command,
        &state.catalog,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/wizard/custom
#[instrument(skip_all, fields(session_id = %session_id, category = ?request.category))]
async fn add_custom_entry(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AddCustomEntryRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddCustomEntry {
        correlation_id: Uuid::new_v4(),
        session_id,
        category: request.category,
        entry: request.entry,
    };

    info!(correlation_id = %command.correlation_id, "handling add_custom_entry command");

    let stored_events = command_handlers::handle_add_custom_entry(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/wizard/back
#[instrument(skip_all, fields(session_id = %session_id, category = ?request.category))]
async fn go_back(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GoBackRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::GoBack {
        correlation_id: Uuid::new_v4(),
        session_id,
        category: request.category,
    };

    info!(correlation_id = %command.correlation_id, "handling go_back command");

    let stored_events = command_handlers::handle_go_back(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/board/remove
#[instrument(skip_all, fields(session_id = %session_id, category = ?request.category))]
async fn remove_board_item(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<RemoveBoardItemRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveBoardItem {
        correlation_id: Uuid::new_v4(),
        session_id,
        category: request.category,
        index: request.index,
    };

    info!(
        correlation_id = %command.correlation_id,
        index = command.index,
        "handling remove_board_item command"
    );

    let stored_events = command_handlers::handle_remove_board_item(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse::new(session_id, &stored_events)))
}

/// POST /{session_id}/patch
///
/// Takes the agent's raw sparse object; malformed fields are reported back
/// rather than failing the request.
#[instrument(skip_all, fields(session_id = %session_id))]
async fn apply_agent_patch(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<PatchResponse>, ApiError> {
    let command = commands::ApplyAgentPatch {
        correlation_id: Uuid::new_v4(),
        session_id,
        payload,
    };

    info!(correlation_id = %command.correlation_id, "handling apply_agent_patch command");

    let outcome = command_handlers::handle_apply_agent_patch(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(PatchResponse {
        aggregate_id: session_id,
        event_ids: outcome.events.iter().map(|e| e.event_id).collect(),
        rejected_fields: outcome.rejected,
    }))
}

/// Returns the router for the story session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_story))
        .route("/{session_id}", get(get_story))
        .route("/{session_id}/context", get(get_agent_context))
        .route("/{session_id}/wizard", get(get_wizard))
        .route("/{session_id}/board", get(get_board))
        .route("/{session_id}/template", post(select_template))
        .route("/{session_id}/reset", post(reset_story))
        .route("/{session_id}/wizard/count", post(choose_count))
        .route("/{session_id}/wizard/toggle", post(toggle_option))
        .route("/{session_id}/wizard/custom", post(add_custom_entry))
        .route("/{session_id}/wizard/back", post(go_back))
        .route("/{session_id}/board/remove", post(remove_board_item))
        .route("/{session_id}/patch", post(apply_agent_patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use storyforge_catalog::domain::catalog::TemplateCatalog;
    use storyforge_core::repository::EventRepository;
    use storyforge_session::domain::events::{SessionStarted, StoryEventKind};
    use storyforge_test_support::{
        EmptyEventRepository, FailingEventRepository, FixedClock, RecordingEventRepository,
    };
    use tower::ServiceExt;

    fn app_state_with(event_repository: Arc<dyn EventRepository>) -> AppState {
        AppState::new(
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
            event_repository,
            Arc::new(TemplateCatalog::builtin().unwrap()),
        )
    }

    /// A repository holding a freshly started session.
    fn started_repository(session_id: Uuid) -> Arc<RecordingEventRepository> {
        let kind = StoryEventKind::SessionStarted(SessionStarted { session_id });
        let started = StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: session_id,
            event_type: kind.event_type().to_owned(),
            payload: serde_json::to_value(&kind).unwrap(),
            sequence_number: 1,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
        };
        Arc::new(RecordingEventRepository::new(vec![started]))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_start_story_returns_200_with_new_session_id() {
        // Arrange
        let repo = Arc::new(RecordingEventRepository::new(Vec::new()));
        let app = router().with_state(app_state_with(repo.clone()));

        // Act
        let (status, json) = send(app, "POST", "/", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let session_id = Uuid::parse_str(json["aggregate_id"].as_str().unwrap()).unwrap();
        let event_ids = json["event_ids"].as_array().unwrap();
        assert_eq!(event_ids.len(), 1);

        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].0, session_id);
        assert_eq!(appended[0].2[0].event_id.to_string(), event_ids[0]);
    }

    #[tokio::test]
    async fn test_select_template_returns_seed_and_stage_events() {
        // Arrange
        let session_id = Uuid::new_v4();
        let app = router().with_state(app_state_with(started_repository(session_id)));

        // Act
        let (status, json) = send(
            app,
            "POST",
            &format!("/{session_id}/template"),
            Some(json!({ "template_id": "fantasy" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["aggregate_id"], session_id.to_string());
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_select_unknown_template_returns_200_without_events() {
        // Arrange
        let session_id = Uuid::new_v4();
        let repo = started_repository(session_id);
        let app = router().with_state(app_state_with(repo.clone()));

        // Act
        let (status, json) = send(
            app,
            "POST",
            &format!("/{session_id}/template"),
            Some(json!({ "template_id": "cyberpunk" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert!(json["event_ids"].as_array().unwrap().is_empty());
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_choose_count_outside_count_stage_returns_400() {
        // Arrange
        let session_id = Uuid::new_v4();
        let app = router().with_state(app_state_with(started_repository(session_id)));

        // Act
        let (status, json) = send(
            app,
            "POST",
            &format!("/{session_id}/wizard/count"),
            Some(json!({ "category": "characters", "count": 2 })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_toggle_with_unknown_category_returns_422() {
        // Arrange
        let session_id = Uuid::new_v4();
        let app = router().with_state(app_state_with(started_repository(session_id)));

        // Act
        let (status, _) = send(
            app,
            "POST",
            &format!("/{session_id}/wizard/toggle"),
            Some(json!({ "category": "villains", "option": "Sauron", "selected": true })),
        )
        .await;

        // Assert — Axum returns 422 for deserialization failures.
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_command_on_unknown_session_returns_404() {
        // Arrange
        let app = router().with_state(app_state_with(Arc::new(EmptyEventRepository)));
        let session_id = Uuid::new_v4();

        // Act
        let (status, json) = send(app, "POST", &format!("/{session_id}/reset"), None).await;

        // Assert
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "aggregate_not_found");
    }

    #[tokio::test]
    async fn test_get_story_with_malformed_id_returns_400() {
        // Arrange
        let app = router().with_state(app_state_with(Arc::new(EmptyEventRepository)));

        // Act
        let (status, _) = send(app, "GET", "/not-a-uuid", None).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_board_returns_500_when_repository_fails() {
        // Arrange
        let app = router().with_state(app_state_with(Arc::new(FailingEventRepository)));
        let session_id = Uuid::new_v4();

        // Act
        let (status, json) = send(app, "GET", &format!("/{session_id}/board"), None).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }

    #[tokio::test]
    async fn test_agent_patch_reports_rejected_fields() {
        // Arrange
        let session_id = Uuid::new_v4();
        let repo = started_repository(session_id);
        let app = router().with_state(app_state_with(repo.clone()));

        // Act
        let (status, json) = send(
            app,
            "POST",
            &format!("/{session_id}/patch"),
            Some(json!({
                "characters": ["Ari, a reluctant mage"],
                "turnCount": -3,
            })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
        let rejected = json["rejected_fields"].as_array().unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0]["field"], "turnCount");
        assert_eq!(repo.appended_events().len(), 1);
    }

    #[tokio::test]
    async fn test_agent_patch_with_non_object_body_is_fully_rejected() {
        // Arrange
        let session_id = Uuid::new_v4();
        let repo = started_repository(session_id);
        let app = router().with_state(app_state_with(repo.clone()));

        // Act
        let (status, json) = send(
            app,
            "POST",
            &format!("/{session_id}/patch"),
            Some(json!(["not", "an", "object"])),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert!(json["event_ids"].as_array().unwrap().is_empty());
        assert!(!json["rejected_fields"].as_array().unwrap().is_empty());
        assert!(repo.appended_events().is_empty());
    }
}
