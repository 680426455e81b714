//! Query handlers for the Story Session context.
//!
//! This module contains query handlers that reconstitute the session from
//! its stored events and return read-only view DTOs. Views are always
//! computed from the latest stream.

use serde::Serialize;
use storyforge_catalog::domain::catalog::TemplateCatalog;
use storyforge_catalog::domain::prompts;
use storyforge_catalog::domain::templates::TemplateId;
use storyforge_core::aggregate::AggregateRoot;
use storyforge_core::error::DomainError;
use storyforge_core::repository::EventRepository;
use storyforge_story::domain::board::StoryBoard;
use storyforge_story::domain::state::{ElementKind, StoryProgress, StoryState};
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::StorySession;
use crate::domain::wizard::{self, SetupStage, WizardSession};

/// Full read-only view of a story session.
#[derive(Debug, Serialize)]
pub struct StorySnapshotView {
    pub session_id: Uuid,
    pub story_state: StoryState,
    pub wizard: WizardSession,
    pub selected_template: Option<TemplateId>,
    /// Current version (event count).
    pub version: i64,
}

/// What the storytelling agent reads before each turn. Wizard fields are
/// informational; the agent cannot write them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContextView {
    pub setup_stage: SetupStage,
    pub selected_template: Option<TemplateId>,
    pub setup_complete: bool,
    pub characters: Vec<String>,
    pub world_notes: Vec<String>,
    pub plot_beats: Vec<String>,
    pub story_state: StoryState,
    /// Stage suggested by the number of resolved plot beats.
    pub suggested_progress: StoryProgress,
    pub conclusion_available: bool,
}

/// One selectable template option.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct OptionControl {
    pub text: String,
    pub selected: bool,
    pub enabled: bool,
}

/// The setup wizard as the UI renders it.
#[derive(Debug, Serialize)]
pub struct WizardView {
    pub session_id: Uuid,
    pub setup_stage: SetupStage,
    pub selected_template: Option<TemplateId>,
    /// Category of the current stage.
    pub category: Option<ElementKind>,
    pub target: Option<u32>,
    /// Entries currently stored for the category.
    pub selected: Vec<String>,
    /// Count menu; only filled at a count stage.
    pub count_options: Vec<u32>,
    /// Template options; only filled at a selection stage.
    pub options: Vec<OptionControl>,
    pub custom_entry_enabled: bool,
    pub back_enabled: bool,
    pub genre_prompts: Vec<String>,
    /// Filled once setup is complete.
    pub starter_prompts: Vec<String>,
    pub follow_up_ideas: Vec<String>,
}

/// The story board of a session.
#[derive(Debug, Serialize)]
pub struct BoardView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub board: StoryBoard,
}

async fn load_session(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<StorySession, DomainError> {
    let stored_events = repo.load_events(session_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(session_id));
    }
    command_handlers::reconstitute(session_id, &stored_events)
}

/// Retrieves the full state of a story session.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_story_by_id(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<StorySnapshotView, DomainError> {
    let session = load_session(session_id, repo).await?;
    Ok(StorySnapshotView {
        session_id,
        story_state: session.state().clone(),
        wizard: *session.wizard(),
        selected_template: session.selected_template(),
        version: session.version(),
    })
}

/// Retrieves the context handed to the storytelling agent.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_agent_context(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<AgentContextView, DomainError> {
    let session = load_session(session_id, repo).await?;
    let state = session.state();
    Ok(AgentContextView {
        setup_stage: session.wizard().setup_stage,
        selected_template: session.selected_template(),
        setup_complete: session.wizard().is_complete(),
        characters: state.characters.clone(),
        world_notes: state.world_notes.clone(),
        plot_beats: state.plot_beats.clone(),
        suggested_progress: StoryProgress::for_resolved_beats(state.plot_beats_resolved),
        conclusion_available: state.story_progress.offers_conclusion(state.plot_beats_resolved),
        story_state: state.clone(),
    })
}

/// Retrieves the setup wizard with every control's enablement.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_wizard(
    session_id: Uuid,
    catalog: &TemplateCatalog,
    repo: &dyn EventRepository,
) -> Result<WizardView, DomainError> {
    let session = load_session(session_id, repo).await?;
    let state = session.state();
    let wizard = session.wizard();
    let stage = wizard.setup_stage;
    let template = session
        .selected_template()
        .and_then(|id| catalog.get_template_by_id(id));
    let category = stage.category();

    let count_options = category
        .filter(|_| stage.is_count())
        .map(wizard::count_menu)
        .unwrap_or_default();
    let options = match (category, template) {
        (Some(kind), Some(template)) if stage.is_selection() => template
            .options(kind)
            .iter()
            .map(|option| OptionControl {
                text: option.clone(),
                selected: state.elements(kind).contains(option),
                enabled: wizard.option_enabled(state, kind, option),
            })
            .collect(),
        _ => Vec::new(),
    };
    let (starter_prompts, follow_up_ideas) = match template {
        Some(template) if wizard.is_complete() => (
            prompts::starter_prompts(template),
            prompts::follow_up_ideas(template),
        ),
        _ => (Vec::new(), Vec::new()),
    };

    Ok(WizardView {
        session_id,
        setup_stage: stage,
        selected_template: session.selected_template(),
        category,
        target: category.map(|kind| wizard.target(kind)),
        selected: category
            .map(|kind| state.elements(kind).to_vec())
            .unwrap_or_default(),
        count_options,
        options,
        custom_entry_enabled: category
            .is_some_and(|kind| wizard.custom_entry_enabled(state, kind)),
        back_enabled: stage.is_selection(),
        genre_prompts: prompts::genre_prompts(template),
        starter_prompts,
        follow_up_ideas,
    })
}

/// Retrieves the story board projection.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_board(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<BoardView, DomainError> {
    let session = load_session(session_id, repo).await?;
    Ok(BoardView {
        session_id,
        board: StoryBoard::project(session.state()),
    })
}
