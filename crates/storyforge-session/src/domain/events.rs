//! Domain events for the Story Session context.

use serde::{Deserialize, Serialize};
use storyforge_catalog::domain::templates::TemplateId;
use storyforge_core::event::{DomainEvent, EventMetadata};
use storyforge_story::domain::patch::StoryPatch;
use storyforge_story::domain::state::ElementKind;
use uuid::Uuid;

use super::wizard::{SetupStage, StageChange};

/// Event type for [`SessionStarted`].
pub const SESSION_STARTED_EVENT_TYPE: &str = "story.session_started";
/// Event type for [`TemplateSelected`].
pub const TEMPLATE_SELECTED_EVENT_TYPE: &str = "story.template_selected";
/// Event type for [`StageChanged`].
pub const STAGE_CHANGED_EVENT_TYPE: &str = "story.stage_changed";
/// Event type for [`StatePatched`].
pub const STATE_PATCHED_EVENT_TYPE: &str = "story.state_patched";
/// Event type for [`SessionReset`].
pub const SESSION_RESET_EVENT_TYPE: &str = "story.session_reset";

/// Emitted when a new story session is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: Uuid,
}

/// Emitted when the story is seeded from a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSelected {
    pub template_id: TemplateId,
    /// Patch merged into the story state.
    pub seed: StoryPatch,
}

/// Emitted when the setup wizard moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChanged {
    pub stage: SetupStage,
    /// Category whose target was chosen, when the move came from a count.
    pub category: Option<ElementKind>,
    pub target: Option<u32>,
}

impl From<StageChange> for StageChanged {
    fn from(change: StageChange) -> Self {
        Self {
            stage: change.stage,
            category: change.target.map(|(kind, _)| kind),
            target: change.target.map(|(_, target)| target),
        }
    }
}

impl StageChanged {
    /// The wizard transition this event records.
    #[must_use]
    pub fn change(&self) -> StageChange {
        StageChange {
            stage: self.stage,
            target: self.category.zip(self.target),
        }
    }
}

/// Who wrote a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOrigin {
    Wizard,
    Board,
    Agent,
}

/// Emitted for every change to the story state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatePatched {
    pub patch: StoryPatch,
    pub origin: PatchOrigin,
}

/// Emitted when the session is returned to its defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReset {
    pub session_id: Uuid,
}

/// Event payload variants for the Story Session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoryEventKind {
    SessionStarted(SessionStarted),
    TemplateSelected(TemplateSelected),
    StageChanged(StageChanged),
    StatePatched(StatePatched),
    SessionReset(SessionReset),
}

/// Domain event envelope for the Story Session context.
#[derive(Debug, Clone)]
pub struct StoryEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: StoryEventKind,
}

impl StoryEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => SESSION_STARTED_EVENT_TYPE,
            Self::TemplateSelected(_) => TEMPLATE_SELECTED_EVENT_TYPE,
            Self::StageChanged(_) => STAGE_CHANGED_EVENT_TYPE,
            Self::StatePatched(_) => STATE_PATCHED_EVENT_TYPE,
            Self::SessionReset(_) => SESSION_RESET_EVENT_TYPE,
        }
    }
}

impl DomainEvent for StoryEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("StoryEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
