//! Aggregate roots for the Story Session context.

use storyforge_catalog::domain::catalog::TemplateCatalog;
use storyforge_catalog::domain::templates::{Template, TemplateId};
use storyforge_core::aggregate::AggregateRoot;
use storyforge_core::clock::Clock;
use storyforge_core::error::DomainError;
use storyforge_core::event::EventMetadata;
use storyforge_story::domain::board;
use storyforge_story::domain::patch::StoryPatch;
use storyforge_story::domain::state::{ElementKind, StoryState};
use tracing::debug;
use uuid::Uuid;

use super::events::{
    PatchOrigin, SessionReset, SessionStarted, StageChanged, StatePatched, StoryEvent,
    StoryEventKind, TemplateSelected,
};
use super::wizard::{StageChange, WizardError, WizardSession, WizardStep};

impl From<WizardError> for DomainError {
    fn from(error: WizardError) -> Self {
        DomainError::Validation(error.to_string())
    }
}

/// The aggregate root for one story: the story state, the setup wizard and
/// the template the story was seeded from.
#[derive(Debug)]
pub struct StorySession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) state: StoryState,
    pub(crate) wizard: WizardSession,
    pub(crate) selected_template: Option<TemplateId>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<StoryEvent>,
}

impl StorySession {
    /// Creates an empty story session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            state: StoryState::default(),
            wizard: WizardSession::default(),
            selected_template: None,
            uncommitted_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &StoryState {
        &self.state
    }

    #[must_use]
    pub fn wizard(&self) -> &WizardSession {
        &self.wizard
    }

    #[must_use]
    pub fn selected_template(&self) -> Option<TemplateId> {
        self.selected_template
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: StoryEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = StoryEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    fn record_patch(
        &mut self,
        patch: StoryPatch,
        origin: PatchOrigin,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        self.record(
            StoryEventKind::StatePatched(StatePatched { patch, origin }),
            correlation_id,
            clock,
        );
    }

    fn record_stage_change(&mut self, change: StageChange, correlation_id: Uuid, clock: &dyn Clock) {
        debug!(session_id = %self.id, stage = %change.stage, "wizard stage change recorded");
        self.record(
            StoryEventKind::StageChanged(StageChanged::from(change)),
            correlation_id,
            clock,
        );
    }

    fn record_step(&mut self, step: WizardStep, correlation_id: Uuid, clock: &dyn Clock) {
        if let Some(patch) = step.patch {
            self.record_patch(patch, PatchOrigin::Wizard, correlation_id, clock);
        }
        if let Some(change) = step.stage_change {
            self.record_stage_change(change, correlation_id, clock);
        }
    }

    fn pool<'a>(&self, catalog: &'a TemplateCatalog, kind: ElementKind) -> &'a [String] {
        self.selected_template
            .and_then(|id| catalog.get_template_by_id(id))
            .map(|template| template.options(kind))
            .unwrap_or_default()
    }

    /// Opens the session, producing a `SessionStarted` event.
    pub fn start(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            StoryEventKind::SessionStarted(SessionStarted {
                session_id: self.id,
            }),
            correlation_id,
            clock,
        );
    }

    /// Seeds the story from `template` and restarts the wizard, which moves
    /// straight on to the character count.
    pub fn select_template(&mut self, template: &Template, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            StoryEventKind::TemplateSelected(TemplateSelected {
                template_id: template.id,
                seed: template.seed_patch(),
            }),
            correlation_id,
            clock,
        );
        self.record_stage_change(
            StageChange {
                stage: WizardSession::started().setup_stage,
                target: None,
            },
            correlation_id,
            clock,
        );
    }

    /// Returns the story, wizard and template selection to their defaults.
    pub fn reset(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            StoryEventKind::SessionReset(SessionReset {
                session_id: self.id,
            }),
            correlation_id,
            clock,
        );
    }

    /// Picks the target count for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the wizard refuses the count.
    pub fn choose_count(
        &mut self,
        kind: ElementKind,
        count: u32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let step = self.wizard.choose_count(&self.state, kind, count)?;
        self.record_step(step, correlation_id, clock);
        Ok(())
    }

    /// Selects (`select`) or deselects one of the template's options for
    /// `kind`. Records nothing when the option is already in that state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the wizard refuses the toggle.
    pub fn toggle_option(
        &mut self,
        kind: ElementKind,
        option: &str,
        select: bool,
        catalog: &TemplateCatalog,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let pool = self.pool(catalog, kind);
        let step = self.wizard.toggle_option(&self.state, kind, pool, option, select)?;
        self.record_step(step, correlation_id, clock);
        Ok(())
    }

    /// Adds a free-text entry to `kind`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the wizard refuses the entry.
    pub fn add_custom_entry(
        &mut self,
        kind: ElementKind,
        entry: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let step = self.wizard.add_custom_entry(&self.state, kind, entry)?;
        self.record_step(step, correlation_id, clock);
        Ok(())
    }

    /// Steps back from the `kind` selection stage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` outside that selection stage.
    pub fn go_back(
        &mut self,
        kind: ElementKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let step = self.wizard.go_back(kind)?;
        self.record_step(step, correlation_id, clock);
        Ok(())
    }

    /// Removes entry `index` of `kind` from the board.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if there is no such entry.
    pub fn remove_board_item(
        &mut self,
        kind: ElementKind,
        index: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let patch = board::removal_patch(&self.state, kind, index).ok_or_else(|| {
            DomainError::Validation(format!("no {} entry at index {index}", kind.field_name()))
        })?;
        self.record_patch(patch, PatchOrigin::Board, correlation_id, clock);
        Ok(())
    }

    /// Records a validated agent patch. Empty patches change nothing and
    /// record nothing.
    pub fn apply_agent_patch(&mut self, patch: StoryPatch, correlation_id: Uuid, clock: &dyn Clock) {
        if patch.is_empty() {
            return;
        }
        self.record_patch(patch, PatchOrigin::Agent, correlation_id, clock);
    }
}

impl AggregateRoot for StorySession {
    type Event = StoryEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            StoryEventKind::SessionStarted(_) => {}
            StoryEventKind::TemplateSelected(payload) => {
                self.selected_template = Some(payload.template_id);
                self.wizard = WizardSession::default();
                self.state.merge(payload.seed.clone());
            }
            StoryEventKind::StageChanged(payload) => {
                self.wizard.apply(payload.change());
            }
            StoryEventKind::StatePatched(payload) => {
                self.state.merge(payload.patch.clone());
            }
            StoryEventKind::SessionReset(_) => {
                self.state
                    .merge(StoryPatch::overwriting_all(&StoryState::default()));
                self.wizard = WizardSession::default();
                self.selected_template = None;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
