//! Command handlers for the Story Session context.
//!
//! Each handler loads the session, lets the aggregate decide, and appends
//! the resulting events. When another writer appended first, the command is
//! decided again against the fresh stream, so the last writer wins without
//! the caller ever seeing the conflict.

use storyforge_catalog::domain::catalog::TemplateCatalog;
use storyforge_core::aggregate::AggregateRoot;
use storyforge_core::clock::Clock;
use storyforge_core::error::DomainError;
use storyforge_core::event::{DomainEvent, EventMetadata};
use storyforge_core::repository::{EventRepository, StoredEvent};
use storyforge_story::domain::patch::{RejectedField, StoryPatch};
use tracing::warn;
use uuid::Uuid;

use crate::domain::aggregates::StorySession;
use crate::domain::commands::{
    AddCustomEntry, ApplyAgentPatch, ChooseCount, GoBack, RemoveBoardItem, ResetStory,
    SelectTemplate, StartStory, ToggleOption,
};
use crate::domain::events::{StoryEvent, StoryEventKind};

/// Attempts per command before a concurrency conflict is given up on.
const MAX_ATTEMPTS: u32 = 3;

fn to_stored_event(event: &StoryEvent) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        aggregate_id: meta.aggregate_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        causation_id: meta.causation_id,
        occurred_at: meta.occurred_at,
    }
}

/// Reconstitutes a `StorySession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<StorySession, DomainError> {
    let mut session = StorySession::new(session_id);
    for stored in existing_events {
        let kind: StoryEventKind = serde_json::from_value(stored.payload.clone()).map_err(|e| {
            DomainError::Infrastructure(format!("event deserialization failed: {e}"))
        })?;
        let event = StoryEvent {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}

/// Loads an existing session, runs `decide` on it and persists whatever it
/// recorded, re-deciding on a concurrency conflict.
async fn execute<F>(
    session_id: Uuid,
    repo: &dyn EventRepository,
    decide: F,
) -> Result<Vec<StoredEvent>, DomainError>
where
    F: Fn(&mut StorySession) -> Result<(), DomainError>,
{
    let mut attempt = 1;
    loop {
        let existing_events = repo.load_events(session_id).await?;
        if existing_events.is_empty() {
            return Err(DomainError::AggregateNotFound(session_id));
        }
        let mut session = reconstitute(session_id, &existing_events)?;

        decide(&mut session)?;

        let stored_events: Vec<StoredEvent> = session
            .uncommitted_events()
            .iter()
            .map(to_stored_event)
            .collect();
        if stored_events.is_empty() {
            return Ok(stored_events);
        }

        match repo
            .append_events(session_id, session.version(), &stored_events)
            .await
        {
            Ok(()) => return Ok(stored_events),
            Err(DomainError::ConcurrencyConflict {
                expected, actual, ..
            }) if attempt < MAX_ATTEMPTS => {
                warn!(
                    %session_id,
                    attempt,
                    expected,
                    actual,
                    "concurrent write to story session, deciding again"
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Handles the `StartStory` command: opens a fresh session.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the session already exists, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_start_story(
    command: &StartStory,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let existing_events = repo.load_events(command.session_id).await?;
    if !existing_events.is_empty() {
        return Err(DomainError::Validation(format!(
            "story session {} already exists",
            command.session_id
        )));
    }

    let mut session = StorySession::new(command.session_id);
    session.start(command.correlation_id, clock);

    let stored_events: Vec<StoredEvent> = session
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();

    repo.append_events(command.session_id, 0, &stored_events)
        .await?;

    Ok(stored_events)
}

/// Handles the `SelectTemplate` command. Ids outside the catalog leave the
/// session untouched and produce no events.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails.
pub async fn handle_select_template(
    command: &SelectTemplate,
    catalog: &TemplateCatalog,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let template = catalog.find(&command.template_id);
    if template.is_none() {
        warn!(
            session_id = %command.session_id,
            template_id = %command.template_id,
            "unknown template id ignored"
        );
    }
    execute(command.session_id, repo, |session| {
        if let Some(template) = template {
            session.select_template(template, command.correlation_id, clock);
        }
        Ok(())
    })
    .await
}

/// Handles the `ResetStory` command.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails.
pub async fn handle_reset_story(
    command: &ResetStory,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    execute(command.session_id, repo, |session| {
        session.reset(command.correlation_id, clock);
        Ok(())
    })
    .await
}

/// Handles the `ChooseCount` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the wizard refuses the count, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_choose_count(
    command: &ChooseCount,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    execute(command.session_id, repo, |session| {
        session.choose_count(command.category, command.count, command.correlation_id, clock)
    })
    .await
}

/// Handles the `ToggleOption` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the wizard refuses the toggle, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_toggle_option(
    command: &ToggleOption,
    catalog: &TemplateCatalog,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    execute(command.session_id, repo, |session| {
        session.toggle_option(
            command.category,
            &command.option,
            command.selected,
            catalog,
            command.correlation_id,
            clock,
        )
    })
    .await
}

/// Handles the `AddCustomEntry` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the wizard refuses the entry, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_add_custom_entry(
    command: &AddCustomEntry,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    execute(command.session_id, repo, |session| {
        session.add_custom_entry(command.category, &command.entry, command.correlation_id, clock)
    })
    .await
}

/// Handles the `GoBack` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` outside the selection stage, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_go_back(
    command: &GoBack,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    execute(command.session_id, repo, |session| {
        session.go_back(command.category, command.correlation_id, clock)
    })
    .await
}

/// Handles the `RemoveBoardItem` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an index past the end, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_remove_board_item(
    command: &RemoveBoardItem,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    execute(command.session_id, repo, |session| {
        session.remove_board_item(command.category, command.index, command.correlation_id, clock)
    })
    .await
}

/// Events persisted for an agent patch, and the fields that were dropped.
#[derive(Debug)]
pub struct AgentPatchOutcome {
    pub events: Vec<StoredEvent>,
    pub rejected: Vec<RejectedField>,
}

/// Handles the `ApplyAgentPatch` command: validates the payload field by
/// field and merges whatever passed.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails.
pub async fn handle_apply_agent_patch(
    command: &ApplyAgentPatch,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<AgentPatchOutcome, DomainError> {
    let validated = StoryPatch::from_json(&command.payload);
    for rejected in &validated.rejected {
        warn!(
            session_id = %command.session_id,
            field = %rejected.field,
            reason = %rejected.reason,
            "dropped field from agent patch"
        );
    }

    let patch = validated.patch;
    let events = execute(command.session_id, repo, |session| {
        session.apply_agent_patch(patch.clone(), command.correlation_id, clock);
        Ok(())
    })
    .await?;

    Ok(AgentPatchOutcome {
        events,
        rejected: validated.rejected,
    })
}
