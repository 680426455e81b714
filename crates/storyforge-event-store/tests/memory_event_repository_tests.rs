//! Integration tests for `InMemoryEventRepository`.

use chrono::Utc;
use storyforge_core::error::DomainError;
use storyforge_core::repository::{EventRepository, StoredEvent};
use storyforge_event_store::memory_event_repository::InMemoryEventRepository;
use uuid::Uuid;

/// Helper to build a `StoredEvent` with sensible defaults.
fn make_stored_event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        event_type: "story.state_patched".to_string(),
        payload: serde_json::json!({"StatePatched": {"patch": {"turnCount": 1}}}),
        sequence_number,
        correlation_id: Uuid::new_v4(),
        causation_id: Uuid::new_v4(),
        occurred_at: Utc::now(),
    }
}

// --- load_events ---

#[tokio::test]
async fn test_load_events_returns_empty_vec_for_nonexistent_aggregate() {
    let repo = InMemoryEventRepository::new();

    let events = repo.load_events(Uuid::new_v4()).await.unwrap();

    assert!(events.is_empty());
}

// --- append_events + load_events round-trip ---

#[tokio::test]
async fn test_append_and_load_single_event() {
    let repo = InMemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();
    let event = make_stored_event(aggregate_id, 1);
    let expected_event_id = event.event_id;
    let expected_payload = event.payload.clone();

    repo.append_events(aggregate_id, 0, &[event]).await.unwrap();

    let loaded = repo.load_events(aggregate_id).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].event_id, expected_event_id);
    assert_eq!(loaded[0].payload, expected_payload);
    assert_eq!(loaded[0].sequence_number, 1);
}

// --- ordering ---

#[tokio::test]
async fn test_append_in_two_batches_preserves_sequence_order() {
    let repo = InMemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();

    repo.append_events(
        aggregate_id,
        0,
        &[
            make_stored_event(aggregate_id, 1),
            make_stored_event(aggregate_id, 2),
        ],
    )
    .await
    .unwrap();
    repo.append_events(aggregate_id, 2, &[make_stored_event(aggregate_id, 3)])
        .await
        .unwrap();

    let loaded = repo.load_events(aggregate_id).await.unwrap();
    let sequence: Vec<i64> = loaded.iter().map(|e| e.sequence_number).collect();
    assert_eq!(sequence, vec![1, 2, 3]);
}

// --- aggregate isolation ---

#[tokio::test]
async fn test_aggregate_isolation() {
    let repo = InMemoryEventRepository::new();
    let agg_a = Uuid::new_v4();
    let agg_b = Uuid::new_v4();

    repo.append_events(agg_a, 0, &[make_stored_event(agg_a, 1)])
        .await
        .unwrap();
    repo.append_events(agg_b, 0, &[make_stored_event(agg_b, 1)])
        .await
        .unwrap();

    let loaded_a = repo.load_events(agg_a).await.unwrap();
    let loaded_b = repo.load_events(agg_b).await.unwrap();

    assert_eq!(loaded_a.len(), 1);
    assert_eq!(loaded_b.len(), 1);
    assert_eq!(loaded_a[0].aggregate_id, agg_a);
    assert_eq!(loaded_b[0].aggregate_id, agg_b);
    assert_eq!(repo.stream_count().await, 2);
}

// --- concurrency ---

#[tokio::test]
async fn test_stale_expected_version_is_a_concurrency_conflict() {
    let repo = InMemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();

    repo.append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 1)])
        .await
        .unwrap();

    // A second writer that loaded the empty stream tries to append.
    let result = repo
        .append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 1)])
        .await;

    match result.unwrap_err() {
        DomainError::ConcurrencyConflict {
            aggregate_id: id,
            expected,
            actual,
        } => {
            assert_eq!(id, aggregate_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }

    // The rejected append left the stream untouched.
    assert_eq!(repo.load_events(aggregate_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_gap_in_sequence_numbers_is_rejected() {
    let repo = InMemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();

    let result = repo
        .append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 2)])
        .await;

    assert!(matches!(
        result,
        Err(DomainError::ConcurrencyConflict { .. })
    ));
    assert!(repo.load_events(aggregate_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clones_share_streams() {
    let repo = InMemoryEventRepository::new();
    let clone = repo.clone();
    let aggregate_id = Uuid::new_v4();

    repo.append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 1)])
        .await
        .unwrap();

    assert_eq!(clone.load_events(aggregate_id).await.unwrap().len(), 1);
}
