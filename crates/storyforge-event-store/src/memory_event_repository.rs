//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use storyforge_core::error::DomainError;
use storyforge_core::repository::{EventRepository, StoredEvent};

/// Event streams held in process memory, keyed by aggregate.
///
/// Cloning shares the underlying streams.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    streams: Arc<RwLock<HashMap<Uuid, Vec<StoredEvent>>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of streams currently held.
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().await;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self.streams.write().await;
        let stored = streams.get(&aggregate_id).map_or(0, Vec::len);

        let actual = i64::try_from(stored)
            .map_err(|e| DomainError::Infrastructure(format!("stream too long: {e}")))?;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for (offset, event) in (1_i64..).zip(events) {
            if event.sequence_number != expected_version + offset {
                return Err(DomainError::ConcurrencyConflict {
                    aggregate_id,
                    expected: expected_version + offset,
                    actual: event.sequence_number,
                });
            }
        }

        let stream = streams.entry(aggregate_id).or_default();
        stream.extend_from_slice(events);
        debug!(%aggregate_id, appended = events.len(), version = stream.len(), "events appended");
        Ok(())
    }
}
