//! Mock `EventRepository` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storyforge_core::error::DomainError;
use storyforge_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// One recorded `append_events` call: stream, expected version, events.
pub type AppendCall = (Uuid, i64, Vec<StoredEvent>);

/// Serves a fixed stream from every `load_events` call and records every
/// append without applying it.
#[derive(Debug)]
pub struct RecordingEventRepository {
    stream: Vec<StoredEvent>,
    appended: Mutex<Vec<AppendCall>>,
}

impl RecordingEventRepository {
    /// Creates a repository whose streams all contain `stream`.
    #[must_use]
    pub fn new(stream: Vec<StoredEvent>) -> Self {
        Self {
            stream,
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every append so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<AppendCall> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }
}

/// Every stream is empty and appends vanish. Stands in for unknown
/// sessions and for creation commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Every call fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// Behaves like [`RecordingEventRepository`] except that the first
/// `conflicts` appends are refused with a concurrency conflict, as if
/// another writer got there first.
#[derive(Debug)]
pub struct ConflictingEventRepository {
    inner: RecordingEventRepository,
    remaining_conflicts: AtomicUsize,
    loads: AtomicUsize,
}

impl ConflictingEventRepository {
    /// Creates a repository serving `stream` that refuses the first
    /// `conflicts` appends.
    #[must_use]
    pub fn new(stream: Vec<StoredEvent>, conflicts: usize) -> Self {
        Self {
            inner: RecordingEventRepository::new(stream),
            remaining_conflicts: AtomicUsize::new(conflicts),
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of `load_events` calls so far.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Appends that were accepted.
    #[must_use]
    pub fn appended_events(&self) -> Vec<AppendCall> {
        self.inner.appended_events()
    }
}

#[async_trait]
impl EventRepository for ConflictingEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load_events(aggregate_id).await
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let refused = self
            .remaining_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual: expected_version + 1,
            });
        }
        self.inner
            .append_events(aggregate_id, expected_version, events)
            .await
    }
}
