//! Shared test mocks and utilities for Story Forge.

mod clock;
mod repository;

pub use clock::FixedClock;
pub use repository::{
    AppendCall, ConflictingEventRepository, EmptyEventRepository, FailingEventRepository,
    RecordingEventRepository,
};
