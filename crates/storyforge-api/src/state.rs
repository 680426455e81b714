//! Shared application state.

use std::sync::Arc;

use storyforge_catalog::domain::catalog::TemplateCatalog;
use storyforge_core::clock::Clock;
use storyforge_core::repository::EventRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Time source for event metadata.
    pub clock: Arc<dyn Clock>,
    /// Story session event streams.
    pub event_repository: Arc<dyn EventRepository>,
    /// Genre templates, loaded once at start-up.
    pub catalog: Arc<TemplateCatalog>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        catalog: Arc<TemplateCatalog>,
    ) -> Self {
        Self {
            clock,
            event_repository,
            catalog,
        }
    }
}
