//! Deterministic `Clock` for tests.

use chrono::{DateTime, Utc};
use storyforge_core::clock::Clock;

/// Always reports the same instant, so event timestamps can be asserted.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
