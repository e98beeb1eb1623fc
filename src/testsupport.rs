use chrono::{DateTime, Utc};

use crate::domain::ports::Clock;

/// Clock pinned to a single instant, for deterministic service tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
