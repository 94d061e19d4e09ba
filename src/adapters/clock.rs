//! System wall-clock adapter.

use chrono::{DateTime, Utc};

use crate::app::ports::Clock;

/// Production clock: `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
