//! Soft cache of countdown state.
//!
//! TICK arrives once a minute from every deployment and is the hot path:
//! the cache answers "is the game running, and has the deadline passed?"
//! without a storage round-trip. It is refreshed whenever a command
//! actually reads or writes the authoritative record, and the expiry
//! decision it suggests is always re-checked against a locked read before
//! any write happens.

use chrono::{DateTime, Utc};

use crate::snapshot::minutes_remaining;
use crate::state::{GameRecord, Status};

/// Cached `{status, deadline}` pair. `loaded == false` means the cache has
/// never seen the record and must not be trusted.
#[derive(Debug, Clone, Copy)]
pub struct TimerCache {
    loaded: bool,
    status: Status,
    deadline: Option<DateTime<Utc>>,
}

impl TimerCache {
    pub fn new() -> Self {
        Self {
            loaded: false,
            status: Status::Waiting,
            deadline: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Sync the cache from a fresh authoritative read.
    pub fn refresh(&mut self, record: &GameRecord) {
        self.loaded = true;
        self.status = record.status;
        self.deadline = record.deadline;
    }

    /// Update the cache in place after a write, skipping the re-read.
    pub fn set(&mut self, status: Status, deadline: Option<DateTime<Utc>>) {
        self.loaded = true;
        self.status = status;
        self.deadline = deadline;
    }

    /// Drop the cached values; the next TICK will reload from storage.
    pub fn invalidate(&mut self) {
        self.loaded = false;
    }

    /// Whether the cached deadline has passed. `false` when no deadline.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Whole minutes left on the cached countdown.
    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        minutes_remaining(self.deadline, now)
    }
}

impl Default for TimerCache {
    fn default() -> Self {
        Self::new()
    }
}
