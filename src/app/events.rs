//! Outbound broadcasts.
//!
//! The processor emits these through the
//! [`BroadcastSink`](super::ports::BroadcastSink) port after a command
//! commits. Adapters on the other side decide what to do with them —
//! fan out over websockets, log them, collect them in a test vector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::GameSnapshot;
use crate::state::Status;

/// What a command needs broadcast after it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastKind {
    /// No client-visible change.
    None,
    /// Countdown-only delta; clients just re-render the clock.
    Timer,
    /// Persisted visible fields changed: ship a full snapshot.
    State,
}

/// A message fanned out to every connected viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Broadcast {
    StateSnapshot(GameSnapshot),
    TimerUpdate(TimerUpdate),
}

/// Lightweight countdown payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerUpdate {
    pub status: Status,
    pub minutes_remaining: Option<i64>,
    pub server_time_utc: DateTime<Utc>,
}
