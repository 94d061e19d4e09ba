//! Public snapshot schema.
//!
//! Clients never receive diffs — every state broadcast and every fetch is a
//! full snapshot built from the authoritative record. The hidden solution
//! is included only once the game has revealed it; survey log entries
//! expose the match count and nothing finer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{INNER_RADIUS_M, OUTER_RADIUS_M};
use crate::hints::Hint;
use crate::ring::{ACTIVE_LEN, N_SECTORS, display_range};
use crate::solver::{Animal, Solution};
use crate::state::{GameRecord, Status, SurveyLogEntry};

/// Everything a client needs to render the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status: Status,
    pub center_lat: Option<f64>,
    pub center_lon: Option<f64>,

    // Ring constants, so clients never hard-code the geometry.
    pub n_sectors: usize,
    pub inner_radius_m: f64,
    pub outer_radius_m: f64,

    pub active_len: usize,
    pub active_start_index: usize,
    pub selected_sectors: Vec<usize>,

    pub deadline_utc: Option<DateTime<Utc>>,
    pub minutes_remaining: Option<i64>,

    pub guesses_remaining: u8,
    pub hints: Vec<Hint>,

    pub solution_revealed: bool,
    /// Present only when revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Solution>,

    pub version: u64,
    pub server_time_utc: DateTime<Utc>,

    pub log: Vec<SurveyLogView>,
}

/// One survey-log row as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyLogView {
    pub sectors: Vec<usize>,
    pub animal: Animal,
    pub count: usize,
    /// 1-based display label, e.g. `"12 to 1 (wrap)"`.
    pub sectors_display: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SurveyLogEntry> for SurveyLogView {
    fn from(entry: &SurveyLogEntry) -> Self {
        Self {
            sectors: entry.sectors.to_vec(),
            animal: entry.animal,
            count: entry.count,
            sectors_display: display_range(&entry.sectors),
            created_at: entry.created_at,
        }
    }
}

/// Minutes left on the countdown, clamped at zero.
pub fn minutes_remaining(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    deadline.map(|d| ((d - now).num_milliseconds() / 60_000).max(0))
}

/// Build a snapshot from the record and its recent survey log.
pub fn build(record: &GameRecord, log: &[SurveyLogEntry], now: DateTime<Utc>) -> GameSnapshot {
    GameSnapshot {
        status: record.status,
        center_lat: record.center.map(|c| c.lat),
        center_lon: record.center.map(|c| c.lon),
        n_sectors: N_SECTORS,
        inner_radius_m: INNER_RADIUS_M,
        outer_radius_m: OUTER_RADIUS_M,
        active_len: ACTIVE_LEN,
        active_start_index: record.active_start_index,
        selected_sectors: record.selected_sectors.to_vec(),
        deadline_utc: record.deadline,
        minutes_remaining: minutes_remaining(record.deadline, now),
        guesses_remaining: record.guesses_remaining,
        hints: record.hints.clone(),
        solution_revealed: record.solution_revealed,
        solution: if record.solution_revealed {
            record.solution
        } else {
            None
        },
        version: record.version,
        server_time_utc: now,
        log: log.iter().map(SurveyLogView::from).collect(),
    }
}
