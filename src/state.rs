//! The authoritative game record and its write types.
//!
//! One record exists for the lifetime of the process. It is created once in
//! `waiting`, wholly reset by NEW_GAME, and otherwise mutated in place
//! through [`StatePatch`]es — never deleted. The survey log is append-only
//! and cleared only on reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Center;
use crate::hints::Hint;
use crate::ring::SectorRun;
use crate::solver::{Animal, Solution};

/// Guesses granted per game.
pub const GUESSES_PER_GAME: u8 = 3;

/// Game lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Waiting,
    Running,
    Won,
    Lost,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Waiting => write!(f, "waiting"),
            Status::Running => write!(f, "running"),
            Status::Won => write!(f, "won"),
            Status::Lost => write!(f, "lost"),
        }
    }
}

/// The singleton authoritative record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub status: Status,
    pub center: Option<Center>,
    pub deadline: Option<DateTime<Utc>>,
    pub active_start_index: usize,
    /// Player's current selection, kept sorted ascending.
    pub selected_sectors: SectorRun,
    pub guesses_remaining: u8,
    /// Hidden board; exposed to clients only once `solution_revealed`.
    pub solution: Option<Solution>,
    pub solution_revealed: bool,
    pub hints: Vec<Hint>,
    /// Monotonic revision counter: +1 per accepted mutating command.
    pub version: u64,
}

impl GameRecord {
    /// The record as bootstrapped before any game has been started.
    pub fn initial() -> Self {
        Self {
            status: Status::Waiting,
            center: None,
            deadline: None,
            active_start_index: 0,
            selected_sectors: SectorRun::new(),
            guesses_remaining: GUESSES_PER_GAME,
            solution: None,
            solution_revealed: false,
            hints: Vec::new(),
            version: 0,
        }
    }
}

/// One immutable row of the survey log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyLogEntry {
    /// The canonical ordered run that was surveyed.
    pub sectors: SectorRun,
    pub animal: Animal,
    /// Matching sectors in the run — the only information revealed.
    pub count: usize,
    /// Record version the survey was committed at.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

/// A partial update of [`GameRecord`]: `Some` fields overwrite, `None`
/// fields are untouched. This is the documented write schema the storage
/// port applies — nothing else ever mutates the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub status: Option<Status>,
    pub center: Option<Center>,
    pub deadline: Option<DateTime<Utc>>,
    pub active_start_index: Option<usize>,
    pub selected_sectors: Option<SectorRun>,
    pub guesses_remaining: Option<u8>,
    pub solution: Option<Solution>,
    pub solution_revealed: Option<bool>,
    pub hints: Option<Vec<Hint>>,
    pub version: Option<u64>,
}

impl StatePatch {
    /// Overlay this patch onto `record`.
    pub fn apply(&self, record: &mut GameRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(center) = self.center {
            record.center = Some(center);
        }
        if let Some(deadline) = self.deadline {
            record.deadline = Some(deadline);
        }
        if let Some(idx) = self.active_start_index {
            record.active_start_index = idx;
        }
        if let Some(selected) = &self.selected_sectors {
            record.selected_sectors = selected.clone();
        }
        if let Some(guesses) = self.guesses_remaining {
            record.guesses_remaining = guesses;
        }
        if let Some(solution) = self.solution {
            record.solution = Some(solution);
        }
        if let Some(revealed) = self.solution_revealed {
            record.solution_revealed = revealed;
        }
        if let Some(hints) = &self.hints {
            record.hints = hints.clone();
        }
        if let Some(version) = self.version {
            record.version = version;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One command's atomic write batch.
#[derive(Debug, Clone, Default)]
pub struct WriteSet {
    pub patch: StatePatch,
    /// Survey row to append, if the command ran a survey.
    pub append_survey: Option<SurveyLogEntry>,
    /// Truncate the survey log first (game reset).
    pub clear_log: bool,
}
