//! Game service — the hexagonal core.
//!
//! [`GameService`] owns the timer cache and the injected ports, and turns
//! each inbound [`Command`] into validated reads and writes against the
//! singleton record. It exposes a clean, transport-agnostic API; all I/O
//! flows through port traits, making every rule testable with mock
//! adapters.
//!
//! ```text
//!  CommandRequest ──▶ ┌──────────────────────────┐ ──▶ BroadcastSink
//!                     │       GameService         │
//!      StateStore ◀──▶│  validate · apply · emit  │
//!                     └──────────────────────────┘
//! ```
//!
//! Validation always precedes mutation: a command that fails any check
//! returns a structured rejection without having written anything. The
//! version counter moves by exactly one per accepted mutating command and
//! never on rejections, duplicates, or harmless no-op edits.

use chrono::Duration;
use log::{error, info, warn};

use crate::app::commands::{Command, CommandRequest};
use crate::app::events::{Broadcast, BroadcastKind, TimerUpdate};
use crate::app::ports::{BroadcastSink, Clock, StateStore, StorageError};
use crate::app::timer::TimerCache;
use crate::config::GameConfig;
use crate::error::CommandError;
use crate::geometry::{self, Center};
use crate::hints::generate_hints;
use crate::ring::{self, MAX_RUN_LEN, N_SECTORS, SectorRun};
use crate::snapshot::{self, GameSnapshot};
use crate::solver::{self, Animal};
use crate::state::{
    GUESSES_PER_GAME, GameRecord, StatePatch, Status, SurveyLogEntry, WriteSet,
};

/// Sectors the active window advances after every survey.
pub const SHIFT_PER_SURVEY: usize = 2;

/// Minutes a survey costs, by run length. Short runs cost more: pinning
/// down a tight area takes longer in the field.
fn survey_cost_minutes(len: usize) -> Option<i64> {
    match len {
        2 => Some(20),
        3 => Some(15),
        4 => Some(10),
        _ => None,
    }
}

/// Externally observable result of one command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub accepted: bool,
    pub message: String,
    pub broadcast: BroadcastKind,
    /// Attached when the command triggered a full-state broadcast.
    pub snapshot: Option<GameSnapshot>,
}

impl CommandOutcome {
    /// Fallback when the processor is gone and a command cannot run.
    pub(crate) fn unavailable() -> Self {
        Self {
            accepted: false,
            message: "Game processor unavailable.".to_string(),
            broadcast: BroadcastKind::None,
            snapshot: None,
        }
    }
}

/// What a handler decided, before the broadcast stage runs.
struct Applied {
    accepted: bool,
    message: String,
    broadcast: BroadcastKind,
}

impl Applied {
    fn ok(message: impl Into<String>, broadcast: BroadcastKind) -> Self {
        Self {
            accepted: true,
            message: message.into(),
            broadcast,
        }
    }

    /// Accepted, changed nothing, broadcasts nothing.
    fn noop(message: &str) -> Self {
        Self::ok(message, BroadcastKind::None)
    }
}

/// The game service orchestrates all domain logic.
pub struct GameService<S, C, B> {
    store: S,
    clock: C,
    sink: B,
    timer: TimerCache,
    config: GameConfig,
}

impl<S: StateStore, C: Clock, B: BroadcastSink> GameService<S, C, B> {
    pub fn new(store: S, clock: C, sink: B, config: GameConfig) -> Self {
        Self {
            store,
            clock,
            sink,
            timer: TimerCache::new(),
            config,
        }
    }

    // ── Command cycle ─────────────────────────────────────────

    /// Run one command through its full cycle: validate, apply, broadcast.
    ///
    /// Never returns an error: failures become rejected outcomes so one
    /// bad command cannot stall the queue or skip later broadcasts.
    pub async fn execute(&mut self, request: CommandRequest) -> CommandOutcome {
        let name = request.command.name();
        let applied = match self.dispatch(request).await {
            Ok(applied) => applied,
            Err(err) => {
                match &err {
                    CommandError::Storage(e) => warn!("{name}: storage failure: {e}"),
                    CommandError::Generation(e) => error!("{name}: generation failed: {e}"),
                    _ => info!("{name}: rejected: {err}"),
                }
                return CommandOutcome {
                    accepted: false,
                    message: err.to_string(),
                    broadcast: BroadcastKind::None,
                    snapshot: None,
                };
            }
        };

        let snapshot = match applied.broadcast {
            BroadcastKind::State => match self.fetch_snapshot().await {
                Ok(snap) => {
                    self.sink.emit(&Broadcast::StateSnapshot(snap.clone()));
                    Some(snap)
                }
                Err(e) => {
                    warn!("{name}: snapshot broadcast failed: {e}");
                    None
                }
            },
            BroadcastKind::Timer => {
                self.broadcast_timer().await;
                None
            }
            BroadcastKind::None => None,
        };

        CommandOutcome {
            accepted: applied.accepted,
            message: applied.message,
            broadcast: applied.broadcast,
            snapshot,
        }
    }

    /// Snapshot fetch entry point; also keeps the timer cache in sync.
    pub async fn fetch_snapshot(&mut self) -> Result<GameSnapshot, StorageError> {
        let record = self.store.load().await?;
        self.timer.refresh(&record);
        let log = self
            .store
            .recent_surveys(self.config.snapshot_log_limit)
            .await?;
        Ok(snapshot::build(&record, &log, self.clock.now()))
    }

    async fn dispatch(&mut self, request: CommandRequest) -> Result<Applied, CommandError> {
        // TICK never takes the record lock on its fast path.
        if request.command == Command::Tick {
            return self.handle_tick().await;
        }

        let record = self.store.load().await?;
        self.timer.refresh(&record);

        // Dedup before validation: a retried command is silently absorbed
        // even when its first run was refused.
        if let Some(token) = request.token.as_deref() {
            if !self.store.try_record_token(token).await? {
                return Ok(Applied::noop("Duplicate command ignored."));
            }
        }

        match request.command {
            Command::NewGame {
                center_lat,
                center_lon,
            } => self.handle_new_game(center_lat, center_lon).await,
            Command::AddSector { lat, lon } => {
                self.handle_edit_selection(&record, lat, lon, true).await
            }
            Command::RemoveSector { lat, lon } => {
                self.handle_edit_selection(&record, lat, lon, false).await
            }
            Command::RunSurvey { animal_type } => self.handle_survey(&record, animal_type).await,
            Command::SubmitGuess { guess } => self.handle_guess(&record, &guess).await,
            Command::Tick => self.handle_tick().await,
        }
    }

    // ── TICK ──────────────────────────────────────────────────

    async fn handle_tick(&mut self) -> Result<Applied, CommandError> {
        if !self.timer.is_loaded() {
            let record = self.store.load().await?;
            self.timer.refresh(&record);
        }
        let now = self.clock.now();

        if self.timer.status() != Status::Running || self.timer.deadline().is_none() {
            return Ok(Applied::ok("tick", BroadcastKind::Timer));
        }

        if self.timer.is_expired(now) {
            // The cache only suggests expiry; re-check against a locked
            // read, since a concurrent survey may already have resolved it.
            let record = self.store.load().await?;
            self.timer.refresh(&record);
            let still_expired =
                record.status == Status::Running && record.deadline.is_some_and(|d| now >= d);
            if still_expired {
                let patch = StatePatch {
                    status: Some(Status::Lost),
                    solution_revealed: Some(true),
                    version: Some(record.version + 1),
                    ..StatePatch::default()
                };
                self.store
                    .commit(WriteSet {
                        patch,
                        ..WriteSet::default()
                    })
                    .await?;
                self.timer.set(Status::Lost, record.deadline);
                info!("TICK: countdown expired, game lost (v{})", record.version + 1);
                return Ok(Applied::ok("expired", BroadcastKind::State));
            }
        }

        Ok(Applied::ok("tick", BroadcastKind::Timer))
    }

    // ── NEW_GAME ──────────────────────────────────────────────

    async fn handle_new_game(&mut self, lat: f64, lon: f64) -> Result<Applied, CommandError> {
        require_finite(lat, "center_lat")?;
        require_finite(lon, "center_lon")?;

        // Scoped so the thread-local RNG is gone before any await.
        let (solution, hints) = {
            let mut rng = rand::thread_rng();
            let solution = solver::generate(&mut rng)?;
            let hints = generate_hints(&solution, &mut rng)?;
            (solution, hints)
        };

        let deadline = self.clock.now() + Duration::minutes(self.config.start_time_minutes);
        let patch = StatePatch {
            status: Some(Status::Running),
            center: Some(Center { lat, lon }),
            deadline: Some(deadline),
            active_start_index: Some(0),
            selected_sectors: Some(SectorRun::new()),
            guesses_remaining: Some(GUESSES_PER_GAME),
            solution: Some(solution),
            solution_revealed: Some(false),
            hints: Some(hints),
            version: Some(0),
        };
        self.store
            .commit(WriteSet {
                patch,
                append_survey: None,
                clear_log: true,
            })
            .await?;
        self.timer.set(Status::Running, Some(deadline));

        info!("NEW_GAME: fresh board at ({lat:.5}, {lon:.5}), deadline {deadline}");
        Ok(Applied::ok("New game started.", BroadcastKind::State))
    }

    // ── ADD_SECTOR / REMOVE_SECTOR ────────────────────────────

    async fn handle_edit_selection(
        &mut self,
        record: &GameRecord,
        lat: f64,
        lon: f64,
        add: bool,
    ) -> Result<Applied, CommandError> {
        require_finite(lat, "lat")?;
        require_finite(lon, "lon")?;
        let center = require_running(record)?;

        let Some(sector) = geometry::sector_for_position(center, lat, lon) else {
            return Err(CommandError::Rejected(
                "You are not inside any sector of the survey ring.".to_string(),
            ));
        };
        if !ring::is_sector_active(sector, record.active_start_index) {
            return Err(CommandError::Rejected(
                "That sector is currently out of play (fogged).".to_string(),
            ));
        }

        let mut selection = record.selected_sectors.clone();
        let present = selection.contains(&sector);

        if add {
            if present {
                return Ok(Applied::noop("Sector already selected."));
            }
            if selection.push(sector).is_err() {
                return Err(CommandError::Rejected(format!(
                    "You cannot select more than {MAX_RUN_LEN} sectors."
                )));
            }
        } else {
            if !present {
                return Ok(Applied::noop("Sector not selected."));
            }
            if let Some(pos) = selection.iter().position(|&s| s == sector) {
                selection.remove(pos);
            }
        }
        selection.sort_unstable();

        let patch = StatePatch {
            selected_sectors: Some(selection),
            version: Some(record.version + 1),
            ..StatePatch::default()
        };
        self.store
            .commit(WriteSet {
                patch,
                ..WriteSet::default()
            })
            .await?;

        let message = if add { "Sector added." } else { "Sector removed." };
        Ok(Applied::ok(message, BroadcastKind::State))
    }

    // ── RUN_SURVEY ────────────────────────────────────────────

    async fn handle_survey(
        &mut self,
        record: &GameRecord,
        animal: Animal,
    ) -> Result<Applied, CommandError> {
        require_running(record)?;

        if !animal.is_surveyable() {
            return Err(CommandError::Rejected(format!(
                "The {animal} cannot be surveyed."
            )));
        }
        let Some(run) = ring::contiguous_run(&record.selected_sectors) else {
            return Err(CommandError::Rejected(format!(
                "Selected sectors must be 2-{MAX_RUN_LEN} and contiguous."
            )));
        };
        if run
            .iter()
            .any(|&s| !ring::is_sector_active(s, record.active_start_index))
        {
            return Err(CommandError::Rejected(
                "Selection includes out-of-play (fogged) sectors.".to_string(),
            ));
        }
        let Some(cost) = survey_cost_minutes(run.len()) else {
            return Err(CommandError::Rejected("Invalid survey length.".to_string()));
        };
        let (Some(solution), Some(deadline)) = (record.solution, record.deadline) else {
            return Err(CommandError::Rejected(
                "Game has no board. Start a new game.".to_string(),
            ));
        };

        let now = self.clock.now();
        let count = solution.count_in(&run, animal);
        let next_deadline = deadline - Duration::minutes(cost);
        let next_active =
            ring::wrap(record.active_start_index as isize + SHIFT_PER_SURVEY as isize);
        let expired_now = now >= next_deadline;
        let next_version = record.version + 1;

        let entry = SurveyLogEntry {
            sectors: run.clone(),
            animal,
            count,
            version: next_version,
            created_at: now,
        };

        let mut patch = StatePatch {
            deadline: Some(next_deadline),
            active_start_index: Some(next_active),
            selected_sectors: Some(SectorRun::new()),
            version: Some(next_version),
            ..StatePatch::default()
        };
        // A survey that spends the last of the clock loses the game in the
        // same command.
        if expired_now {
            patch.status = Some(Status::Lost);
            patch.solution_revealed = Some(true);
        }

        self.store
            .commit(WriteSet {
                patch,
                append_survey: Some(entry),
                clear_log: false,
            })
            .await?;

        let status = if expired_now {
            Status::Lost
        } else {
            Status::Running
        };
        self.timer.set(status, Some(next_deadline));

        info!(
            "RUN_SURVEY: {animal} over {:?} matched {count}, cost {cost}m",
            run.as_slice()
        );
        Ok(Applied {
            accepted: !expired_now,
            message: if expired_now {
                "Time ran out. You lose.".to_string()
            } else {
                format!("Survey complete: {count}")
            },
            broadcast: BroadcastKind::State,
        })
    }

    // ── SUBMIT_GUESS ──────────────────────────────────────────

    async fn handle_guess(
        &mut self,
        record: &GameRecord,
        guess: &[Animal],
    ) -> Result<Applied, CommandError> {
        require_running(record)?;

        if guess.len() != N_SECTORS {
            return Err(CommandError::Invalid(format!(
                "Guess must name all {N_SECTORS} sectors."
            )));
        }
        let Some(solution) = record.solution else {
            return Err(CommandError::Rejected(
                "Game has no board. Start a new game.".to_string(),
            ));
        };

        let next_version = record.version + 1;

        // Scored strictly against the stored board, not the rule validator:
        // a rule-satisfying but different arrangement is still wrong.
        if guess == solution.0.as_slice() {
            let patch = StatePatch {
                status: Some(Status::Won),
                solution_revealed: Some(true),
                version: Some(next_version),
                ..StatePatch::default()
            };
            self.store
                .commit(WriteSet {
                    patch,
                    ..WriteSet::default()
                })
                .await?;
            self.timer.set(Status::Won, record.deadline);
            info!("SUBMIT_GUESS: correct, game won (v{next_version})");
            return Ok(Applied::ok("Correct! You win.", BroadcastKind::State));
        }

        let remaining = record.guesses_remaining.saturating_sub(1);
        if remaining == 0 {
            let patch = StatePatch {
                guesses_remaining: Some(0),
                status: Some(Status::Lost),
                solution_revealed: Some(true),
                version: Some(next_version),
                ..StatePatch::default()
            };
            self.store
                .commit(WriteSet {
                    patch,
                    ..WriteSet::default()
                })
                .await?;
            self.timer.set(Status::Lost, record.deadline);
            info!("SUBMIT_GUESS: incorrect, no guesses left, game lost (v{next_version})");
            return Ok(Applied {
                accepted: false,
                message: "Incorrect. No guesses remaining. You lose.".to_string(),
                broadcast: BroadcastKind::State,
            });
        }

        let patch = StatePatch {
            guesses_remaining: Some(remaining),
            version: Some(next_version),
            ..StatePatch::default()
        };
        self.store
            .commit(WriteSet {
                patch,
                ..WriteSet::default()
            })
            .await?;
        info!("SUBMIT_GUESS: incorrect, {remaining} guesses remaining");
        Ok(Applied {
            accepted: false,
            message: format!("Incorrect. Guesses remaining: {remaining}."),
            broadcast: BroadcastKind::State,
        })
    }

    // ── Internal ──────────────────────────────────────────────

    /// Timer-only broadcast from the cache; loads the record once if the
    /// cache has never been filled.
    async fn broadcast_timer(&mut self) {
        if !self.timer.is_loaded() {
            match self.store.load().await {
                Ok(record) => self.timer.refresh(&record),
                Err(e) => {
                    warn!("timer broadcast skipped: {e}");
                    return;
                }
            }
        }
        let now = self.clock.now();
        self.sink.emit(&Broadcast::TimerUpdate(TimerUpdate {
            status: self.timer.status(),
            minutes_remaining: self.timer.minutes_remaining(now),
            server_time_utc: now,
        }));
    }
}

/// Running status plus a set center, or the rejection explaining why not.
fn require_running(record: &GameRecord) -> Result<Center, CommandError> {
    if record.status != Status::Running {
        return Err(CommandError::Rejected(format!(
            "Game is not running (status={}).",
            record.status
        )));
    }
    let Some(center) = record.center else {
        return Err(CommandError::Rejected(
            "Game center is not set. Start a new game first.".to_string(),
        ));
    };
    Ok(center)
}

fn require_finite(value: f64, field: &str) -> Result<(), CommandError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CommandError::Invalid(format!(
            "Missing or invalid {field}."
        )))
    }
}
