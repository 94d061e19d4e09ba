//! End-to-end command scenarios against the full service with mock ports.

use crate::mocks::{
    self, CENTER, TestGame, fixed_board, point_in_sector, rotated_guess, seed_fixed_board,
};
use savanna::app::commands::{Command, CommandRequest};
use savanna::app::events::BroadcastKind;
use savanna::app::service::CommandOutcome;
use savanna::config::GameConfig;
use savanna::solver::Animal;
use savanna::state::Status;

async fn start_game(g: &mut TestGame) {
    let outcome = g
        .service
        .execute(CommandRequest::new(Command::NewGame {
            center_lat: CENTER.lat,
            center_lon: CENTER.lon,
        }))
        .await;
    assert!(outcome.accepted, "NEW_GAME failed: {}", outcome.message);
}

async fn add_sector(g: &mut TestGame, sector: usize) -> CommandOutcome {
    let (lat, lon) = point_in_sector(sector);
    g.service
        .execute(CommandRequest::new(Command::AddSector { lat, lon }))
        .await
}

async fn remove_sector(g: &mut TestGame, sector: usize) -> CommandOutcome {
    let (lat, lon) = point_in_sector(sector);
    g.service
        .execute(CommandRequest::new(Command::RemoveSector { lat, lon }))
        .await
}

async fn survey(g: &mut TestGame, animal: Animal) -> CommandOutcome {
    g.service
        .execute(CommandRequest::new(Command::RunSurvey {
            animal_type: animal,
        }))
        .await
}

async fn guess(g: &mut TestGame, guess: Vec<Animal>) -> CommandOutcome {
    g.service
        .execute(CommandRequest::new(Command::SubmitGuess { guess }))
        .await
}

// ── NEW_GAME ──────────────────────────────────────────────────

#[tokio::test]
async fn new_game_resets_everything() {
    let mut g = mocks::game();
    let outcome = g
        .service
        .execute(CommandRequest::new(Command::NewGame {
            center_lat: CENTER.lat,
            center_lon: CENTER.lon,
        }))
        .await;

    assert!(outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::State);

    let snap = outcome.snapshot.expect("state broadcast attaches a snapshot");
    assert_eq!(snap.status, Status::Running);
    assert_eq!(snap.guesses_remaining, 3);
    assert_eq!(snap.active_start_index, 0);
    assert!(snap.selected_sectors.is_empty());
    assert!(!snap.solution_revealed);
    assert!(snap.solution.is_none(), "hidden board must not leak");
    assert_eq!(snap.version, 0);
    assert_eq!(snap.hints.len(), 6);
    assert_eq!(snap.minutes_remaining, Some(120));
    assert!(snap.log.is_empty());

    assert_eq!(g.sink.snapshot_count(), 1);
}

#[tokio::test]
async fn new_game_clears_the_previous_run() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    seed_fixed_board(&g.store);
    add_sector(&mut g, 2).await;
    add_sector(&mut g, 3).await;
    survey(&mut g, Animal::Zebra).await;
    assert_eq!(g.store.inner.survey_log().len(), 1);

    start_game(&mut g).await;
    let record = g.store.inner.record();
    assert_eq!(record.version, 0, "NEW_GAME resets the version baseline");
    assert_eq!(record.active_start_index, 0);
    assert!(g.store.inner.survey_log().is_empty(), "log must be cleared");
}

#[tokio::test]
async fn new_game_rejects_non_finite_center() {
    let mut g = mocks::game();
    let outcome = g
        .service
        .execute(CommandRequest::new(Command::NewGame {
            center_lat: f64::NAN,
            center_lon: 0.0,
        }))
        .await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::None);
    assert_eq!(g.store.inner.record().status, Status::Waiting);
}

// ── Selection editing ─────────────────────────────────────────

#[tokio::test]
async fn selection_requires_a_running_game() {
    let mut g = mocks::game();
    let outcome = add_sector(&mut g, 1).await;
    assert!(!outcome.accepted);
    assert!(outcome.message.contains("not running"), "{}", outcome.message);
}

#[tokio::test]
async fn selection_rejects_positions_outside_the_annulus() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    let outcome = g
        .service
        .execute(CommandRequest::new(Command::AddSector {
            lat: CENTER.lat,
            lon: CENTER.lon,
        }))
        .await;
    assert!(!outcome.accepted);
    assert_eq!(g.store.inner.record().version, 0, "rejection must not bump version");
}

#[tokio::test]
async fn selection_rejects_fogged_sectors() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    // Active window starts at 0 and covers 0..=5; sector 8 is fogged.
    let broadcasts_before = g.sink.len();
    let outcome = add_sector(&mut g, 8).await;
    assert!(!outcome.accepted);
    assert!(outcome.message.contains("fogged"), "{}", outcome.message);
    assert_eq!(g.store.inner.record().version, 0);
    assert_eq!(g.sink.len(), broadcasts_before, "rejections never broadcast");
}

#[tokio::test]
async fn selection_add_and_remove_keep_sorted_order() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    add_sector(&mut g, 3).await;
    add_sector(&mut g, 1).await;
    add_sector(&mut g, 2).await;
    assert_eq!(g.store.inner.record().selected_sectors.to_vec(), vec![1, 2, 3]);

    let outcome = remove_sector(&mut g, 2).await;
    assert!(outcome.accepted);
    assert_eq!(g.store.inner.record().selected_sectors.to_vec(), vec![1, 3]);
    assert_eq!(g.store.inner.record().version, 4);
}

#[tokio::test]
async fn redundant_selection_edits_are_accepted_noops() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    add_sector(&mut g, 2).await;
    let version = g.store.inner.record().version;
    let broadcasts = g.sink.len();

    let outcome = add_sector(&mut g, 2).await;
    assert!(outcome.accepted, "re-adding is harmless");
    assert_eq!(outcome.broadcast, BroadcastKind::None);
    assert_eq!(g.store.inner.record().version, version, "no-op edits never bump version");
    assert_eq!(g.sink.len(), broadcasts);

    let outcome = remove_sector(&mut g, 5).await;
    assert!(outcome.accepted, "removing an unselected sector is harmless");
    assert_eq!(outcome.broadcast, BroadcastKind::None);
    assert_eq!(g.store.inner.record().version, version);
}

#[tokio::test]
async fn selection_caps_at_four_sectors() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    for sector in 0..4 {
        assert!(add_sector(&mut g, sector).await.accepted);
    }
    let outcome = add_sector(&mut g, 4).await;
    assert!(!outcome.accepted);
    assert!(outcome.message.contains("more than 4"), "{}", outcome.message);
    assert_eq!(g.store.inner.record().selected_sectors.len(), 4);
}

// ── RUN_SURVEY ────────────────────────────────────────────────

#[tokio::test]
async fn survey_deducts_time_and_shifts_window() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    seed_fixed_board(&g.store);
    let deadline_before = g.store.inner.record().deadline.unwrap();

    add_sector(&mut g, 2).await;
    add_sector(&mut g, 3).await;
    add_sector(&mut g, 4).await;
    let outcome = survey(&mut g, Animal::Zebra).await;

    assert!(outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::State);
    // Fixed board holds oak/leopard/aardwolf in 2..=4: zero zebras.
    assert_eq!(outcome.message, "Survey complete: 0");

    let record = g.store.inner.record();
    assert_eq!(
        record.deadline.unwrap(),
        deadline_before - chrono::Duration::minutes(15),
        "a 3-sector survey costs 15 minutes"
    );
    assert_eq!(record.active_start_index, 2, "window shifts by +2 per survey");
    assert!(record.selected_sectors.is_empty(), "survey consumes the selection");
    assert_eq!(record.version, 4);

    let log = g.store.inner.survey_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].count, 0);
    assert_eq!(log[0].version, 4);
    assert_eq!(log[0].sectors.to_vec(), vec![2, 3, 4]);

    let snap = outcome.snapshot.unwrap();
    assert_eq!(snap.log[0].sectors_display, "3 to 5");
}

#[tokio::test]
async fn survey_counts_matches_in_the_run() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    seed_fixed_board(&g.store);

    add_sector(&mut g, 4).await;
    add_sector(&mut g, 5).await;
    let outcome = survey(&mut g, Animal::Zebra).await;
    // Fixed board: sector 4 aardwolf, sector 5 zebra.
    assert_eq!(outcome.message, "Survey complete: 1");
}

#[tokio::test]
async fn survey_requires_a_contiguous_selection() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    add_sector(&mut g, 0).await;
    add_sector(&mut g, 2).await;
    let version = g.store.inner.record().version;

    let outcome = survey(&mut g, Animal::Zebra).await;
    assert!(!outcome.accepted);
    assert!(outcome.message.contains("contiguous"), "{}", outcome.message);
    assert_eq!(g.store.inner.record().version, version);
    assert_eq!(g.store.inner.record().active_start_index, 0, "no shift on rejection");
}

#[tokio::test]
async fn survey_rejects_single_sector_and_empty_selections() {
    let mut g = mocks::game();
    start_game(&mut g).await;

    let outcome = survey(&mut g, Animal::Oak).await;
    assert!(!outcome.accepted, "empty selection must not survey");

    add_sector(&mut g, 1).await;
    let outcome = survey(&mut g, Animal::Oak).await;
    assert!(!outcome.accepted, "single sector must not survey");
}

#[tokio::test]
async fn the_aardwolf_cannot_be_surveyed() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    add_sector(&mut g, 1).await;
    add_sector(&mut g, 2).await;

    let outcome = survey(&mut g, Animal::Aardwolf).await;
    assert!(!outcome.accepted);
    assert!(outcome.message.contains("cannot be surveyed"), "{}", outcome.message);
}

#[tokio::test]
async fn survey_that_spends_the_clock_loses_in_the_same_command() {
    let mut g = mocks::game_with(GameConfig {
        start_time_minutes: 10,
        ..GameConfig::default()
    });
    start_game(&mut g).await;
    add_sector(&mut g, 1).await;
    add_sector(&mut g, 2).await;

    // A 2-sector survey costs 20 minutes against a 10-minute clock.
    let outcome = survey(&mut g, Animal::Leopard).await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::State);

    let snap = outcome.snapshot.unwrap();
    assert_eq!(snap.status, Status::Lost);
    assert!(snap.solution_revealed);
    assert!(snap.solution.is_some(), "loss reveals the board");
    assert_eq!(snap.minutes_remaining, Some(0));

    let record = g.store.inner.record();
    assert_eq!(record.status, Status::Lost);
    assert_eq!(record.active_start_index, 2, "window shifts regardless of outcome");
    assert_eq!(g.store.inner.survey_log().len(), 1, "the survey still logs its count");
}

// ── SUBMIT_GUESS ──────────────────────────────────────────────

#[tokio::test]
async fn exact_guess_wins_regardless_of_guesses_remaining() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    seed_fixed_board(&g.store);

    // Burn one guess so the win does not depend on a full counter.
    let outcome = guess(&mut g, rotated_guess(&fixed_board())).await;
    assert!(!outcome.accepted);
    assert_eq!(g.store.inner.record().guesses_remaining, 2);

    let outcome = guess(&mut g, fixed_board().0.to_vec()).await;
    assert!(outcome.accepted);
    let snap = outcome.snapshot.unwrap();
    assert_eq!(snap.status, Status::Won);
    assert!(snap.solution_revealed);
    assert_eq!(snap.solution, Some(fixed_board()));
}

#[tokio::test]
async fn three_wrong_guesses_lose_and_reveal() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    seed_fixed_board(&g.store);
    let wrong = rotated_guess(&fixed_board());

    let outcome = guess(&mut g, wrong.clone()).await;
    assert!(!outcome.accepted);
    assert_eq!(outcome.message, "Incorrect. Guesses remaining: 2.");
    assert_eq!(g.store.inner.record().status, Status::Running);

    let outcome = guess(&mut g, wrong.clone()).await;
    assert_eq!(outcome.message, "Incorrect. Guesses remaining: 1.");

    let outcome = guess(&mut g, wrong).await;
    assert!(!outcome.accepted);
    let record = g.store.inner.record();
    assert_eq!(record.status, Status::Lost);
    assert_eq!(record.guesses_remaining, 0);
    assert!(record.solution_revealed);
    assert_eq!(record.version, 3, "one increment per guess");
}

#[tokio::test]
async fn guess_must_name_every_sector() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    let version = g.store.inner.record().version;

    let outcome = guess(&mut g, vec![Animal::Oak; 5]).await;
    assert!(!outcome.accepted);
    assert!(outcome.message.contains("all 13"), "{}", outcome.message);
    assert_eq!(g.store.inner.record().version, version);
    assert_eq!(g.store.inner.record().guesses_remaining, 3, "malformed guesses cost nothing");
}

#[tokio::test]
async fn finished_games_reject_play_until_reset() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    seed_fixed_board(&g.store);
    guess(&mut g, fixed_board().0.to_vec()).await;
    assert_eq!(g.store.inner.record().status, Status::Won);

    let outcome = add_sector(&mut g, 1).await;
    assert!(!outcome.accepted);
    let outcome = guess(&mut g, fixed_board().0.to_vec()).await;
    assert!(!outcome.accepted);

    // Only NEW_GAME restarts from a terminal status.
    start_game(&mut g).await;
    assert_eq!(g.store.inner.record().status, Status::Running);
}

// ── TICK ──────────────────────────────────────────────────────

#[tokio::test]
async fn tick_fast_path_never_touches_storage() {
    let mut g = mocks::game();
    start_game(&mut g).await;

    let loads = g.store.loads();
    let commits = g.store.commits();
    let outcome = g.service.execute(CommandRequest::new(Command::Tick)).await;

    assert!(outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::Timer);
    assert_eq!(g.store.loads(), loads, "running + unexpired tick must skip storage");
    assert_eq!(g.store.commits(), commits);
    assert_eq!(g.sink.timer_count(), 1);
}

#[tokio::test]
async fn tick_loads_the_record_once_when_cache_is_cold() {
    let mut g = mocks::game();
    let outcome = g.service.execute(CommandRequest::new(Command::Tick)).await;
    assert!(outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::Timer);
    assert_eq!(g.store.loads(), 1);

    g.service.execute(CommandRequest::new(Command::Tick)).await;
    assert_eq!(g.store.loads(), 1, "cache stays warm across ticks");
    assert_eq!(g.store.commits(), 0);
}

#[tokio::test]
async fn tick_applies_expiry_with_a_full_snapshot() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    g.clock.advance_minutes(121);

    let outcome = g.service.execute(CommandRequest::new(Command::Tick)).await;
    assert!(outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::State);

    let record = g.store.inner.record();
    assert_eq!(record.status, Status::Lost);
    assert!(record.solution_revealed);
    assert_eq!(record.version, 1);
}

#[tokio::test]
async fn tick_rechecks_expiry_under_the_lock() {
    let mut g = mocks::game();
    start_game(&mut g).await;

    // Another writer already resolved the game; the cache is stale.
    let mut record = g.store.inner.record();
    record.status = Status::Lost;
    g.store.inner.replace_record(record);
    g.clock.advance_minutes(121);

    let commits = g.store.commits();
    let outcome = g.service.execute(CommandRequest::new(Command::Tick)).await;

    assert!(outcome.accepted);
    assert_eq!(outcome.broadcast, BroadcastKind::Timer, "no second expiry write");
    assert_eq!(g.store.commits(), commits);
    assert_eq!(g.store.inner.record().version, 0);
}

#[tokio::test]
async fn tick_after_expiry_returns_to_the_fast_path() {
    let mut g = mocks::game();
    start_game(&mut g).await;
    g.clock.advance_minutes(121);
    g.service.execute(CommandRequest::new(Command::Tick)).await;

    let loads = g.store.loads();
    let outcome = g.service.execute(CommandRequest::new(Command::Tick)).await;
    assert_eq!(outcome.broadcast, BroadcastKind::Timer);
    assert_eq!(g.store.loads(), loads, "lost games tick without storage");
    assert_eq!(g.store.inner.record().version, 1);
}
