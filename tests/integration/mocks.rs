//! Mock adapters for integration tests.
//!
//! Records every broadcast and counts every storage call so tests can
//! assert on the full externally observable behaviour of a command
//! without a real database, socket, or wall clock.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};

use savanna::adapters::MemoryStore;
use savanna::app::events::Broadcast;
use savanna::app::ports::{BroadcastSink, Clock, StateStore, StorageError};
use savanna::app::service::GameService;
use savanna::config::GameConfig;
use savanna::geometry::{Center, INNER_RADIUS_M, OUTER_RADIUS_M, SLICE_DEG};
use savanna::solver::{Animal, Solution};
use savanna::state::{GameRecord, SurveyLogEntry, WriteSet};

// ── TestClock ─────────────────────────────────────────────────

/// Manually advanced wall clock shared between test and service.
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        Self(Arc::new(Mutex::new(start)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut t = self.0.lock().unwrap();
        *t += Duration::minutes(minutes);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        TestClock::now(self)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Collects every emitted broadcast.
#[derive(Clone)]
pub struct RecordingSink(Arc<Mutex<Vec<Broadcast>>>);

impl RecordingSink {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn broadcasts(&self) -> Vec<Broadcast> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.broadcasts()
            .iter()
            .filter(|b| matches!(b, Broadcast::StateSnapshot(_)))
            .count()
    }

    pub fn timer_count(&self) -> usize {
        self.broadcasts()
            .iter()
            .filter(|b| matches!(b, Broadcast::TimerUpdate(_)))
            .count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastSink for RecordingSink {
    fn emit(&mut self, broadcast: &Broadcast) {
        self.0.lock().unwrap().push(broadcast.clone());
    }
}

// ── CountingStore ─────────────────────────────────────────────

/// Wraps the real in-memory adapter, counting calls per operation.
#[derive(Clone)]
pub struct CountingStore {
    pub inner: MemoryStore,
    loads: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            loads: Arc::new(AtomicUsize::new(0)),
            commits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl Default for CountingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for CountingStore {
    async fn load(&mut self) -> Result<GameRecord, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn try_record_token(&mut self, token: &str) -> Result<bool, StorageError> {
        self.inner.try_record_token(token).await
    }

    async fn commit(&mut self, writes: WriteSet) -> Result<(), StorageError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit(writes).await
    }

    async fn recent_surveys(&mut self, limit: usize) -> Result<Vec<SurveyLogEntry>, StorageError> {
        self.inner.recent_surveys(limit).await
    }
}

// ── Test harness ──────────────────────────────────────────────

/// A service wired to mocks, plus handles the test keeps for itself.
pub struct TestGame {
    pub service: GameService<CountingStore, TestClock, RecordingSink>,
    pub store: CountingStore,
    pub clock: TestClock,
    pub sink: RecordingSink,
}

pub fn game() -> TestGame {
    game_with(GameConfig::default())
}

pub fn game_with(config: GameConfig) -> TestGame {
    let store = CountingStore::new();
    let clock = TestClock::new();
    let sink = RecordingSink::new();
    let service = GameService::new(store.clone(), clock.clone(), sink.clone(), config);
    TestGame {
        service,
        store,
        clock,
        sink,
    }
}

// ── Position helpers ──────────────────────────────────────────

pub const CENTER: Center = Center { lat: 0.0, lon: 0.0 };

/// A lat/lon inside `sector`, mid-annulus. Flat-earth offset from the
/// equatorial test center; accurate to well under a degree of bearing at
/// this scale.
pub fn point_in_sector(sector: usize) -> (f64, f64) {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let bearing = ((sector as f64 + 0.5) * SLICE_DEG).to_radians();
    let dist = (INNER_RADIUS_M + OUTER_RADIUS_M) / 2.0;
    let dlat = (dist * bearing.cos() / EARTH_RADIUS_M).to_degrees();
    let dlon = (dist * bearing.sin() / EARTH_RADIUS_M).to_degrees();
    (CENTER.lat + dlat, CENTER.lon + dlon)
}

// ── Board helpers ─────────────────────────────────────────────

/// A hand-checked valid board: zebras 5–8, leopards 0/3/10, vultures
/// 1/11 (both clockwise of a leopard), oaks 2/9/12, aardwolf 4.
pub fn fixed_board() -> Solution {
    use Animal::{Aardwolf, Leopard, Oak, Vulture, Zebra};
    Solution([
        Leopard, Vulture, Oak, Leopard, Aardwolf, Zebra, Zebra, Zebra, Zebra, Oak, Leopard,
        Vulture, Oak,
    ])
}

/// Overwrite the hidden board of the current game with [`fixed_board`],
/// making survey counts and guesses deterministic.
pub fn seed_fixed_board(store: &CountingStore) {
    let mut record = store.inner.record();
    record.solution = Some(fixed_board());
    store.inner.replace_record(record);
}

/// A full-length guess that differs from `solution` in every sector
/// except where rotation happens to agree.
pub fn rotated_guess(solution: &Solution) -> Vec<Animal> {
    let mut guess = solution.0.to_vec();
    guess.rotate_left(1);
    guess
}
