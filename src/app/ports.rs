//! Port traits — the hexagonal boundary between game logic and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GameService (domain)
//! ```
//!
//! Driven adapters (storage, wall clock, broadcast fan-out) implement these
//! traits. The [`GameService`](super::service::GameService) consumes them
//! via generics, so the domain core never touches a database, the system
//! clock, or a socket directly — every scenario in the integration suite
//! runs against mock adapters.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::app::events::Broadcast;
use crate::state::{GameRecord, SurveyLogEntry, WriteSet};

// ───────────────────────────────────────────────────────────────
// State store port (driven adapter: domain ↔ persistent record)
// ───────────────────────────────────────────────────────────────

/// Persistence for the singleton game record, its append-only survey log,
/// and the idempotency-token set.
///
/// The command queue is single-consumer, so a command's `load` →
/// `try_record_token` → `commit` sequence is never interleaved with another
/// command from this process. A SQL adapter maps the sequence onto one
/// transaction with the record row locked `FOR UPDATE`; the in-memory
/// adapter applies each [`WriteSet`] atomically under its own lock.
#[allow(async_fn_in_trait)]
pub trait StateStore {
    /// Locked read of the singleton record.
    async fn load(&mut self) -> Result<GameRecord, StorageError>;

    /// Atomic insert-if-absent of an idempotency token.
    /// Returns `true` when the token was fresh.
    async fn try_record_token(&mut self, token: &str) -> Result<bool, StorageError>;

    /// Apply one command's write batch: all of it or none of it.
    async fn commit(&mut self, writes: WriteSet) -> Result<(), StorageError>;

    /// Most recent survey entries, newest first.
    async fn recent_surveys(&mut self, limit: usize) -> Result<Vec<SurveyLogEntry>, StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock time source. Deadlines are compared against this, never
/// against `Utc::now()` directly, so tests can drive expiry deterministically.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ───────────────────────────────────────────────────────────────
// Broadcast sink port (domain → connected viewers)
// ───────────────────────────────────────────────────────────────

/// The processor emits snapshots and timer updates through this port.
/// Adapters decide where they go — a websocket fan-out in production, a
/// recording vector in tests, the log in the headless runtime.
pub trait BroadcastSink {
    fn emit(&mut self, broadcast: &Broadcast);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StateStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The singleton record was never bootstrapped.
    MissingRecord,
    /// Generic I/O failure from the storage backend.
    Io(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRecord => write!(f, "game record missing"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}
