//! In-memory state store.
//!
//! Process-local implementation of the [`StateStore`] port: the record,
//! the append-only survey log, and the idempotency-token set live behind
//! one mutex, so every [`WriteSet`] lands atomically. Suitable for the
//! headless runtime and for tests; a SQL adapter replaces it in
//! deployments that must survive a restart.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::app::ports::{StateStore, StorageError};
use crate::state::{GameRecord, SurveyLogEntry, WriteSet};

struct Inner {
    record: GameRecord,
    tokens: HashSet<String>,
    log: Vec<SurveyLogEntry>,
}

/// Shared-handle in-memory store. Clones see the same state.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// A store bootstrapped with the initial `waiting` record.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                record: GameRecord::initial(),
                tokens: HashSet::new(),
                log: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Io("store lock poisoned".to_string()))
    }

    /// Copy of the current record, for inspection and seeding outside the
    /// command path (tests, headless tools).
    pub fn record(&self) -> GameRecord {
        match self.lock() {
            Ok(inner) => inner.record.clone(),
            Err(_) => GameRecord::initial(),
        }
    }

    /// Replace the record wholesale. Inspection/seeding counterpart of
    /// [`record`](Self::record); production writes go through `commit`.
    pub fn replace_record(&self, record: GameRecord) {
        if let Ok(mut inner) = self.lock() {
            inner.record = record;
        }
    }

    /// Copy of the full survey log, oldest first.
    pub fn survey_log(&self) -> Vec<SurveyLogEntry> {
        match self.lock() {
            Ok(inner) => inner.log.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for MemoryStore {
    async fn load(&mut self) -> Result<GameRecord, StorageError> {
        Ok(self.lock()?.record.clone())
    }

    async fn try_record_token(&mut self, token: &str) -> Result<bool, StorageError> {
        Ok(self.lock()?.tokens.insert(token.to_string()))
    }

    async fn commit(&mut self, writes: WriteSet) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if writes.clear_log {
            inner.log.clear();
        }
        writes.patch.apply(&mut inner.record);
        if let Some(entry) = writes.append_survey {
            inner.log.push(entry);
        }
        Ok(())
    }

    async fn recent_surveys(&mut self, limit: usize) -> Result<Vec<SurveyLogEntry>, StorageError> {
        let inner = self.lock()?;
        Ok(inner.log.iter().rev().take(limit).cloned().collect())
    }
}
