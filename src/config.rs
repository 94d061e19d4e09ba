//! Game configuration parameters.
//!
//! All tunable parameters for a Savanna deployment. Values can be
//! overridden through environment variables at startup; the board rules
//! themselves (sector count, species quotas) are compile-time constants.

use serde::{Deserialize, Serialize};

/// Core game configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    // --- Clock ---
    /// Minutes on the countdown when a new game starts.
    pub start_time_minutes: i64,
    /// How often the runtime issues a TICK command (seconds).
    pub tick_interval_secs: u64,

    // --- Queue ---
    /// Depth of the bounded command queue.
    pub command_queue_depth: usize,

    // --- Snapshots ---
    /// Maximum survey-log entries included in a snapshot.
    pub snapshot_log_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_time_minutes: 120, // 2 hours of field time
            tick_interval_secs: 60,
            command_queue_depth: 64,
            snapshot_log_limit: 200,
        }
    }
}

impl GameConfig {
    /// Defaults with environment overrides applied.
    ///
    /// `SAVANNA_START_MINUTES` and `SAVANNA_TICK_SECS` override the clock
    /// parameters; unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_parse::<i64>("SAVANNA_START_MINUTES") {
            config.start_time_minutes = v;
        }
        if let Some(v) = env_parse::<u64>("SAVANNA_TICK_SECS") {
            config.tick_interval_secs = v;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok()?.trim().parse().ok()
}
