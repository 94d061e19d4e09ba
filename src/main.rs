//! Savanna — headless runtime entry point.
//!
//! Composition root for the game core: wires the in-memory store, the
//! system clock, and a logging broadcast sink into the command processor,
//! optionally starts a game, and drives the minute TICK until interrupted.
//! Transport adapters (HTTP/WebSocket) attach to the same [`GameHandle`]
//! and a [`ChannelBroadcaster`] in a full deployment.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                 │
//! │                                                          │
//! │   MemoryStore      SystemClock      LogBroadcastSink     │
//! │   (StateStore)     (Clock)          (BroadcastSink)      │
//! │                                                          │
//! │   ─────────────── Port Trait Boundary ───────────────    │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │        Processor → GameService (pure logic)        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │   tick loop (1/min) · ctrl-c shutdown                    │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use savanna::adapters::{LogBroadcastSink, MemoryStore, SystemClock};
use savanna::app::commands::Command;
use savanna::app::processor::{self, GameHandle};
use savanna::app::service::GameService;
use savanna::config::GameConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Savanna v{}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::from_env();
    let service = GameService::new(
        MemoryStore::new(),
        SystemClock,
        LogBroadcastSink,
        config.clone(),
    );
    let (handle, worker) = processor::pair(service, config.command_queue_depth);
    let worker = tokio::spawn(worker.run());

    start_game_from_env(&handle).await;

    let mut ticker = tokio::time::interval(Duration::from_secs(config.tick_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = handle.command(Command::Tick).await;
                if !outcome.accepted {
                    warn!("TICK refused: {}", outcome.message);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("shutting down");
    drop(handle);
    worker.await?;
    Ok(())
}

/// Start a game immediately when a center is configured in the
/// environment (`SAVANNA_CENTER_LAT` / `SAVANNA_CENTER_LON`).
async fn start_game_from_env(handle: &GameHandle) {
    let lat = std::env::var("SAVANNA_CENTER_LAT").ok();
    let lon = std::env::var("SAVANNA_CENTER_LON").ok();
    let (Some(lat), Some(lon)) = (lat, lon) else {
        info!("no center configured; waiting for NEW_GAME");
        return;
    };
    let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) else {
        warn!("unparseable SAVANNA_CENTER_LAT/LON, not starting a game");
        return;
    };

    let outcome = handle
        .command(Command::NewGame {
            center_lat: lat,
            center_lon: lon,
        })
        .await;
    info!("NEW_GAME at ({lat:.5}, {lon:.5}): {}", outcome.message);
}
