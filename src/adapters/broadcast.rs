//! Broadcast sink adapters.

use log::info;
use tokio::sync::broadcast;

use crate::app::events::Broadcast;
use crate::app::ports::BroadcastSink;

/// Writes every broadcast to the log. Sink of the headless runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBroadcastSink;

impl BroadcastSink for LogBroadcastSink {
    fn emit(&mut self, broadcast: &Broadcast) {
        match broadcast {
            Broadcast::StateSnapshot(snap) => {
                info!(
                    "broadcast: snapshot v{} status={} minutes={:?}",
                    snap.version, snap.status, snap.minutes_remaining
                );
            }
            Broadcast::TimerUpdate(update) => {
                info!(
                    "broadcast: timer status={} minutes={:?}",
                    update.status, update.minutes_remaining
                );
            }
        }
    }
}

/// Fans broadcasts out over a tokio broadcast channel. Transport tasks
/// subscribe once per connected viewer and serialise for the wire
/// themselves; lagging viewers drop old messages rather than stalling the
/// processor.
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<Broadcast>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.tx.subscribe()
    }
}

impl BroadcastSink for ChannelBroadcaster {
    fn emit(&mut self, broadcast: &Broadcast) {
        // Send fails only when no viewer is subscribed; that is fine.
        let _ = self.tx.send(broadcast.clone());
    }
}
