//! Single-writer command queue.
//!
//! Transports never call the service directly: they enqueue a command and
//! asynchronously await that command's own completion, while one consumer
//! task drains the queue strictly in order. The next command starts only
//! after the previous command's full cycle (read, validate, commit,
//! broadcast) has finished, so no fine-grained locking exists anywhere in
//! the domain core.
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌───────────────┐
//! │ transport A │────▶│               │     │               │
//! │ transport B │────▶│ bounded mpsc  │────▶│  Processor    │
//! │ tick loop   │────▶│ (Job + reply) │     │ (one consumer)│
//! └─────────────┘     └───────────────┘     └───────────────┘
//!        ▲                                        │
//!        └──────────── oneshot reply ◀────────────┘
//! ```

use log::{info, warn};
use tokio::sync::{mpsc, oneshot};

use crate::app::commands::{Command, CommandRequest};
use crate::app::ports::{BroadcastSink, Clock, StateStore, StorageError};
use crate::app::service::{CommandOutcome, GameService};
use crate::snapshot::GameSnapshot;

enum Job {
    Command(CommandRequest, oneshot::Sender<CommandOutcome>),
    Snapshot(oneshot::Sender<Result<GameSnapshot, StorageError>>),
}

/// Producer handle: cheap to clone, one per transport.
#[derive(Clone)]
pub struct GameHandle {
    tx: mpsc::Sender<Job>,
}

impl GameHandle {
    /// Enqueue a command and await its own completion.
    ///
    /// Commands are not cancellable once enqueued: dropping the returned
    /// future abandons the reply, not the command.
    pub async fn submit(&self, request: CommandRequest) -> CommandOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(Job::Command(request, reply_tx)).await.is_err() {
            return CommandOutcome::unavailable();
        }
        reply_rx
            .await
            .unwrap_or_else(|_| CommandOutcome::unavailable())
    }

    /// [`submit`](Self::submit) without an idempotency token.
    pub async fn command(&self, command: Command) -> CommandOutcome {
        self.submit(CommandRequest::new(command)).await
    }

    /// Fetch a full snapshot, serialised with the command stream.
    pub async fn snapshot(&self) -> Result<GameSnapshot, StorageError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(Job::Snapshot(reply_tx)).await.is_err() {
            return Err(StorageError::Io("game processor stopped".to_string()));
        }
        reply_rx
            .await
            .unwrap_or_else(|_| Err(StorageError::Io("game processor stopped".to_string())))
    }
}

/// Consumer side: owns the service and drains jobs in FIFO order.
pub struct Processor<S, C, B> {
    service: GameService<S, C, B>,
    rx: mpsc::Receiver<Job>,
}

/// Build the queue pair. The caller spawns `processor.run()` on its
/// runtime and hands clones of the [`GameHandle`] to transports.
pub fn pair<S, C, B>(
    service: GameService<S, C, B>,
    queue_depth: usize,
) -> (GameHandle, Processor<S, C, B>) {
    let (tx, rx) = mpsc::channel(queue_depth);
    (GameHandle { tx }, Processor { service, rx })
}

impl<S: StateStore, C: Clock, B: BroadcastSink> Processor<S, C, B> {
    /// Drain the queue until every [`GameHandle`] has been dropped.
    pub async fn run(mut self) {
        info!("command processor started");
        while let Some(job) = self.rx.recv().await {
            match job {
                Job::Command(request, reply) => {
                    let name = request.command.name();
                    let outcome = self.service.execute(request).await;
                    if reply.send(outcome).is_err() {
                        // The command still applied; only the reply is lost.
                        warn!("{name}: caller went away before the result was delivered");
                    }
                }
                Job::Snapshot(reply) => {
                    let result = self.service.fetch_snapshot().await;
                    let _ = reply.send(result);
                }
            }
        }
        info!("command processor stopped");
    }
}
