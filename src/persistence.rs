//! Persistence worker: the single task that owns the `Repository` and serializes all
//! access to it, per SPEC_FULL.md §4.2. Every `MatchWorker` and the `Supervisor` talk
//! to storage only through this mailbox — grounded on the teacher's pattern of funneling
//! all Cosmos access through one `DatabaseWrapper`, generalized here into its own task
//! so a slow save never blocks a match from replying to its caller.

use crate::domain::GameId;
use crate::errors::ServiceError;
use crate::repository::{GameRow, Repository};
use tokio::sync::{mpsc, oneshot};

pub enum PersistenceCommand {
    SaveSnapshot {
        game_id: GameId,
        game_type: String,
        payload: String,
    },
    LoadAll {
        reply_to: oneshot::Sender<Result<Vec<GameRow>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct PersistenceHandle {
    sender: mpsc::Sender<PersistenceCommand>,
}

impl PersistenceHandle {
    /// Fire-and-forget: the caller does not wait on durability before replying to its
    /// own caller, per SPEC_FULL.md §4.4's "move acknowledgement leads persistence".
    /// Harmless to drop on a full mailbox under backpressure — the next save for the
    /// same match supersedes it, since saves are upserts.
    pub fn save_snapshot(&self, game_id: GameId, game_type: String, payload: String) {
        let sender = self.sender.clone();
        let cmd = PersistenceCommand::SaveSnapshot {
            game_id,
            game_type,
            payload,
        };
        tokio::spawn(async move {
            if sender.send(cmd).await.is_err() {
                log::error!("persistence worker gone; dropped snapshot for {}", game_id);
            }
        });
    }

    pub async fn load_all(&self) -> Result<Vec<GameRow>, ServiceError> {
        let (reply_to, rx) = oneshot::channel();
        self.sender
            .send(PersistenceCommand::LoadAll { reply_to })
            .await
            .map_err(|_| ServiceError::internal("persistence worker unavailable"))?;
        rx.await
            .map_err(|_| ServiceError::internal("persistence worker dropped reply"))?
    }
}

/// Spawns the worker task and returns a cloneable handle to its mailbox.
pub fn spawn<R>(repository: R) -> PersistenceHandle
where
    R: Repository + 'static,
{
    let (sender, mut receiver) = mpsc::channel(256);
    tokio::spawn(async move {
        while let Some(cmd) = receiver.recv().await {
            match cmd {
                PersistenceCommand::SaveSnapshot {
                    game_id,
                    game_type,
                    payload,
                } => {
                    if let Err(e) = repository.save(game_id, &game_type, payload).await {
                        log::error!("failed to save snapshot for {}: {}", game_id, e);
                    }
                }
                PersistenceCommand::LoadAll { reply_to } => {
                    let result = repository.load_all().await;
                    let _ = reply_to.send(result);
                }
            }
        }
        log::info!("persistence worker shutting down: all handles dropped");
    });
    PersistenceHandle { sender }
}
