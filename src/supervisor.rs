//! The orchestration worker, per SPEC_FULL.md §4.5. Owns the lobby table and the live
//! match index as plain `HashMap`s local to this task — never behind a shared lock.
//! Grounded on the teacher's own single-task-owns-its-state discipline in
//! `games_service/game_container`, generalized here to also own lobby lifecycle.

use crate::domain::{GameId, GameOperation, GameType, LobbyMetadata, Player, PlayerId};
use crate::errors::ServiceError;
use crate::game_module::{self, ErasedMatch};
use crate::persistence::PersistenceHandle;
use crate::repository::GameRow;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const ASK_TIMEOUT: Duration = Duration::from_secs(3);
const STASH_LIMIT: usize = 128;

#[derive(Debug, Clone, Copy)]
pub struct LobbyCreated {
    pub game_id: GameId,
}

#[derive(Debug, Clone)]
pub struct LobbyJoined {
    pub metadata: LobbyMetadata,
}

#[derive(Debug, Clone)]
pub struct LobbyLeft {
    pub game_id: GameId,
    pub reason: String,
}

#[derive(Debug, Clone, Copy)]
pub struct GameStarted {
    pub game_id: GameId,
}

enum SupervisorCommand {
    CreateLobby {
        game_type: GameType,
        host: Player,
        reply_to: oneshot::Sender<LobbyCreated>,
    },
    JoinLobby {
        game_id: GameId,
        player: Player,
        reply_to: oneshot::Sender<Result<LobbyJoined, ServiceError>>,
    },
    LeaveLobby {
        game_id: GameId,
        player_id: PlayerId,
        reply_to: oneshot::Sender<Result<LobbyLeft, ServiceError>>,
    },
    StartGame {
        game_id: GameId,
        caller_id: PlayerId,
        reply_to: oneshot::Sender<Result<GameStarted, ServiceError>>,
    },
    ListLobbies {
        reply_to: oneshot::Sender<Vec<LobbyMetadata>>,
    },
    GetLobbyInfo {
        game_id: GameId,
        reply_to: oneshot::Sender<Result<LobbyMetadata, ServiceError>>,
    },
    GameCompleted {
        game_id: GameId,
    },
    RunGameOperation {
        game_id: GameId,
        op: GameOperation,
        reply_to: oneshot::Sender<Result<serde_json::Value, ServiceError>>,
    },
    RestoreGames {
        rows: Vec<GameRow>,
    },
}

#[derive(Clone)]
pub struct SupervisorHandle {
    sender: mpsc::Sender<SupervisorCommand>,
}

impl SupervisorHandle {
    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SupervisorCommand,
    ) -> Result<T, ServiceError> {
        let (reply_to, rx) = oneshot::channel();
        self.sender
            .send(build(reply_to))
            .await
            .map_err(|_| ServiceError::internal("supervisor unavailable"))?;
        tokio::time::timeout(ASK_TIMEOUT, rx)
            .await
            .map_err(|_| ServiceError::Timeout)?
            .map_err(|_| ServiceError::internal("supervisor dropped reply"))
    }

    pub async fn create_lobby(&self, game_type: GameType, host: Player) -> Result<LobbyCreated, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::CreateLobby {
            game_type,
            host,
            reply_to,
        })
        .await
    }

    pub async fn join_lobby(&self, game_id: GameId, player: Player) -> Result<LobbyJoined, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::JoinLobby {
            game_id,
            player,
            reply_to,
        })
        .await?
    }

    pub async fn leave_lobby(&self, game_id: GameId, player_id: PlayerId) -> Result<LobbyLeft, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::LeaveLobby {
            game_id,
            player_id,
            reply_to,
        })
        .await?
    }

    pub async fn start_game(&self, game_id: GameId, caller_id: PlayerId) -> Result<GameStarted, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::StartGame {
            game_id,
            caller_id,
            reply_to,
        })
        .await?
    }

    pub async fn list_lobbies(&self) -> Result<Vec<LobbyMetadata>, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::ListLobbies { reply_to }).await
    }

    pub async fn get_lobby_info(&self, game_id: GameId) -> Result<LobbyMetadata, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::GetLobbyInfo { game_id, reply_to })
            .await?
    }

    pub async fn run_game_operation(
        &self,
        game_id: GameId,
        op: GameOperation,
    ) -> Result<serde_json::Value, ServiceError> {
        self.ask(|reply_to| SupervisorCommand::RunGameOperation { game_id, op, reply_to })
            .await?
    }

    /// Fire-and-forget: a worker reporting `Won`/`Draw` does not wait on the
    /// supervisor's reply, per §4.4 step 4c.
    pub async fn notify_game_completed(&self, game_id: GameId) {
        if self
            .sender
            .send(SupervisorCommand::GameCompleted { game_id })
            .await
            .is_err()
        {
            log::error!("supervisor gone; dropped GameCompleted for {}", game_id);
        }
    }
}

struct Matches {
    // `Arc` (not `Box`) so `RunGameOperation` can clone a handle out to its own spawned
    // task and await the match worker's reply without blocking the supervisor's own
    // mailbox loop — only lobby/match-index mutation needs the single-task discipline.
    entries: HashMap<GameId, (GameType, Arc<dyn ErasedMatch>)>,
}

/// Spawns the supervisor task, kicks off the async `loadAll` restore, and returns a
/// cloneable handle. Commands arriving before restore completes are stashed in
/// arrival order, per §4.5 "Initializing".
pub fn spawn(persistence: PersistenceHandle) -> SupervisorHandle {
    let (sender, mut receiver) = mpsc::channel(256);
    let handle = SupervisorHandle { sender: sender.clone() };

    {
        let persistence = persistence.clone();
        let sender = sender.clone();
        tokio::spawn(async move {
            let rows = match persistence.load_all().await {
                Ok(rows) => rows,
                Err(e) => {
                    log::error!("restore failed, starting with no matches: {}", e);
                    Vec::new()
                }
            };
            if sender.send(SupervisorCommand::RestoreGames { rows }).await.is_err() {
                log::error!("supervisor gone before restore could be delivered");
            }
        });
    }

    let supervisor_handle = handle.clone();
    tokio::spawn(async move {
        let mut lobbies: HashMap<GameId, LobbyMetadata> = HashMap::new();
        let mut matches = Matches {
            entries: HashMap::new(),
        };
        let mut stash: Vec<SupervisorCommand> = Vec::new();
        let mut running = false;

        while let Some(cmd) = receiver.recv().await {
            if !running {
                match cmd {
                    SupervisorCommand::RestoreGames { rows } => {
                        restore(&mut matches, rows, &persistence, &supervisor_handle);
                        running = true;
                        log::info!("supervisor restore complete; {} matches live", matches.entries.len());
                        for stashed in stash.drain(..) {
                            handle_command(
                                stashed,
                                &mut lobbies,
                                &mut matches,
                                &persistence,
                                &supervisor_handle,
                            )
                            .await;
                        }
                    }
                    other => {
                        if stash.len() >= STASH_LIMIT {
                            log::error!("supervisor stash overflow during restore; fatal");
                            std::process::exit(1);
                        }
                        stash.push(other);
                    }
                }
                continue;
            }

            handle_command(cmd, &mut lobbies, &mut matches, &persistence, &supervisor_handle).await;
        }
        log::info!("supervisor shutting down: all handles dropped");
    });

    handle
}

fn restore(
    matches: &mut Matches,
    rows: Vec<GameRow>,
    persistence: &PersistenceHandle,
    supervisor: &SupervisorHandle,
) {
    for row in rows {
        let game_type = match GameType::from_str(&row.game_type) {
            Ok(t) => t,
            Err(_) => {
                log::warn!("skipping row {}: unrecognized game type {}", row.game_id, row.game_type);
                continue;
            }
        };
        let Some(module) = game_module::module_for(game_type) else {
            log::warn!("skipping row {}: no module registered for {}", row.game_id, game_type);
            continue;
        };
        match module.from_snapshot(row.game_id, &row.game_state, persistence.clone(), supervisor.clone()) {
            Some(handle) => {
                matches.entries.insert(row.game_id, (game_type, Arc::from(handle)));
            }
            None => log::warn!("skipping row {}: snapshot failed to decode", row.game_id),
        }
    }
}

async fn handle_command(
    cmd: SupervisorCommand,
    lobbies: &mut HashMap<GameId, LobbyMetadata>,
    matches: &mut Matches,
    persistence: &PersistenceHandle,
    supervisor: &SupervisorHandle,
) {
    match cmd {
        SupervisorCommand::CreateLobby {
            game_type,
            host,
            reply_to,
        } => {
            let game_id = GameId::new();
            let metadata = LobbyMetadata::new(game_id, game_type, host);
            lobbies.insert(game_id, metadata);
            log::info!("lobby {} created for {}", game_id, game_type);
            let _ = reply_to.send(LobbyCreated { game_id });
        }

        SupervisorCommand::JoinLobby {
            game_id,
            player,
            reply_to,
        } => {
            let result = (|| {
                let lobby = lobbies
                    .get_mut(&game_id)
                    .ok_or_else(|| ServiceError::LobbyNotFound(game_id.to_string()))?;
                if !lobby.status.is_joinable() {
                    return Err(ServiceError::NotJoinable);
                }
                if lobby.players.contains_key(&player.id) {
                    return Err(ServiceError::AlreadyJoined);
                }
                if lobby.players.len() >= lobby.game_type.info().max_players {
                    return Err(ServiceError::LobbyFull);
                }
                lobby.players.insert(player.id, player);
                lobby.recompute_status();
                Ok(LobbyJoined {
                    metadata: lobby.clone(),
                })
            })();
            if let Ok(joined) = &result {
                log::info!("lobby {}: player joined, status now {:?}", game_id, joined.metadata.status);
            }
            let _ = reply_to.send(result);
        }

        SupervisorCommand::LeaveLobby {
            game_id,
            player_id,
            reply_to,
        } => {
            let result = (|| {
                let lobby = lobbies
                    .get_mut(&game_id)
                    .ok_or_else(|| ServiceError::LobbyNotFound(game_id.to_string()))?;
                lobby.players.remove(&player_id);
                lobby.recompute_status();
                if player_id == lobby.host_id {
                    lobby.status = crate::domain::LobbyStatus::Cancelled;
                    Ok(LobbyLeft {
                        game_id,
                        reason: "host left".to_string(),
                    })
                } else {
                    Ok(LobbyLeft {
                        game_id,
                        reason: "left lobby".to_string(),
                    })
                }
            })();
            let _ = reply_to.send(result);
        }

        SupervisorCommand::StartGame {
            game_id,
            caller_id,
            reply_to,
        } => {
            let result = start_game(game_id, caller_id, lobbies, matches, persistence, supervisor);
            let _ = reply_to.send(result);
        }

        SupervisorCommand::ListLobbies { reply_to } => {
            let joinable: Vec<LobbyMetadata> = lobbies
                .values()
                .filter(|l| l.status.is_joinable())
                .cloned()
                .collect();
            let _ = reply_to.send(joinable);
        }

        SupervisorCommand::GetLobbyInfo { game_id, reply_to } => {
            let result = lobbies
                .get(&game_id)
                .cloned()
                .ok_or_else(|| ServiceError::LobbyNotFound(game_id.to_string()));
            let _ = reply_to.send(result);
        }

        SupervisorCommand::GameCompleted { game_id } => {
            if let Some(lobby) = lobbies.get_mut(&game_id) {
                lobby.status = crate::domain::LobbyStatus::Completed;
                log::info!("match {} completed", game_id);
            }
        }

        SupervisorCommand::RunGameOperation { game_id, op, reply_to } => {
            match matches.entries.get(&game_id) {
                None => {
                    let _ = reply_to.send(Err(ServiceError::MatchNotFound(game_id.to_string())));
                }
                Some((_, handle)) => {
                    // Forwarded to its own task so a slow match reply never blocks the
                    // supervisor's mailbox loop — only the lobby/match-index mutation
                    // above needs single-task discipline, per §5.
                    let handle = handle.clone();
                    tokio::spawn(async move {
                        let result = handle.run_operation(op).await.map_err(ServiceError::from);
                        let _ = reply_to.send(result);
                    });
                }
            }
        }

        SupervisorCommand::RestoreGames { .. } => {
            // Only valid while Initializing; a second restore signal once Running is
            // unreachable in practice and is simply ignored.
        }
    }
}

fn start_game(
    game_id: GameId,
    caller_id: PlayerId,
    lobbies: &mut HashMap<GameId, LobbyMetadata>,
    matches: &mut Matches,
    persistence: &PersistenceHandle,
    supervisor: &SupervisorHandle,
) -> Result<GameStarted, ServiceError> {
    let lobby = lobbies
        .get_mut(&game_id)
        .ok_or_else(|| ServiceError::LobbyNotFound(game_id.to_string()))?;
    if caller_id != lobby.host_id || lobby.status != crate::domain::LobbyStatus::ReadyToStart {
        return Err(ServiceError::NotHost);
    }
    let module = game_module::module_for(lobby.game_type)
        .ok_or_else(|| ServiceError::UnsupportedGameType(lobby.game_type.to_string()))?;

    // Host first, then the remaining joiner(s) — sufficient ordering for every
    // currently-registered game type, all of which cap at two players.
    let mut ordered_players = vec![lobby.host_id];
    ordered_players.extend(lobby.players.keys().filter(|id| **id != lobby.host_id));

    let erased = module.create(game_id, ordered_players, persistence.clone(), supervisor.clone())?;
    matches.entries.insert(game_id, (lobby.game_type, Arc::from(erased)));
    lobby.status = crate::domain::LobbyStatus::InProgress;
    log::info!("match {} started", game_id);
    Ok(GameStarted { game_id })
}
