//! The per-match worker, per SPEC_FULL.md §4.4. Owns exactly one `GameModel` instance;
//! nothing outside this task ever touches it directly. Grounded on the teacher's
//! per-game container task (one `tokio::task` per live game, fed by its own `mpsc`
//! mailbox, with a fire-and-forget sender to the persistence task).

use crate::codec::JsonCodec;
use crate::domain::{GameId, PlayerId};
use crate::errors::{GameError, ServiceError};
use crate::game_model::{GameModel, MatchStatus};
use crate::persistence::PersistenceHandle;
use crate::supervisor::SupervisorHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};

pub enum MatchCommand<Move, View> {
    MakeMove {
        player_id: PlayerId,
        mv: Move,
        reply_to: oneshot::Sender<Result<View, GameError>>,
    },
    GetState {
        reply_to: oneshot::Sender<View>,
    },
}

pub type MatchSender<Move, View> = mpsc::Sender<MatchCommand<Move, View>>;

/// Spawns a `MatchWorker` for a brand-new match, per §4.4 `create`. Pre-validates the
/// player count against the game type before the caller ever gets a handle back.
pub fn create<M>(
    game_id: GameId,
    players: Vec<PlayerId>,
    min_players: usize,
    max_players: usize,
    initial: M,
    game_type: String,
    persistence: PersistenceHandle,
    supervisor: SupervisorHandle,
) -> Result<MatchSender<M::Move, M::View>, ServiceError>
where
    M: GameModel + Serialize + Send + 'static,
    M::Move: Send + 'static,
    M::View: Send + 'static,
{
    if players.len() < min_players || players.len() > max_players {
        return Err(ServiceError::bad_request(&format!(
            "expected between {} and {} players, got {}",
            min_players,
            max_players,
            players.len()
        )));
    }
    // StartGame persists the fresh state before the match accepts its first move, per
    // §4.5; a failure here does not prevent the match from starting.
    let initial_payload = JsonCodec::encode(&initial);
    persistence.save_snapshot(game_id, game_type.clone(), initial_payload);
    Ok(spawn_loop(game_id, game_type, initial, persistence, supervisor))
}

/// Spawns a `MatchWorker` from a restored snapshot, per §4.4 `fromSnapshot`. Returns
/// `None` if `payload` does not decode into `M` — the supervisor treats that as "match
/// unavailable" and skips it during restore.
pub fn from_snapshot<M>(
    game_id: GameId,
    game_type: String,
    payload: &str,
    persistence: PersistenceHandle,
    supervisor: SupervisorHandle,
) -> Option<MatchSender<M::Move, M::View>>
where
    M: GameModel + Serialize + DeserializeOwned + Send + 'static,
    M::Move: Send + 'static,
    M::View: Send + 'static,
{
    match JsonCodec::decode::<M>(payload) {
        Ok(state) => Some(spawn_loop(game_id, game_type, state, persistence, supervisor)),
        Err(e) => {
            log::error!(
                "match {} snapshot failed to decode as the expected game model: {}",
                game_id,
                e
            );
            None
        }
    }
}

fn spawn_loop<M>(
    game_id: GameId,
    game_type: String,
    initial: M,
    persistence: PersistenceHandle,
    supervisor: SupervisorHandle,
) -> MatchSender<M::Move, M::View>
where
    M: GameModel + Serialize + Send + 'static,
    M::Move: Send + 'static,
    M::View: Send + 'static,
{
    let (sender, mut receiver) = mpsc::channel::<MatchCommand<M::Move, M::View>>(64);
    tokio::spawn(async move {
        let mut state = initial;
        while let Some(cmd) = receiver.recv().await {
            match cmd {
                MatchCommand::GetState { reply_to } => {
                    let _ = reply_to.send(state.view());
                }
                MatchCommand::MakeMove {
                    player_id,
                    mv,
                    reply_to,
                } => {
                    let outcome = apply_move(&game_id, &mut state, player_id, mv);
                    match outcome {
                        Ok(next) => {
                            state = next;
                            let payload = JsonCodec::encode(&state);
                            persistence.save_snapshot(game_id, game_type.clone(), payload);
                            let view = state.view();
                            let _ = reply_to.send(Ok(view));
                            if let MatchStatus::Won(_) | MatchStatus::Draw = state.status() {
                                supervisor.notify_game_completed(game_id).await;
                            }
                        }
                        Err(e) => {
                            let _ = reply_to.send(Err(e));
                        }
                    }
                }
            }
        }
        log::info!("match worker for {} shutting down", game_id);
    });
    sender
}

/// Implements SPEC_FULL.md §4.4 steps 1-4: status check, role resolution, turn check,
/// then delegation to the pure model. No state change on any `Err`.
fn apply_move<M>(
    game_id: &GameId,
    state: &mut M,
    player_id: PlayerId,
    mv: M::Move,
) -> Result<M, GameError>
where
    M: GameModel,
{
    if !matches!(state.status(), MatchStatus::InProgress) {
        return Err(GameError::GameOver);
    }
    let role = match state.role_of(player_id) {
        Some(role) => role,
        None => return Err(GameError::InvalidPlayer(player_id.to_string())),
    };
    if role != state.current_player() {
        log::debug!("match {}: rejected out-of-turn move from {}", game_id, player_id);
        return Err(GameError::InvalidTurn);
    }
    state.apply(role, mv)
}
