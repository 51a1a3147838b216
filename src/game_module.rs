//! The pluggable game-module contract, per SPEC_FULL.md §4.6: a static registry
//! mapping `GameType` to a bundle of {move decoder, command dispatch, factory,
//! view}. Adding a game means adding a bundle here — the supervisor and the HTTP
//! boundary contain zero game-type branches, mirroring the teacher's own insistence
//! (in `games_service/game_container`) on keeping per-game logic out of the dispatcher.

use crate::domain::{GameId, GameOperation, GameType, PlayerId};
use crate::errors::{GameError, ServiceError};
use crate::game_model::tic_tac_toe::TicTacToeState;
use crate::game_model::GameModel;
use crate::match_worker::{self, MatchCommand, MatchSender};
use crate::persistence::PersistenceHandle;
use crate::supervisor::SupervisorHandle;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// A live match reduced to the one operation the supervisor and HTTP boundary need:
/// run a game-agnostic `GameOperation` and get back a JSON view or a `GameError`.
#[async_trait]
pub trait ErasedMatch: Send + Sync {
    async fn run_operation(&self, op: GameOperation) -> Result<serde_json::Value, GameError>;
}

pub trait GameModule: Send + Sync {
    fn game_type(&self) -> GameType;

    /// `players` in join order; the module is responsible for mapping that order onto
    /// its own role assignment (e.g. first joiner plays `X`).
    fn create(
        &self,
        game_id: GameId,
        players: Vec<PlayerId>,
        persistence: PersistenceHandle,
        supervisor: SupervisorHandle,
    ) -> Result<Box<dyn ErasedMatch>, ServiceError>;

    /// `None` if `payload` does not decode as this module's state — the supervisor
    /// treats that as "match unavailable" during restore, per §4.4.
    fn from_snapshot(
        &self,
        game_id: GameId,
        payload: &str,
        persistence: PersistenceHandle,
        supervisor: SupervisorHandle,
    ) -> Option<Box<dyn ErasedMatch>>;
}

struct MatchHandle<Move, View> {
    sender: MatchSender<Move, View>,
}

#[async_trait]
impl<Move, View> ErasedMatch for MatchHandle<Move, View>
where
    Move: DeserializeOwned + Send + 'static,
    View: Serialize + Send + 'static,
{
    async fn run_operation(&self, op: GameOperation) -> Result<serde_json::Value, GameError> {
        match op {
            GameOperation::GetState => {
                let (reply_to, rx) = oneshot::channel();
                self.sender
                    .send(MatchCommand::GetState { reply_to })
                    .await
                    .map_err(|_| GameError::Unknown("match worker unavailable".to_string()))?;
                let view = rx
                    .await
                    .map_err(|_| GameError::Unknown("match worker dropped reply".to_string()))?;
                Ok(serde_json::to_value(view).expect("view must be serializable"))
            }
            GameOperation::MakeMove { player_id, payload } => {
                let mv: Move = serde_json::from_value(payload)
                    .map_err(|e| GameError::Unknown(format!("bad move payload: {}", e)))?;
                let (reply_to, rx) = oneshot::channel();
                self.sender
                    .send(MatchCommand::MakeMove {
                        player_id,
                        mv,
                        reply_to,
                    })
                    .await
                    .map_err(|_| GameError::Unknown("match worker unavailable".to_string()))?;
                let result = rx
                    .await
                    .map_err(|_| GameError::Unknown("match worker dropped reply".to_string()))?;
                result.map(|view| serde_json::to_value(view).expect("view must be serializable"))
            }
        }
    }
}

pub struct TicTacToeModule;

impl GameModule for TicTacToeModule {
    fn game_type(&self) -> GameType {
        GameType::TicTacToe
    }

    fn create(
        &self,
        game_id: GameId,
        players: Vec<PlayerId>,
        persistence: PersistenceHandle,
        supervisor: SupervisorHandle,
    ) -> Result<Box<dyn ErasedMatch>, ServiceError> {
        let info = GameType::TicTacToe.info();
        if players.len() != 2 {
            return Err(ServiceError::bad_request("tic-tac-toe requires exactly 2 players"));
        }
        let initial = TicTacToeState::new([players[0], players[1]]);
        let sender = match_worker::create::<TicTacToeState>(
            game_id,
            players,
            info.min_players,
            info.max_players,
            initial,
            GameType::TicTacToe.short_name().to_string(),
            persistence,
            supervisor,
        )?;
        Ok(Box::new(MatchHandle { sender }))
    }

    fn from_snapshot(
        &self,
        game_id: GameId,
        payload: &str,
        persistence: PersistenceHandle,
        supervisor: SupervisorHandle,
    ) -> Option<Box<dyn ErasedMatch>> {
        let sender = match_worker::from_snapshot::<TicTacToeState>(
            game_id,
            GameType::TicTacToe.short_name().to_string(),
            payload,
            persistence,
            supervisor,
        )?;
        Some(Box::new(MatchHandle { sender }))
    }
}

static REGISTRY: Lazy<HashMap<GameType, Box<dyn GameModule>>> = Lazy::new(|| {
    let mut m: HashMap<GameType, Box<dyn GameModule>> = HashMap::new();
    m.insert(GameType::TicTacToe, Box::new(TicTacToeModule));
    m
});

pub fn module_for(game_type: GameType) -> Option<&'static dyn GameModule> {
    REGISTRY.get(&game_type).map(|b| b.as_ref())
}
