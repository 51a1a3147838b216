use super::game_type::GameType;
use super::ids::{GameId, PlayerId};
use super::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Finite lobby lifecycle, per SPEC_FULL.md §3/§4.7.
///
/// `WaitingForPlayers -> ReadyToStart` is reversible by leave; `ReadyToStart ->
/// InProgress` happens only via `StartGame`; `Completed`/`Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LobbyStatus {
    WaitingForPlayers,
    ReadyToStart,
    InProgress,
    Completed,
    Cancelled,
}

impl LobbyStatus {
    pub fn is_joinable(&self) -> bool {
        matches!(self, LobbyStatus::WaitingForPlayers | LobbyStatus::ReadyToStart)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyMetadata {
    pub game_id: GameId,
    pub game_type: GameType,
    pub players: HashMap<PlayerId, Player>,
    pub host_id: PlayerId,
    pub status: LobbyStatus,
}

impl LobbyMetadata {
    pub fn new(game_id: GameId, game_type: GameType, host: Player) -> Self {
        let host_id = host.id;
        let mut players = HashMap::new();
        players.insert(host_id, host);
        Self {
            game_id,
            game_type,
            players,
            host_id,
            status: LobbyStatus::WaitingForPlayers,
        }
    }

    /// Recomputes `WaitingForPlayers` vs. `ReadyToStart` against `minPlayers`. Never
    /// touches a terminal status — callers override those explicitly.
    pub fn recompute_status(&mut self) {
        if matches!(self.status, LobbyStatus::Completed | LobbyStatus::Cancelled) {
            return;
        }
        self.status = if self.players.len() >= self.game_type.info().min_players {
            LobbyStatus::ReadyToStart
        } else {
            LobbyStatus::WaitingForPlayers
        };
    }
}
