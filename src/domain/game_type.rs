use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

/// Closed enumeration of supported game families. Adding a new variant here and a
/// matching `GameModule` entry in `game_module::registry` is the entire surface area
/// for plugging in a new game, per SPEC_FULL.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameType {
    TicTacToe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTypeInfo {
    pub min_players: usize,
    pub max_players: usize,
}

impl GameType {
    pub fn short_name(&self) -> &'static str {
        match self {
            GameType::TicTacToe => "tictactoe",
        }
    }

    pub fn info(&self) -> GameTypeInfo {
        match self {
            GameType::TicTacToe => GameTypeInfo {
                min_players: 2,
                max_players: 2,
            },
        }
    }
}

impl Serialize for GameType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.short_name())
    }
}

impl<'de> Deserialize<'de> for GameType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
