use super::ids::PlayerId;
use serde_json::Value;

/// A game-agnostic operation headed for a match. The move payload is still raw JSON
/// here; only the `GameModule` for the match's `GameType` knows how to decode it into
/// a concrete move, per SPEC_FULL.md §4.6.
#[derive(Debug, Clone)]
pub enum GameOperation {
    MakeMove { player_id: PlayerId, payload: Value },
    GetState,
}
