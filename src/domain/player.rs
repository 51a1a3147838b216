use super::ids::PlayerId;
use serde::{Deserialize, Serialize};

/// A participant known to the service. Equality is by `id` only, per SPEC_FULL.md §3 —
/// two `Player`s with the same id but different (stale) names are still "the same player".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}
