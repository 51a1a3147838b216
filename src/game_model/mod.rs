//! Pure rules contract, per SPEC_FULL.md §2 item 1 and §4.4. A `GameModel` never
//! touches I/O, the supervisor, or persistence — it is a pure `apply` function plus a
//! handful of read-only projections the `MatchWorker` needs to sequence moves.

pub mod tic_tac_toe;

use crate::domain::PlayerId;
use crate::errors::GameError;
use serde::Serialize;

/// Generic status every `GameModel::State` must expose, per SPEC_FULL.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus<Role> {
    InProgress,
    Won(Role),
    Draw,
}

pub trait GameModel: Sized + Clone {
    type Move;
    type Role: Copy + PartialEq;
    /// The shape sent to clients, per SPEC_FULL.md §4.6 `stateView`.
    type View: Serialize;

    /// Players in the match, in the stable order they joined.
    fn players(&self) -> &[PlayerId];

    /// Resolves a `PlayerId` to its role (e.g. "X"/"O") in this match, if it is one
    /// of the participants.
    fn role_of(&self, player_id: PlayerId) -> Option<Self::Role>;

    fn current_player(&self) -> Self::Role;

    fn status(&self) -> MatchStatus<Self::Role>;

    /// Applies a validated move for `role` and returns the resulting state, or a
    /// `GameError` with no state change. Callers (the `MatchWorker`) are responsible
    /// for the turn-order and game-over checks in SPEC_FULL.md §4.4 steps 1-3; this
    /// method only implements step 4, the rules themselves.
    fn apply(&self, role: Self::Role, mv: Self::Move) -> Result<Self, GameError>;

    /// Projects the current state to the shape sent to clients.
    fn view(&self) -> Self::View;
}
