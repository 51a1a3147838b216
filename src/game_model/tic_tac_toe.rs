//! Tic-tac-toe: the worked `GameModel` example from SPEC_FULL.md §4.7. The win/draw
//! check is grounded on the pack's other tic-tac-toe implementation
//! (`Carbonfreezer-multiplayer/games/tic-tac-toe`), since the teacher's own ruleset
//! (Catan) has no board of this shape to adapt.

use super::{GameModel, MatchStatus};
use crate::domain::PlayerId;
use crate::errors::GameError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// The client-submitted move payload for this game type, per SPEC_FULL.md §3.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

pub const BOARD_SIZE: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicTacToeState {
    /// Index 0 always plays X, index 1 always plays O.
    players: [PlayerId; 2],
    board: [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE],
    current_mark: Mark,
    winner: Option<Mark>,
    is_draw: bool,
}

impl TicTacToeState {
    pub fn new(players: [PlayerId; 2]) -> Self {
        Self {
            players,
            board: [[None; BOARD_SIZE]; BOARD_SIZE],
            current_mark: Mark::X,
            winner: None,
            is_draw: false,
        }
    }

    fn mark_for(&self, player_id: PlayerId) -> Option<Mark> {
        if player_id == self.players[0] {
            Some(Mark::X)
        } else if player_id == self.players[1] {
            Some(Mark::O)
        } else {
            None
        }
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.is_draw
    }

    /// Scans rows, columns, and the two diagonals for three-in-a-row of `probe`.
    fn check_for(&self, probe: Mark) -> bool {
        let b = &self.board;
        (0..BOARD_SIZE).any(|row| (0..BOARD_SIZE).all(|col| b[row][col] == Some(probe)))
            || (0..BOARD_SIZE).any(|col| (0..BOARD_SIZE).all(|row| b[row][col] == Some(probe)))
            || (0..BOARD_SIZE).all(|i| b[i][i] == Some(probe))
            || (0..BOARD_SIZE).all(|i| b[i][BOARD_SIZE - 1 - i] == Some(probe))
    }

    fn recompute_winner(&mut self) {
        if self.check_for(Mark::X) {
            self.winner = Some(Mark::X);
        } else if self.check_for(Mark::O) {
            self.winner = Some(Mark::O);
        } else {
            self.is_draw = self.board.iter().flatten().all(|cell| cell.is_some());
        }
    }
}

impl GameModel for TicTacToeState {
    type Move = Move;
    type Role = Mark;
    type View = TicTacToeView;

    fn players(&self) -> &[PlayerId] {
        &self.players
    }

    fn role_of(&self, player_id: PlayerId) -> Option<Mark> {
        self.mark_for(player_id)
    }

    fn current_player(&self) -> Mark {
        self.current_mark
    }

    fn status(&self) -> MatchStatus<Mark> {
        match self.winner {
            Some(mark) => MatchStatus::Won(mark),
            None if self.is_draw => MatchStatus::Draw,
            None => MatchStatus::InProgress,
        }
    }

    fn apply(&self, role: Mark, mv: Move) -> Result<Self, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if role != self.current_mark {
            return Err(GameError::InvalidTurn);
        }
        if mv.row >= BOARD_SIZE || mv.col >= BOARD_SIZE {
            return Err(GameError::OutOfBounds);
        }
        if self.board[mv.row][mv.col].is_some() {
            return Err(GameError::CellOccupied);
        }

        let mut next = self.clone();
        next.board[mv.row][mv.col] = Some(role);
        next.recompute_winner();
        if !next.is_terminal() {
            next.current_mark = role.other();
        }
        Ok(next)
    }

    fn view(&self) -> TicTacToeView {
        TicTacToeView::from(self)
    }
}

/// The shape sent to clients, per SPEC_FULL.md §4.6 `stateView`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeView {
    pub board: [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE],
    pub current_player: Mark,
    pub winner: Option<Mark>,
    pub draw: bool,
}

impl From<&TicTacToeState> for TicTacToeView {
    fn from(state: &TicTacToeState) -> Self {
        Self {
            board: state.board,
            current_player: state.current_mark,
            winner: state.winner,
            draw: state.is_draw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn players() -> [PlayerId; 2] {
        [PlayerId(Uuid::new_v4()), PlayerId(Uuid::new_v4())]
    }

    #[test]
    fn rejects_wrong_turn() {
        let ps = players();
        let state = TicTacToeState::new(ps);
        let err = state.apply(Mark::O, Move { row: 0, col: 0 }).unwrap_err();
        assert_eq!(err, GameError::InvalidTurn);
    }

    #[test]
    fn rejects_out_of_bounds() {
        let ps = players();
        let state = TicTacToeState::new(ps);
        let err = state.apply(Mark::X, Move { row: 3, col: 0 }).unwrap_err();
        assert_eq!(err, GameError::OutOfBounds);
    }

    #[test]
    fn rejects_occupied_cell() {
        let ps = players();
        let state = TicTacToeState::new(ps);
        let state = state.apply(Mark::X, Move { row: 0, col: 0 }).unwrap();
        let state = state.apply(Mark::O, Move { row: 1, col: 1 }).unwrap();
        let err = state.apply(Mark::X, Move { row: 0, col: 0 }).unwrap_err();
        assert_eq!(err, GameError::CellOccupied);
    }

    #[test]
    fn detects_row_win() {
        let ps = players();
        let mut state = TicTacToeState::new(ps);
        // X: (0,0) (0,1) (0,2), O: (1,0) (1,1)
        state = state.apply(Mark::X, Move { row: 0, col: 0 }).unwrap();
        state = state.apply(Mark::O, Move { row: 1, col: 0 }).unwrap();
        state = state.apply(Mark::X, Move { row: 0, col: 1 }).unwrap();
        state = state.apply(Mark::O, Move { row: 1, col: 1 }).unwrap();
        state = state.apply(Mark::X, Move { row: 0, col: 2 }).unwrap();

        assert_eq!(state.status(), MatchStatus::Won(Mark::X));
        let err = state.apply(Mark::O, Move { row: 2, col: 2 }).unwrap_err();
        assert_eq!(err, GameError::GameOver);
    }

    #[test]
    fn detects_draw() {
        let ps = players();
        let mut state = TicTacToeState::new(ps);
        // X O X
        // X O O
        // O X X
        let moves = [
            (Mark::X, 0, 0),
            (Mark::O, 0, 1),
            (Mark::X, 0, 2),
            (Mark::O, 1, 1),
            (Mark::X, 1, 0),
            (Mark::O, 1, 2),
            (Mark::X, 2, 1),
            (Mark::O, 2, 0),
            (Mark::X, 2, 2),
        ];
        for (mark, row, col) in moves {
            state = state.apply(mark, Move { row, col }).unwrap();
        }
        assert_eq!(state.status(), MatchStatus::Draw);
    }

    #[test]
    fn rejects_move_from_non_participant() {
        let ps = players();
        let state = TicTacToeState::new(ps);
        let stranger = PlayerId(Uuid::new_v4());
        assert_eq!(state.role_of(stranger), None);
    }
}
