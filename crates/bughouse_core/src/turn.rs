//! Per-board turn tracking and the local turn gate.
//!
//! The gate is advisory. It stops this client from sending actions the
//! remote side would refuse anyway; it never guards inbound events.

use crate::types::{BoardId, Color, Role};
use derive_more::Display;
use tracing::{debug, instrument};

/// Whose turn it is on each board.
///
/// Only changed by an authoritative turn update. Bughouse turn order across
/// two boards is not visible to a single client, so it is never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnState {
    turns: [Color; 2],
}

impl TurnState {
    /// Both boards start with white to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Color to move on `board`.
    pub fn get(&self, board: BoardId) -> Color {
        self.turns[board.index()]
    }

    /// Overwrites the color to move on `board`.
    pub fn set(&mut self, board: BoardId, color: Color) {
        self.turns[board.index()] = color;
    }

    /// Flips the color to move on `board` and returns the new value.
    pub fn advance(&mut self, board: BoardId) -> Color {
        let next = self.get(board).opposite();
        self.set(board, next);
        next
    }
}

/// What the local player is trying to originate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Moving a piece already on the board; carries the moving piece's color.
    Move {
        /// Color of the piece being moved.
        piece_color: Color,
    },
    /// Dropping a banked piece.
    Drop,
}

/// Which gate clause rejected an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GateRejection {
    /// The action targets a board the player does not sit at.
    #[display("Assigned to board {}, not board {}", assigned, attempted)]
    WrongBoard {
        /// The player's board.
        assigned: BoardId,
        /// The board the action targets.
        attempted: BoardId,
    },

    /// It is the other color's turn on that board.
    #[display("Not your turn on board {}: {} to move", board, to_move)]
    NotYourTurn {
        /// Board the action targets.
        board: BoardId,
        /// Color currently to move there.
        to_move: Color,
    },

    /// The player tried to move an opponent's piece.
    #[display("Cannot move a {} piece", _0)]
    OpponentPiece(Color),
}

impl std::error::Error for GateRejection {}

/// Checks every gate clause and reports the first that fails.
#[instrument(level = "debug")]
pub fn check(
    role: &Role,
    turns: &TurnState,
    board: BoardId,
    action: Action,
) -> Result<(), GateRejection> {
    if role.board != board {
        debug!("Rejected: wrong board");
        return Err(GateRejection::WrongBoard {
            assigned: role.board,
            attempted: board,
        });
    }

    let to_move = turns.get(board);
    if role.color != to_move {
        debug!(%to_move, "Rejected: not this color's turn");
        return Err(GateRejection::NotYourTurn { board, to_move });
    }

    if let Action::Move { piece_color } = action
        && piece_color != role.color
    {
        debug!(%piece_color, "Rejected: opponent's piece");
        return Err(GateRejection::OpponentPiece(piece_color));
    }

    Ok(())
}

/// Returns true if the local player may originate `action` on `board` now.
pub fn may_originate(role: &Role, turns: &TurnState, board: BoardId, action: Action) -> bool {
    check(role, turns, board, action).is_ok()
}
