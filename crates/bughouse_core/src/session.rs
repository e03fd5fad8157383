//! The session aggregate: connection phase, role, turns, boards and chat.
//!
//! Every mutator is crate-private. The synchronization engine is the only
//! writer; everyone else gets a shared reference.

use crate::board::BoardState;
use crate::chat::ChatLog;
use crate::turn::TurnState;
use crate::types::{BoardId, Color, Piece, Role, Square};
use derive_more::Display;
use tracing::{debug, info, instrument, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Display)]
pub enum ConnectionPhase {
    /// No transport.
    #[default]
    #[display("disconnected")]
    Disconnected,
    /// Transport open, not in a room.
    #[display("connected")]
    Connected,
    /// Join sent, waiting for a seat.
    #[display("joining {}", _0)]
    Joining(String),
    /// Seated, waiting for the room to fill.
    #[display("in lobby ({}/4)", _0)]
    InLobby(u8),
    /// Playing.
    #[display("in game")]
    InGame,
}

/// Result of applying a move to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// The piece that moved; `None` if the origin square was empty.
    pub moved: Option<Piece>,
    /// The piece that stood on the destination before the move.
    pub captured: Option<Piece>,
}

/// Result of applying a drop to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropOutcome {
    /// The piece overwritten on the destination square.
    pub replaced: Option<Piece>,
    /// Color of the bank a matching piece was taken out of, if any.
    pub debited: Option<Color>,
}

/// Root aggregate for one client connection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    phase: ConnectionPhase,
    role: Option<Role>,
    turns: TurnState,
    boards: [BoardState; 2],
    chat: ChatLog,
}

impl Session {
    /// A fresh, disconnected session.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating session");
        Self::default()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> &ConnectionPhase {
        &self.phase
    }

    /// Assigned role, once seated.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Turn state for both boards.
    pub fn turns(&self) -> &TurnState {
        &self.turns
    }

    /// One board.
    pub fn board(&self, board: BoardId) -> &BoardState {
        &self.boards[board.index()]
    }

    /// Received chat messages.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Returns true if `board` is the local role's board and its color is to move.
    pub fn is_local_turn(&self, board: BoardId) -> bool {
        self.role
            .is_some_and(|role| role.board == board && self.turns.get(board) == role.color)
    }

    // ─────────────────────────────────────────────────────────────
    //  Lifecycle transitions
    // ─────────────────────────────────────────────────────────────

    #[instrument(skip(self), fields(phase = %self.phase))]
    pub(crate) fn open(&mut self) {
        if self.phase == ConnectionPhase::Disconnected {
            info!("Transport opened");
            self.phase = ConnectionPhase::Connected;
        }
    }

    /// Discards everything: role, turns, boards and chat.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub(crate) fn close(&mut self) {
        info!("Transport closed, resetting session");
        *self = Self::default();
    }

    pub(crate) fn begin_join(&mut self, room: String) {
        info!(%room, "Joining room");
        self.phase = ConnectionPhase::Joining(room);
    }

    pub(crate) fn abort_join(&mut self) {
        if let ConnectionPhase::Joining(room) = &self.phase {
            info!(%room, "Join failed");
            self.phase = ConnectionPhase::Connected;
        }
    }

    /// Records the role. A role is never replaced once set, and none is
    /// taken without an open transport.
    pub(crate) fn assign(&mut self, role: Role) -> bool {
        if self.phase == ConnectionPhase::Disconnected {
            warn!(offered = %role, "Ignoring assignment while disconnected");
            return false;
        }
        if let Some(existing) = self.role {
            warn!(%existing, offered = %role, "Ignoring reassignment");
            return false;
        }
        info!(%role, "Role assigned");
        self.role = Some(role);
        if self.phase != ConnectionPhase::InGame {
            self.phase = ConnectionPhase::InLobby(0);
        }
        true
    }

    pub(crate) fn set_player_count(&mut self, count: u8) -> bool {
        match &mut self.phase {
            ConnectionPhase::InLobby(current) => {
                *current = count;
                true
            }
            _ => false,
        }
    }

    /// Standard position on both boards, white to move everywhere.
    pub(crate) fn start_game(&mut self) {
        info!(previous = %self.phase, "Game starting");
        self.boards = [BoardState::standard(), BoardState::standard()];
        self.turns = TurnState::new();
        self.phase = ConnectionPhase::InGame;
    }

    // ─────────────────────────────────────────────────────────────
    //  Board and bank mutation
    // ─────────────────────────────────────────────────────────────

    pub(crate) fn set_turn(&mut self, board: BoardId, color: Color) {
        self.turns.set(board, color);
    }

    /// Relocates the piece on `from` to `to`. The destination's previous
    /// occupant leaves the board and is reported, not credited.
    pub(crate) fn apply_move(&mut self, board: BoardId, from: Square, to: Square) -> MoveOutcome {
        let state = &mut self.boards[board.index()];
        let Some(moved) = state.take(from) else {
            return MoveOutcome::default();
        };
        let captured = state.set(to, Some(moved));
        MoveOutcome {
            moved: Some(moved),
            captured,
        }
    }

    /// Places `piece` on `to` and takes one matching piece out of a bank on
    /// that board: the side to move first, then the other side.
    pub(crate) fn apply_drop(&mut self, board: BoardId, piece: Piece, to: Square) -> DropOutcome {
        let mover = self.turns.get(board);
        let state = &mut self.boards[board.index()];
        let replaced = state.set(to, Some(piece));
        let debited = [mover, mover.opposite()]
            .into_iter()
            .find(|color| state.bank_mut(*color).debit(piece));
        DropOutcome { replaced, debited }
    }

    pub(crate) fn credit_bank(&mut self, board: BoardId, color: Color, piece: Piece) {
        self.boards[board.index()].bank_mut(color).credit(piece);
    }

    pub(crate) fn chat_mut(&mut self) -> &mut ChatLog {
        &mut self.chat
    }
}
