//! Board occupancy and piece banks.
//!
//! A [`BoardState`] is plain data: it never decides whether a change is
//! allowed. Cross-board effects (crediting the partner board's bank) are
//! coordinated by the session, which owns both boards.

use crate::types::{Color, Piece, PieceKind, Square};
use tracing::instrument;

/// Multiset of droppable pieces for one `(board, color)`.
///
/// Arrival order is kept so the surface can show pieces in the order they
/// were credited; identity within a glyph is not tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceBank {
    pieces: Vec<Piece>,
}

impl PieceBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one piece.
    pub fn credit(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Removes one matching piece. Returns `false` if none was held.
    pub fn debit(&mut self, piece: Piece) -> bool {
        match self.pieces.iter().position(|p| *p == piece) {
            Some(slot) => {
                self.pieces.remove(slot);
                true
            }
            None => false,
        }
    }

    /// Returns true if at least one matching piece is held.
    pub fn contains(&self, piece: Piece) -> bool {
        self.pieces.contains(&piece)
    }

    /// Number of pieces matching `piece`.
    pub fn count(&self, piece: Piece) -> usize {
        self.pieces.iter().filter(|p| **p == piece).count()
    }

    /// All held pieces in arrival order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Total pieces held.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Returns true if the bank holds nothing.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// One physical board: 64 squares plus a bank per color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    squares: [Option<Piece>; 64],
    banks: [PieceBank; 2],
}

impl BoardState {
    /// An empty board with empty banks.
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
            banks: [PieceBank::new(), PieceBank::new()],
        }
    }

    /// The standard chess starting position with empty banks.
    #[instrument]
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, kind) in (0u8..).zip(BACK_RANK) {
            board.place(file, 0, Piece::new(Color::White, kind));
            board.place(file, 1, Piece::new(Color::White, PieceKind::Pawn));
            board.place(file, 6, Piece::new(Color::Black, PieceKind::Pawn));
            board.place(file, 7, Piece::new(Color::Black, kind));
        }
        board
    }

    fn place(&mut self, file: u8, rank: u8, piece: Piece) {
        if let Some(square) = Square::new(file, rank) {
            self.squares[square.index()] = Some(piece);
        }
    }

    /// Piece on `square`, if any.
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Overwrites `square`, returning the previous occupant.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.squares[square.index()], piece)
    }

    /// Empties `square`, returning its occupant.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.set(square, None)
    }

    /// Bank for `color` on this board.
    pub fn bank(&self, color: Color) -> &PieceBank {
        &self.banks[color.index()]
    }

    /// Mutable bank for `color` on this board.
    pub fn bank_mut(&mut self, color: Color) -> &mut PieceBank {
        &mut self.banks[color.index()]
    }

    /// Every occupied square with its piece, `a1` first.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Returns true if no square is occupied and both banks are empty.
    pub fn is_empty(&self) -> bool {
        self.squares.iter().all(Option::is_none) && self.banks.iter().all(PieceBank::is_empty)
    }

    /// Formats the board as text, rank 8 first, `.` for empty squares.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                let glyph = Square::new(file, rank)
                    .and_then(|sq| self.get(sq))
                    .map_or('.', Piece::glyph);
                result.push(glyph);
            }
            if rank > 0 {
                result.push('\n');
            }
        }
        result
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::empty()
    }
}
