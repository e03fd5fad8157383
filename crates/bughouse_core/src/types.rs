//! Core domain types for bughouse: identifiers, colors, squares and pieces.
//!
//! Everything here is `Copy` and validated on construction, so the rest of
//! the crate never re-checks ranges or parses strings.

use derive_more::Display;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;
use strum::EnumIter;

/// Error produced when a wire value cannot be turned into a domain type.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseError {
    /// Board id outside `{1, 2}`.
    #[display("Invalid board id: {}", _0)]
    InvalidBoard(String),

    /// Team id outside `{1, 2}`.
    #[display("Invalid team id: {}", _0)]
    InvalidTeam(String),

    /// Color other than `white` / `black`.
    #[display("Invalid color: {}", _0)]
    InvalidColor(String),

    /// Square outside `a1..h8`.
    #[display("Invalid square: {}", _0)]
    InvalidSquare(String),

    /// Text that is not one of the twelve piece glyphs.
    #[display("Invalid piece: {}", _0)]
    InvalidPiece(String),
}

impl std::error::Error for ParseError {}

/// Numeric id as it appears on the wire: `1` or `"1"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Identifiers
// ─────────────────────────────────────────────────────────────

/// One of the two physical boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum BoardId {
    /// Board 1.
    #[display("1")]
    One,
    /// Board 2.
    #[display("2")]
    Two,
}

impl BoardId {
    /// Both boards, in order.
    pub const ALL: [BoardId; 2] = [BoardId::One, BoardId::Two];

    /// Returns the wire number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            BoardId::One => 1,
            BoardId::Two => 2,
        }
    }

    /// Zero-based index for array lookups.
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    /// The partner board.
    pub fn other(self) -> Self {
        match self {
            BoardId::One => BoardId::Two,
            BoardId::Two => BoardId::One,
        }
    }
}

impl TryFrom<u8> for BoardId {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BoardId::One),
            2 => Ok(BoardId::Two),
            other => Err(ParseError::InvalidBoard(other.to_string())),
        }
    }
}

impl FromStr for BoardId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidBoard(s.to_string()))
            .and_then(BoardId::try_from)
    }
}

impl Serialize for BoardId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for BoardId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer)?
            .into_text()
            .parse()
            .map_err(de::Error::custom)
    }
}

/// One of the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum TeamId {
    /// Team 1.
    #[display("1")]
    One,
    /// Team 2.
    #[display("2")]
    Two,
}

impl TeamId {
    /// Returns the wire number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            TeamId::One => 1,
            TeamId::Two => 2,
        }
    }
}

impl FromStr for TeamId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(TeamId::One),
            "2" => Ok(TeamId::Two),
            _ => Err(ParseError::InvalidTeam(s.to_string())),
        }
    }
}

impl Serialize for TeamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for TeamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer)?
            .into_text()
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Side color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// White (moves first on both boards).
    #[default]
    #[display("white")]
    White,
    /// Black.
    #[display("black")]
    Black,
}

impl Color {
    /// Returns the other color.
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Zero-based index for array lookups.
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(ParseError::InvalidColor(s.to_string())),
        }
    }
}

/// A player's fixed seat: team, board and color.
///
/// Assigned once per session by the remote side and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("Team {}, Board {} ({})", team, board, color)]
pub struct Role {
    /// Team the player belongs to.
    pub team: TeamId,
    /// Board the player sits at.
    pub board: BoardId,
    /// Color the player commands on that board.
    pub color: Color,
}

impl Role {
    /// Creates a role.
    pub fn new(team: TeamId, board: BoardId, color: Color) -> Self {
        Self { team, board, color }
    }

    /// The seat of this player's teammate: the other board, opposite color.
    pub fn partner(self) -> Self {
        Self {
            team: self.team,
            board: self.board.other(),
            color: self.color.opposite(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Squares
// ─────────────────────────────────────────────────────────────

/// A square on one board, `a1` through `h8`.
///
/// File and rank are stored zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Creates a square from zero-based file and rank, if both are on the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Row-major index 0..64 with `a1` = 0.
    pub fn index(self) -> usize {
        usize::from(self.rank) * 8 + usize::from(self.file)
    }

    /// All 64 squares, `a1`, `b1`, … `h8`.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square { file, rank }))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file), self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        let invalid = || ParseError::InvalidSquare(s.to_string());
        let [file, rank] = bytes else {
            return Err(invalid());
        };
        let file = file.to_ascii_lowercase();
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(rank) {
            return Err(invalid());
        }
        Ok(Square {
            file: file - b'a',
            rank: rank - b'1',
        })
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────
//  Pieces
// ─────────────────────────────────────────────────────────────

/// Kind of chess piece, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PieceKind {
    /// King.
    King,
    /// Queen.
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight.
    Knight,
    /// Pawn.
    Pawn,
}

impl PieceKind {
    /// Parses an English piece letter (`K Q R B N P`, any case).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'P' => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

/// A piece, identified on the wire by its Unicode glyph.
///
/// The glyph alone determines the color: `♔♕♖♗♘♙` are white,
/// `♚♛♜♝♞♟` are black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
}

const WHITE_GLYPHS: [char; 6] = ['♔', '♕', '♖', '♗', '♘', '♙'];
const BLACK_GLYPHS: [char; 6] = ['♚', '♛', '♜', '♝', '♞', '♟'];
const KIND_ORDER: [PieceKind; 6] = [
    PieceKind::King,
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Pawn,
];

impl Piece {
    /// Creates a piece.
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Color implied by the glyph.
    pub fn color(self) -> Color {
        self.color
    }

    /// Piece kind.
    pub fn kind(self) -> PieceKind {
        self.kind
    }

    /// The Unicode glyph for this piece.
    pub fn glyph(self) -> char {
        let slot = KIND_ORDER
            .iter()
            .position(|k| *k == self.kind)
            .unwrap_or_default();
        match self.color {
            Color::White => WHITE_GLYPHS[slot],
            Color::Black => BLACK_GLYPHS[slot],
        }
    }

    /// Looks up a piece by glyph.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        if let Some(slot) = WHITE_GLYPHS.iter().position(|g| *g == glyph) {
            return Some(Self::new(Color::White, KIND_ORDER[slot]));
        }
        BLACK_GLYPHS
            .iter()
            .position(|g| *g == glyph)
            .map(|slot| Self::new(Color::Black, KIND_ORDER[slot]))
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl FromStr for Piece {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(glyph), None) => {
                Piece::from_glyph(glyph).ok_or_else(|| ParseError::InvalidPiece(s.to_string()))
            }
            _ => Err(ParseError::InvalidPiece(s.to_string())),
        }
    }
}

impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_glyph_maps_back_to_itself() {
        for color in Color::iter() {
            for kind in PieceKind::iter() {
                let piece = Piece::new(color, kind);
                assert_eq!(Piece::from_glyph(piece.glyph()), Some(piece));
            }
        }
    }

    #[test]
    fn test_square_parsing_bounds() {
        assert_eq!("a1".parse::<Square>().map(Square::index), Ok(0));
        assert_eq!("h8".parse::<Square>().map(Square::index), Ok(63));
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a10".parse::<Square>().is_err());
    }

    #[test]
    fn test_partner_is_other_board_opposite_color() {
        let role = Role::new(TeamId::One, BoardId::One, Color::White);
        let partner = role.partner();
        assert_eq!(partner.board, BoardId::Two);
        assert_eq!(partner.color, Color::Black);
        assert_eq!(partner.team, TeamId::One);
    }
}
