//! Input-line parsing.
//!
//! Turns one submitted line into an engine intent. Parse failures never reach
//! the engine; the caller shows them in the status line.

use bughouse_core::{BoardId, BoardSquare, Intent, ParseError, Piece, PieceKind, Role, Square};
use derive_more::{Display, From};

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand to the engine.
    Intent(Intent),
    /// Leave the client.
    Quit,
}

/// Why an input line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum CommandError {
    /// Slash command nobody knows.
    #[display("Unknown command: {}", _0)]
    Unknown(String),

    /// Wrong number of arguments.
    #[display("Usage: {}", _0)]
    Usage(&'static str),

    /// A board, square or piece did not parse.
    #[display("{}", _0)]
    #[from]
    Parse(ParseError),

    /// Board or piece color depends on a seat the player does not have yet.
    #[display("Join a room first")]
    NoSeat,
}

impl std::error::Error for CommandError {}

const JOIN_USAGE: &str = "/join <room>";
const MOVE_USAGE: &str = "/move [board] <from> <to>";
const DROP_USAGE: &str = "/drop [board] <piece> <square>";

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// Unslashed text reads as a move (`e2e4`, `e2 e4`) only once a seat is held;
/// before that it is chat.
pub fn parse_command(line: &str, role: Option<Role>) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        if role.is_some()
            && let Some((from, to)) = bare_move(trimmed)
        {
            return move_intent(role, None, from, to).map(Some);
        }
        return Ok(Some(Command::Intent(Intent::Chat {
            text: trimmed.to_string(),
        })));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let tokens: Vec<&str> = args.split_whitespace().collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "quit" => Command::Quit,
        "join" => {
            if args.is_empty() {
                return Err(CommandError::Usage(JOIN_USAGE));
            }
            Command::Intent(Intent::Join {
                room: args.to_string(),
            })
        }
        "move" | "m" => match tokens.as_slice() {
            [from, to] => move_intent(role, None, from.parse()?, to.parse()?)?,
            [board, from, to] => {
                move_intent(role, Some(board.parse()?), from.parse()?, to.parse()?)?
            }
            _ => return Err(CommandError::Usage(MOVE_USAGE)),
        },
        "drop" | "d" => match tokens.as_slice() {
            [piece, square] => drop_intent(role, None, piece, square.parse()?)?,
            [board, piece, square] => {
                drop_intent(role, Some(board.parse()?), piece, square.parse()?)?
            }
            _ => return Err(CommandError::Usage(DROP_USAGE)),
        },
        other => return Err(CommandError::Unknown(format!("/{other}"))),
    };
    Ok(Some(command))
}

/// `e2e4` or `e2 e4`.
fn bare_move(text: &str) -> Option<(Square, Square)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [from, to] => Some((from.parse().ok()?, to.parse().ok()?)),
        [joined] if joined.len() == 4 && joined.is_ascii() => {
            let (from, to) = joined.split_at(2);
            Some((from.parse().ok()?, to.parse().ok()?))
        }
        _ => None,
    }
}

fn seat_board(role: Option<Role>, board: Option<BoardId>) -> Result<BoardId, CommandError> {
    match (board, role) {
        (Some(board), _) => Ok(board),
        (None, Some(role)) => Ok(role.board),
        (None, None) => Err(CommandError::NoSeat),
    }
}

fn move_intent(
    role: Option<Role>,
    board: Option<BoardId>,
    from: Square,
    to: Square,
) -> Result<Command, CommandError> {
    let board = seat_board(role, board)?;
    Ok(Command::Intent(Intent::Move {
        from: BoardSquare::new(board, from),
        to: BoardSquare::new(board, to),
    }))
}

fn drop_intent(
    role: Option<Role>,
    board: Option<BoardId>,
    piece: &str,
    square: Square,
) -> Result<Command, CommandError> {
    let board = seat_board(role, board)?;
    let piece = parse_piece(piece, role)?;
    Ok(Command::Intent(Intent::Drop {
        bank: board,
        piece,
        to: BoardSquare::new(board, square),
    }))
}

/// A glyph, or a letter resolved to the local color.
fn parse_piece(text: &str, role: Option<Role>) -> Result<Piece, CommandError> {
    let mut chars = text.chars();
    if let (Some(letter), None) = (chars.next(), chars.next())
        && let Some(kind) = PieceKind::from_letter(letter)
    {
        let role = role.ok_or(CommandError::NoSeat)?;
        return Ok(Piece::new(role.color, kind));
    }
    Ok(text.parse()?)
}
