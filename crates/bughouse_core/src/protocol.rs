//! Wire protocol: JSON objects tagged by a `type` field.
//!
//! [`ServerMessage`] flows from the authoritative side to clients,
//! [`ClientMessage`] the other way. Both directions encode and decode so the
//! room server and the client share one definition.

use crate::chat::ChatSender;
use crate::types::{BoardId, Color, Piece, Square, TeamId};
use derive_more::Display;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Errors raised while decoding or encoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CodecError {
    /// The frame is not a JSON object.
    #[display("Malformed frame: {}", _0)]
    Malformed(String),

    /// The object has no string `type` field.
    #[display("Frame has no type field")]
    MissingType,

    /// The `type` is not one this direction understands.
    #[display("Unknown message type: {}", _0)]
    UnknownType(String),

    /// The `type` is known but a field is missing or invalid.
    #[display("Invalid {} message: {}", kind, reason)]
    InvalidFields {
        /// The message type.
        kind: String,
        /// What serde reported.
        reason: String,
    },

    /// Serialization failed.
    #[display("Failed to encode message: {}", _0)]
    Encode(String),
}

impl std::error::Error for CodecError {}

/// Messages from the authoritative side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Seat assignment for the receiving client.
    Assignment {
        /// Team.
        team: TeamId,
        /// Board.
        board: BoardId,
        /// Color.
        color: Color,
    },

    /// Room occupancy changed.
    PlayerJoined {
        /// Seats taken, out of four.
        player_count: u8,
    },

    /// All four seats are taken; play begins.
    GameStart,

    /// Turn advanced on one board.
    TurnUpdate {
        /// Board whose turn changed.
        board: BoardId,
        /// Color now to move.
        next_turn: Color,
    },

    /// A piece was credited to the receiving player's bank.
    AddToBank {
        /// The credited piece.
        piece: Piece,
    },

    /// A piece moved on a board.
    Move {
        /// Origin square.
        from: Square,
        /// Destination square.
        to: Square,
        /// Board the move happened on.
        board: BoardId,
        /// Piece the mover reported capturing; informational only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        captured_piece: Option<Piece>,
    },

    /// A banked piece was dropped.
    Drop {
        /// The dropped piece.
        piece: Piece,
        /// Destination square.
        to: Square,
        /// Board the drop happened on.
        board: BoardId,
    },

    /// A chat message.
    Chat {
        /// Message text.
        message: String,
        /// Sender seat; absent for system messages.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_role: Option<ChatSender>,
    },

    /// Something went wrong (failed join, refused action).
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl ServerMessage {
    /// Every `type` tag this direction accepts.
    pub const KINDS: [&'static str; 9] = [
        "assignment",
        "player_joined",
        "game_start",
        "turn_update",
        "add_to_bank",
        "move",
        "drop",
        "chat",
        "error",
    ];

    /// Decodes one inbound frame.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        decode_tagged(text, &Self::KINDS)
    }

    /// Encodes for sending.
    pub fn encode(&self) -> Result<String, CodecError> {
        encode(self)
    }

    /// The wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Assignment { .. } => "assignment",
            ServerMessage::PlayerJoined { .. } => "player_joined",
            ServerMessage::GameStart => "game_start",
            ServerMessage::TurnUpdate { .. } => "turn_update",
            ServerMessage::AddToBank { .. } => "add_to_bank",
            ServerMessage::Move { .. } => "move",
            ServerMessage::Drop { .. } => "drop",
            ServerMessage::Chat { .. } => "chat",
            ServerMessage::Error { .. } => "error",
        }
    }
}

/// Messages from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request a seat in a room.
    Join {
        /// Room name.
        room: String,
    },

    /// Request a move. `captured_piece` is always written, `null` when the
    /// destination looked empty locally.
    Move {
        /// Origin square.
        from: Square,
        /// Destination square.
        to: Square,
        /// Board.
        board: BoardId,
        /// Piece on the destination as seen locally.
        #[serde(default)]
        captured_piece: Option<Piece>,
    },

    /// Request a drop from the bank.
    Drop {
        /// Piece to drop.
        piece: Piece,
        /// Destination square.
        to: Square,
        /// Board.
        board: BoardId,
    },

    /// Send a chat message.
    Chat {
        /// Message text.
        message: String,
    },
}

impl ClientMessage {
    /// Every `type` tag this direction accepts.
    pub const KINDS: [&'static str; 4] = ["join", "move", "drop", "chat"];

    /// Decodes one frame received from a client.
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        decode_tagged(text, &Self::KINDS)
    }

    /// Encodes for sending.
    pub fn encode(&self) -> Result<String, CodecError> {
        encode(self)
    }
}

#[instrument(level = "debug", skip(text, kinds), fields(len = text.len()))]
fn decode_tagged<T: DeserializeOwned>(text: &str, kinds: &[&str]) -> Result<T, CodecError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))?;

    if !value.is_object() {
        return Err(CodecError::Malformed("expected a JSON object".to_string()));
    }

    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(CodecError::MissingType)?
        .to_string();

    if !kinds.contains(&kind.as_str()) {
        return Err(CodecError::UnknownType(kind));
    }

    debug!(%kind, "Decoding frame");
    serde_json::from_value(value).map_err(|e| CodecError::InvalidFields {
        kind,
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(message: &T) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(|e| CodecError::Encode(e.to_string()))
}
