//! Append-only chat log.

use crate::types::{BoardId, Color, Role, TeamId};
use serde::{Deserialize, Serialize};

/// Seat of a chat sender as carried on the wire.
///
/// Only team and board are displayed, so `color` may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatSender {
    /// Sender's team.
    pub team: TeamId,
    /// Sender's board.
    pub board: BoardId,
    /// Sender's color, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl From<Role> for ChatSender {
    fn from(role: Role) -> Self {
        Self {
            team: role.team,
            board: role.board,
            color: Some(role.color),
        }
    }
}

/// One displayed chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    sender: Option<ChatSender>,
    text: String,
}

impl ChatEntry {
    /// Seat of the sender, or `None` for system messages.
    pub fn sender(&self) -> Option<ChatSender> {
        self.sender
    }

    /// Message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label shown before the text: `Team 1, Board 2` or `System`.
    pub fn sender_label(&self) -> String {
        sender_label(self.sender)
    }
}

/// Formats a sender the way chat lines display it.
pub fn sender_label(sender: Option<ChatSender>) -> String {
    match sender {
        Some(seat) => format!("Team {}, Board {}", seat.team, seat.board),
        None => "System".to_string(),
    }
}

/// Ordered log of received chat messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message. Empty text is refused and `None` is returned.
    pub fn append(&mut self, sender: Option<ChatSender>, text: impl Into<String>) -> Option<&ChatEntry> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }
        self.entries.push(ChatEntry { sender, text });
        self.entries.last()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
