//! View model the terminal draws from.

use bughouse_core::{BoardId, Color, Piece, RenderInstruction, Role, Square, View};
use derive_getters::Getters;
use tracing::{debug, trace};

/// Chat lines kept for display.
const CHAT_HISTORY: usize = 200;

/// Everything the terminal shows, updated one render instruction at a time.
#[derive(Debug, Clone, Getters)]
pub struct TerminalSurface {
    /// Current screen.
    view: View,
    /// Status line text.
    status: String,
    /// Local seat, once assigned.
    assignment: Option<Role>,
    /// Whether `/join` is currently accepted.
    join_enabled: bool,
    /// `(sender label, text)` pairs, oldest first.
    chat: Vec<(String, String)>,
    /// Text typed but not yet submitted.
    input: String,
    #[getter(skip)]
    squares: [[Option<Piece>; 64]; 2],
    #[getter(skip)]
    banks: [[Vec<Piece>; 2]; 2],
    #[getter(skip)]
    local_turn: [bool; 2],
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self {
            view: View::Lobby,
            status: "Connecting...".to_string(),
            assignment: None,
            join_enabled: false,
            chat: Vec::new(),
            input: String::new(),
            squares: [[None; 64]; 2],
            banks: Default::default(),
            local_turn: [false; 2],
        }
    }
}

impl TerminalSurface {
    /// A lobby screen waiting for the connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one render instruction.
    pub fn apply(&mut self, instruction: RenderInstruction) {
        trace!(?instruction, "Render");
        match instruction {
            RenderInstruction::Board {
                board,
                square,
                piece,
            } => self.squares[board.index()][square.index()] = piece,
            RenderInstruction::Bank {
                board,
                color,
                pieces,
            } => self.banks[board.index()][color.index()] = pieces,
            RenderInstruction::TurnIndicator {
                board,
                is_local_turn,
            } => self.local_turn[board.index()] = is_local_turn,
            RenderInstruction::ChatLine { sender_label, text } => {
                self.chat.push((sender_label, text));
                if self.chat.len() > CHAT_HISTORY {
                    let excess = self.chat.len() - CHAT_HISTORY;
                    self.chat.drain(..excess);
                }
            }
            RenderInstruction::ShowView(view) => {
                debug!(?view, "Switching view");
                self.view = view;
            }
            RenderInstruction::Status(text) => self.status = text,
            RenderInstruction::JoinEnabled(enabled) => self.join_enabled = enabled,
            RenderInstruction::Assignment(role) => {
                self.status = format!("You are {role}");
                self.assignment = Some(role);
            }
        }
    }

    /// Occupant of one square.
    pub fn piece_at(&self, board: BoardId, square: Square) -> Option<Piece> {
        self.squares[board.index()][square.index()]
    }

    /// Contents of one bank.
    pub fn bank(&self, board: BoardId, color: Color) -> &[Piece] {
        &self.banks[board.index()][color.index()]
    }

    /// Whether the local player is to move on `board`.
    pub fn is_local_turn(&self, board: BoardId) -> bool {
        self.local_turn[board.index()]
    }

    /// Shows a client-side message in the status line.
    pub fn notice(&mut self, text: impl Into<String>) {
        self.status = text.into();
    }

    /// Appends a typed character.
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Removes the last typed character.
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Returns the typed line and clears the input.
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }
}
