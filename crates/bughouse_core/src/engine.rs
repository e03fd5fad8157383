//! Synchronization engine: the single writer of the [`Session`].
//!
//! Inbound authoritative messages are applied unconditionally and turned into
//! render instructions. Local intents go through the turn gate and, when
//! accepted, become outbound messages only: the board changes when the
//! matching authoritative event comes back, never before.

use crate::chat::{ChatSender, sender_label};
use crate::protocol::{ClientMessage, CodecError, ServerMessage};
use crate::session::{ConnectionPhase, Session};
use crate::turn::{self, Action, GateRejection};
use crate::types::{BoardId, Color, Piece, Role, Square};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Which single path is allowed to put pieces into banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankAuthority {
    /// Only inbound `add_to_bank` credits banks; captures are reported but not credited.
    #[default]
    #[display("event")]
    Event,
    /// Captures seen in inbound moves credit the partner board; `add_to_bank` is ignored.
    #[display("capture")]
    Capture,
}

/// Screen the rendering surface should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Room entry and waiting.
    Lobby,
    /// Both boards, banks and chat.
    Game,
}

/// An instruction for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// Draw one square.
    Board {
        /// Board.
        board: BoardId,
        /// Square.
        square: Square,
        /// Occupant, or `None` for empty.
        piece: Option<Piece>,
    },
    /// Redraw one bank.
    Bank {
        /// Board.
        board: BoardId,
        /// Bank color.
        color: Color,
        /// Full bank contents.
        pieces: Vec<Piece>,
    },
    /// Mark whether the local player is to move on `board`.
    TurnIndicator {
        /// Board.
        board: BoardId,
        /// True when the local role's color is to move on this board.
        is_local_turn: bool,
    },
    /// Append a chat line.
    ChatLine {
        /// `Team n, Board m` or `System`.
        sender_label: String,
        /// Message text.
        text: String,
    },
    /// Switch screens.
    ShowView(View),
    /// Replace the status line.
    Status(String),
    /// Enable or disable the join control.
    JoinEnabled(bool),
    /// Show the local player's seat.
    Assignment(Role),
}

/// Something the engine wants done outside itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send to the remote side.
    Send(ClientMessage),
    /// Instruct the rendering surface.
    Render(RenderInstruction),
}

/// Transport lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Opened,
    /// Connection lost or closed.
    Closed,
}

/// A square together with the board it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSquare {
    /// Board.
    pub board: BoardId,
    /// Square on that board.
    pub square: Square,
}

impl BoardSquare {
    /// Creates a board-scoped square.
    pub fn new(board: BoardId, square: Square) -> Self {
        Self { board, square }
    }
}

/// Something the local player attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Ask for a seat in `room`.
    Join {
        /// Room name.
        room: String,
    },
    /// Move the piece on `from` to `to`.
    Move {
        /// Origin.
        from: BoardSquare,
        /// Destination.
        to: BoardSquare,
    },
    /// Drop `piece` from the bank on board `bank` onto `to`.
    Drop {
        /// Board whose bank the piece comes from.
        bank: BoardId,
        /// Piece to drop.
        piece: Piece,
        /// Destination.
        to: BoardSquare,
    },
    /// Send a chat message.
    Chat {
        /// Message text.
        text: String,
    },
}

/// Why a local intent produced no effect.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum IntentError {
    /// The turn gate refused the action.
    #[display("{}", _0)]
    #[from]
    Gate(GateRejection),

    /// No transport.
    #[display("Not connected")]
    Disconnected,

    /// Join is only possible while connected and not in a room.
    #[display("Cannot join while {}", _0)]
    JoinUnavailable(ConnectionPhase),

    /// Room name was blank.
    #[display("Room name is empty")]
    EmptyRoom,

    /// Chat text was blank.
    #[display("Message is empty")]
    EmptyChat,

    /// Moves and drops need a seated player in a running game.
    #[display("No game in progress")]
    NotInGame,

    /// Destination lies on a different board than the action.
    #[display("Destination is on board {}, not board {}", actual, expected)]
    CrossBoard {
        /// Board the action belongs to.
        expected: BoardId,
        /// Board of the destination square.
        actual: BoardId,
    },

    /// Nothing to move on the origin square.
    #[display("No piece on {}", _0)]
    EmptySquare(Square),

    /// The bank does not hold the piece.
    #[display("No {} in the bank", _0)]
    NotInBank(Piece),
}

impl std::error::Error for IntentError {}

/// Owns the session and translates events into effects.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    session: Session,
    authority: BankAuthority,
}

impl SyncEngine {
    /// Creates an engine with a fresh, disconnected session.
    #[instrument]
    pub fn new(authority: BankAuthority) -> Self {
        info!(%authority, "Creating sync engine");
        Self {
            session: Session::new(),
            authority,
        }
    }

    /// Read-only view of the session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    // ─────────────────────────────────────────────────────────────
    //  Transport
    // ─────────────────────────────────────────────────────────────

    /// Applies a transport lifecycle change.
    #[instrument(skip(self), fields(phase = %self.session.phase()))]
    pub fn handle_transport(&mut self, event: TransportEvent) -> Vec<Effect> {
        match event {
            TransportEvent::Opened => {
                self.session.open();
                vec![
                    render(RenderInstruction::ShowView(View::Lobby)),
                    render(RenderInstruction::Status(
                        "Connected. Enter a room name to join.".to_string(),
                    )),
                    render(RenderInstruction::JoinEnabled(true)),
                ]
            }
            TransportEvent::Closed => {
                self.session.close();
                vec![
                    render(RenderInstruction::ShowView(View::Lobby)),
                    render(RenderInstruction::Status(
                        "Disconnected. Restart to rejoin.".to_string(),
                    )),
                    render(RenderInstruction::JoinEnabled(false)),
                ]
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Inbound
    // ─────────────────────────────────────────────────────────────

    /// Decodes and applies one inbound frame.
    ///
    /// # Errors
    ///
    /// Returns the codec error for malformed or unknown frames; the session
    /// is left untouched in that case.
    pub fn handle_frame(&mut self, text: &str) -> Result<Vec<Effect>, CodecError> {
        let message = ServerMessage::decode(text).map_err(|e| {
            warn!(error = %e, "Ignoring inbound frame");
            e
        })?;
        Ok(self.handle_inbound(message))
    }

    /// Applies one authoritative message.
    #[instrument(skip(self, message), fields(kind = message.kind(), phase = %self.session.phase()))]
    pub fn handle_inbound(&mut self, message: ServerMessage) -> Vec<Effect> {
        match message {
            ServerMessage::Assignment { team, board, color } => {
                self.on_assignment(Role::new(team, board, color))
            }
            ServerMessage::PlayerJoined { player_count } => self.on_player_joined(player_count),
            ServerMessage::GameStart => self.on_game_start(),
            ServerMessage::TurnUpdate { board, next_turn } => self.set_turn(board, next_turn),
            ServerMessage::AddToBank { piece } => self.on_add_to_bank(piece),
            ServerMessage::Move {
                from, to, board, ..
            } => self.apply_move(board, from, to),
            ServerMessage::Drop { piece, to, board } => self.apply_drop(board, piece, to),
            ServerMessage::Chat {
                message,
                sender_role,
            } => self.on_chat(sender_role, message),
            ServerMessage::Error { message } => self.on_error(message),
        }
    }

    fn on_assignment(&mut self, role: Role) -> Vec<Effect> {
        if !self.session.assign(role) {
            return Vec::new();
        }
        vec![render(RenderInstruction::Assignment(role))]
    }

    fn on_player_joined(&mut self, count: u8) -> Vec<Effect> {
        if !self.session.set_player_count(count) {
            debug!(count, "Occupancy update outside lobby");
        }
        vec![render(RenderInstruction::Status(format!(
            "Room has {count} / 4 players. Waiting..."
        )))]
    }

    fn on_game_start(&mut self) -> Vec<Effect> {
        if !matches!(self.session.phase(), ConnectionPhase::InLobby(_)) {
            warn!(phase = %self.session.phase(), "Game start outside lobby");
        }
        self.session.start_game();

        let mut effects = vec![render(RenderInstruction::ShowView(View::Game))];
        for board in BoardId::ALL {
            let state = self.session.board(board);
            effects.extend(Square::all().map(|square| {
                render(RenderInstruction::Board {
                    board,
                    square,
                    piece: state.get(square),
                })
            }));
            for color in [Color::White, Color::Black] {
                effects.push(self.bank_instruction(board, color));
            }
        }
        effects.extend(self.turn_indicators());
        effects
    }

    fn on_add_to_bank(&mut self, piece: Piece) -> Vec<Effect> {
        if self.authority == BankAuthority::Capture {
            debug!(%piece, "Bank event ignored under capture authority");
            return Vec::new();
        }
        let Some(role) = self.session.role() else {
            warn!(%piece, "Bank credit before assignment");
            return Vec::new();
        };
        self.credit_bank(role.board, role.color, piece)
    }

    fn on_chat(&mut self, sender: Option<ChatSender>, text: String) -> Vec<Effect> {
        if self.session.chat_mut().append(sender, text.clone()).is_none() {
            warn!("Ignoring empty chat message");
            return Vec::new();
        }
        vec![render(RenderInstruction::ChatLine {
            sender_label: sender_label(sender),
            text,
        })]
    }

    fn on_error(&mut self, message: String) -> Vec<Effect> {
        warn!(%message, "Remote error");
        let mut effects = vec![render(RenderInstruction::Status(format!("Error: {message}")))];
        if matches!(self.session.phase(), ConnectionPhase::Joining(_)) {
            self.session.abort_join();
            effects.push(render(RenderInstruction::JoinEnabled(true)));
        }
        effects
    }

    /// Relocates a piece; a captured piece is credited to the partner board
    /// under capture authority.
    #[instrument(skip(self))]
    pub fn apply_move(&mut self, board: BoardId, from: Square, to: Square) -> Vec<Effect> {
        let outcome = self.session.apply_move(board, from, to);
        let Some(moved) = outcome.moved else {
            debug!("Origin square empty, nothing moved");
            return Vec::new();
        };

        let mut effects = vec![
            render(RenderInstruction::Board {
                board,
                square: from,
                piece: None,
            }),
            render(RenderInstruction::Board {
                board,
                square: to,
                piece: Some(moved),
            }),
        ];

        if let Some(captured) = outcome.captured {
            match self.authority {
                BankAuthority::Capture => {
                    effects.extend(self.credit_bank(
                        board.other(),
                        moved.color().opposite(),
                        captured,
                    ));
                }
                BankAuthority::Event => {
                    debug!(%captured, "Capture left to bank events");
                }
            }
        }
        effects
    }

    /// Places a dropped piece, overwriting the destination.
    #[instrument(skip(self))]
    pub fn apply_drop(&mut self, board: BoardId, piece: Piece, to: Square) -> Vec<Effect> {
        let outcome = self.session.apply_drop(board, piece, to);
        if let Some(replaced) = outcome.replaced {
            debug!(%replaced, "Drop overwrote an occupied square");
        }
        let mut effects = vec![render(RenderInstruction::Board {
            board,
            square: to,
            piece: Some(piece),
        })];
        if let Some(color) = outcome.debited {
            effects.push(self.bank_instruction(board, color));
        }
        effects
    }

    /// Adds a piece to one bank.
    #[instrument(skip(self))]
    pub fn credit_bank(&mut self, board: BoardId, color: Color, piece: Piece) -> Vec<Effect> {
        self.session.credit_bank(board, color, piece);
        vec![self.bank_instruction(board, color)]
    }

    /// Records whose turn it is on `board` and refreshes the indicators.
    #[instrument(skip(self))]
    pub fn set_turn(&mut self, board: BoardId, color: Color) -> Vec<Effect> {
        self.session.set_turn(board, color);
        self.turn_indicators().collect()
    }

    fn bank_instruction(&self, board: BoardId, color: Color) -> Effect {
        render(RenderInstruction::Bank {
            board,
            color,
            pieces: self.session.board(board).bank(color).pieces().to_vec(),
        })
    }

    fn turn_indicators(&self) -> impl Iterator<Item = Effect> + '_ {
        BoardId::ALL.into_iter().map(|board| {
            render(RenderInstruction::TurnIndicator {
                board,
                is_local_turn: self.session.is_local_turn(board),
            })
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Local intents
    // ─────────────────────────────────────────────────────────────

    /// Validates a local intent and returns the outbound effects.
    ///
    /// Never mutates boards, banks or turns.
    ///
    /// # Errors
    ///
    /// Returns why the intent was dropped. Callers treat this as a silent
    /// no-op; the error exists for logging.
    #[instrument(skip(self), fields(phase = %self.session.phase()))]
    pub fn handle_intent(&mut self, intent: Intent) -> Result<Vec<Effect>, IntentError> {
        let result = match intent {
            Intent::Join { room } => self.attempt_join(room),
            Intent::Move { from, to } => self.attempt_move(from, to),
            Intent::Drop { bank, piece, to } => self.attempt_drop(bank, piece, to),
            Intent::Chat { text } => self.attempt_chat(text),
        };
        if let Err(e) = &result {
            debug!(reason = %e, "Intent rejected");
        }
        result
    }

    fn attempt_join(&mut self, room: String) -> Result<Vec<Effect>, IntentError> {
        let room = room.trim().to_string();
        if room.is_empty() {
            return Err(IntentError::EmptyRoom);
        }
        if *self.session.phase() != ConnectionPhase::Connected {
            return Err(IntentError::JoinUnavailable(self.session.phase().clone()));
        }
        self.session.begin_join(room.clone());
        Ok(vec![
            Effect::Send(ClientMessage::Join { room: room.clone() }),
            render(RenderInstruction::Status(format!("Joining room: {room}..."))),
            render(RenderInstruction::JoinEnabled(false)),
        ])
    }

    fn seated_in_game(&self) -> Result<Role, IntentError> {
        match (self.session.phase(), self.session.role()) {
            (ConnectionPhase::InGame, Some(role)) => Ok(role),
            _ => Err(IntentError::NotInGame),
        }
    }

    fn attempt_move(&self, from: BoardSquare, to: BoardSquare) -> Result<Vec<Effect>, IntentError> {
        let role = self.seated_in_game()?;
        let board = self.session.board(from.board);
        let piece = board
            .get(from.square)
            .ok_or(IntentError::EmptySquare(from.square))?;

        turn::check(
            &role,
            self.session.turns(),
            from.board,
            Action::Move {
                piece_color: piece.color(),
            },
        )?;

        if to.board != from.board {
            return Err(IntentError::CrossBoard {
                expected: from.board,
                actual: to.board,
            });
        }

        Ok(vec![Effect::Send(ClientMessage::Move {
            from: from.square,
            to: to.square,
            board: from.board,
            captured_piece: board.get(to.square),
        })])
    }

    fn attempt_drop(
        &self,
        bank: BoardId,
        piece: Piece,
        to: BoardSquare,
    ) -> Result<Vec<Effect>, IntentError> {
        let role = self.seated_in_game()?;
        turn::check(&role, self.session.turns(), bank, Action::Drop)?;

        if to.board != bank {
            return Err(IntentError::CrossBoard {
                expected: bank,
                actual: to.board,
            });
        }

        if !self.session.board(role.board).bank(role.color).contains(piece) {
            return Err(IntentError::NotInBank(piece));
        }

        Ok(vec![Effect::Send(ClientMessage::Drop {
            piece,
            to: to.square,
            board: bank,
        })])
    }

    fn attempt_chat(&self, text: String) -> Result<Vec<Effect>, IntentError> {
        if *self.session.phase() == ConnectionPhase::Disconnected {
            return Err(IntentError::Disconnected);
        }
        if text.trim().is_empty() {
            return Err(IntentError::EmptyChat);
        }
        Ok(vec![Effect::Send(ClientMessage::Chat { message: text })])
    }
}

fn render(instruction: RenderInstruction) -> Effect {
    Effect::Render(instruction)
}
