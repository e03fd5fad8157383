//! Bughouse core - client-side synchronization for two linked chess boards.
//!
//! Four players, two boards. A piece captured on one board goes to the
//! capturer's partner, who may drop it on the other board. The remote side is
//! the authority on legality and turn order; this crate tracks what the local
//! player sees and decides what they may attempt.
//!
//! # Architecture
//!
//! - **Types**: boards, teams, colors, roles, squares, piece glyphs
//! - **Board**: 8×8 occupancy plus a piece bank per color
//! - **Turn**: per-board turn state and the local turn gate
//! - **Session**: the root aggregate and its lifecycle
//! - **Protocol**: the JSON wire messages in both directions
//! - **Engine**: applies inbound events, gates local intents, emits effects
//!
//! # Example
//!
//! ```
//! use bughouse_core::{BankAuthority, Effect, ServerMessage, SyncEngine, TransportEvent};
//!
//! let mut engine = SyncEngine::new(BankAuthority::Event);
//! engine.handle_transport(TransportEvent::Opened);
//! let effects = engine
//!     .handle_frame(r#"{"type":"chat","message":"hello"}"#)
//!     .expect("valid frame");
//! assert!(matches!(effects[0], Effect::Render(_)));
//! assert_eq!(engine.session().chat().len(), 1);
//! # let _ = ServerMessage::GameStart;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod chat;
mod engine;
mod protocol;
mod session;
mod turn;
mod types;

// Crate-level exports - Domain types
pub use types::{BoardId, Color, ParseError, Piece, PieceKind, Role, Square, TeamId};

// Crate-level exports - Boards and banks
pub use board::{BoardState, PieceBank};

// Crate-level exports - Turn gate
pub use turn::{Action, GateRejection, TurnState, check as check_gate, may_originate};

// Crate-level exports - Session
pub use session::{ConnectionPhase, DropOutcome, MoveOutcome, Session};

// Crate-level exports - Chat
pub use chat::{ChatEntry, ChatLog, ChatSender, sender_label};

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, CodecError, ServerMessage};

// Crate-level exports - Synchronization engine
pub use engine::{
    BankAuthority, BoardSquare, Effect, Intent, IntentError, RenderInstruction, SyncEngine,
    TransportEvent, View,
};
