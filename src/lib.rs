//! Bughouse - terminal client and room relay for four-player, two-board chess
//!
//! The synchronization logic lives in `bughouse_core`; this crate puts it on
//! a WebSocket and a terminal.
//!
//! # Architecture
//!
//! - **Client**: WebSocket transport feeding the sync engine
//! - **TUI**: view model, drawing and input-line commands
//! - **Rooms**: seating, turn order and message routing for the relay
//! - **Server**: axum WebSocket endpoint in front of the rooms
//! - **Config**: TOML client configuration
//!
//! # Example
//!
//! ```
//! use bughouse::{ClientMessage, RoomManager, ServerMessage};
//!
//! let mut rooms = RoomManager::new();
//! let deliveries = rooms
//!     .handle(1, ClientMessage::Join { room: "lobby".to_string() })
//!     .expect("first seat is free");
//! assert!(matches!(deliveries[0].message, ServerMessage::Assignment { .. }));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod rooms;
mod server;
mod tui;

// Crate-level exports - Core re-exports
pub use bughouse_core::{
    BankAuthority, BoardId, ClientMessage, Color, Effect, Intent, Piece, RenderInstruction, Role,
    ServerMessage, Square, TeamId, TransportEvent, View,
};

// Crate-level exports - Client
pub use client::{ClientApp, run_client};

// Crate-level exports - Configuration
pub use config::{ClientConfig, ConfigError};

// Crate-level exports - Rooms
pub use rooms::{ConnectionId, Delivery, ROOM_CAPACITY, Room, RoomError, RoomManager, SEAT_ORDER};

// Crate-level exports - Server
pub use server::RelayServer;

// Crate-level exports - Terminal UI
pub use tui::command::{Command, CommandError, parse_command};
pub use tui::surface::TerminalSurface;
pub use tui::{KeyOutcome, handle_key};
