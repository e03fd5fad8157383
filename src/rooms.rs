//! Room bookkeeping for the relay server.
//!
//! Seats players, enforces turn order per board and decides who receives
//! which message. Nothing here touches a socket: every operation returns the
//! deliveries the caller should perform.

use bughouse_core::{
    Action, BoardId, ClientMessage, Color, GateRejection, Piece, Role, ServerMessage, Square,
    TeamId, TurnState, check_gate,
};
use derive_more::{Display, From};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Identifies one WebSocket connection.
pub type ConnectionId = u64;

/// Players per room.
pub const ROOM_CAPACITY: usize = 4;

/// Seats in the order they are handed out.
pub const SEAT_ORDER: [Role; ROOM_CAPACITY] = [
    Role {
        team: TeamId::One,
        board: BoardId::One,
        color: Color::White,
    },
    Role {
        team: TeamId::One,
        board: BoardId::Two,
        color: Color::Black,
    },
    Role {
        team: TeamId::Two,
        board: BoardId::One,
        color: Color::Black,
    },
    Role {
        team: TeamId::Two,
        board: BoardId::Two,
        color: Color::White,
    },
];

/// A message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient.
    pub to: ConnectionId,
    /// Message to send.
    pub message: ServerMessage,
}

impl Delivery {
    fn new(to: ConnectionId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// Why a client request was refused. The display text is sent back as an `error` frame.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum RoomError {
    /// All four seats are taken.
    #[display("Room is full")]
    RoomFull,

    /// The connection already holds a seat.
    #[display("Already seated in room {}", _0)]
    AlreadySeated(String),

    /// Blank room name.
    #[display("Room name is empty")]
    EmptyRoomName,

    /// The request needs a seat first.
    #[display("Join a room first")]
    NotSeated,

    /// Moves and drops wait for four players.
    #[display("Game has not started")]
    NotStarted,

    /// Wrong board or wrong turn.
    #[display("{}", _0)]
    #[from]
    Gate(GateRejection),
}

impl std::error::Error for RoomError {}

/// One room: four seats and the turn on each board.
#[derive(Debug, Clone, Default)]
pub struct Room {
    seats: [Option<ConnectionId>; ROOM_CAPACITY],
    turns: TurnState,
    started: bool,
}

impl Room {
    /// Number of occupied seats.
    pub fn player_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// Returns true once four players are seated and the game was started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Turn state for both boards.
    pub fn turns(&self) -> &TurnState {
        &self.turns
    }

    /// Connection holding `role`, if any.
    pub fn occupant(&self, role: Role) -> Option<ConnectionId> {
        SEAT_ORDER
            .iter()
            .position(|seat| *seat == role)
            .and_then(|index| self.seats[index])
    }

    fn occupants(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.seats.iter().flatten().copied()
    }

    fn broadcast(&self, message: ServerMessage) -> Vec<Delivery> {
        self.occupants()
            .map(|to| Delivery::new(to, message.clone()))
            .collect()
    }

    fn occupancy(&self) -> Vec<Delivery> {
        self.broadcast(ServerMessage::PlayerJoined {
            player_count: self.player_count() as u8,
        })
    }
}

#[derive(Debug, Clone)]
struct Seat {
    room: String,
    index: usize,
}

/// Every room on the server and which connection sits where.
#[derive(Debug, Clone, Default)]
pub struct RoomManager {
    rooms: HashMap<String, Room>,
    seats: HashMap<ConnectionId, Seat>,
}

impl RoomManager {
    /// Creates an empty manager.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating room manager");
        Self::default()
    }

    /// Looks up a room.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    /// Role held by a connection.
    pub fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        self.seats.get(&conn).map(|seat| SEAT_ORDER[seat.index])
    }

    /// Handles one decoded client frame.
    #[instrument(skip(self, message))]
    pub fn handle(
        &mut self,
        conn: ConnectionId,
        message: ClientMessage,
    ) -> Result<Vec<Delivery>, RoomError> {
        match message {
            ClientMessage::Join { room } => self.join(conn, &room),
            ClientMessage::Move {
                from,
                to,
                board,
                captured_piece,
            } => self.relay_move(conn, board, from, to, captured_piece),
            ClientMessage::Drop { piece, to, board } => self.relay_drop(conn, board, piece, to),
            ClientMessage::Chat { message } => self.chat(conn, message),
        }
    }

    /// Seats a connection in the first free seat of `room`, creating the room if needed.
    #[instrument(skip(self))]
    pub fn join(&mut self, conn: ConnectionId, room: &str) -> Result<Vec<Delivery>, RoomError> {
        if let Some(seat) = self.seats.get(&conn) {
            warn!(room = %seat.room, "Connection already seated");
            return Err(RoomError::AlreadySeated(seat.room.clone()));
        }
        let name = room.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyRoomName);
        }

        let entry = self.rooms.entry(name.to_string()).or_default();
        let Some(index) = entry.seats.iter().position(Option::is_none) else {
            warn!(room = %name, "Room is full");
            return Err(RoomError::RoomFull);
        };
        entry.seats[index] = Some(conn);
        let role = SEAT_ORDER[index];
        info!(room = %name, %role, count = entry.player_count(), "Player seated");

        let mut deliveries = vec![Delivery::new(
            conn,
            ServerMessage::Assignment {
                team: role.team,
                board: role.board,
                color: role.color,
            },
        )];
        deliveries.extend(entry.occupancy());

        if entry.player_count() == ROOM_CAPACITY && !entry.started {
            info!(room = %name, "Room full, starting game");
            entry.started = true;
            entry.turns = TurnState::new();
            deliveries.extend(entry.broadcast(ServerMessage::GameStart));
        }

        self.seats.insert(
            conn,
            Seat {
                room: name.to_string(),
                index,
            },
        );
        Ok(deliveries)
    }

    /// Frees the connection's seat and tells the rest of the room.
    ///
    /// A game in progress stops; it restarts from the standard position once
    /// the room fills again.
    #[instrument(skip(self))]
    pub fn leave(&mut self, conn: ConnectionId) -> Vec<Delivery> {
        let Some(seat) = self.seats.remove(&conn) else {
            debug!("Connection held no seat");
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&seat.room) else {
            return Vec::new();
        };
        room.seats[seat.index] = None;
        room.started = false;
        info!(room = %seat.room, count = room.player_count(), "Player left");

        if room.player_count() == 0 {
            info!(room = %seat.room, "Room empty, removing");
            self.rooms.remove(&seat.room);
            return Vec::new();
        }
        room.occupancy()
    }

    fn seated(&mut self, conn: ConnectionId) -> Result<(Role, &mut Room), RoomError> {
        let seat = self.seats.get(&conn).ok_or(RoomError::NotSeated)?;
        let role = SEAT_ORDER[seat.index];
        let room = self.rooms.get_mut(&seat.room).ok_or(RoomError::NotSeated)?;
        Ok((role, room))
    }

    fn take_turn(&mut self, conn: ConnectionId, board: BoardId) -> Result<(Role, &mut Room), RoomError> {
        let (role, room) = self.seated(conn)?;
        if !room.started {
            return Err(RoomError::NotStarted);
        }
        // Board and turn only: the relay does not track pieces.
        check_gate(&role, &room.turns, board, Action::Drop)?;
        Ok((role, room))
    }

    #[instrument(skip(self))]
    fn relay_move(
        &mut self,
        conn: ConnectionId,
        board: BoardId,
        from: Square,
        to: Square,
        captured_piece: Option<Piece>,
    ) -> Result<Vec<Delivery>, RoomError> {
        let (role, room) = self.take_turn(conn, board)?;
        let mut deliveries = room.broadcast(ServerMessage::Move {
            from,
            to,
            board,
            captured_piece,
        });
        let next_turn = room.turns.advance(board);
        deliveries.extend(room.broadcast(ServerMessage::TurnUpdate { board, next_turn }));

        if let Some(piece) = captured_piece {
            match room.occupant(role.partner()) {
                Some(partner) => {
                    debug!(%piece, partner, "Crediting partner bank");
                    deliveries.push(Delivery::new(partner, ServerMessage::AddToBank { piece }));
                }
                None => warn!(%piece, "Partner seat empty, capture not banked"),
            }
        }
        Ok(deliveries)
    }

    #[instrument(skip(self))]
    fn relay_drop(
        &mut self,
        conn: ConnectionId,
        board: BoardId,
        piece: Piece,
        to: Square,
    ) -> Result<Vec<Delivery>, RoomError> {
        let (_, room) = self.take_turn(conn, board)?;
        let mut deliveries = room.broadcast(ServerMessage::Drop { piece, to, board });
        let next_turn = room.turns.advance(board);
        deliveries.extend(room.broadcast(ServerMessage::TurnUpdate { board, next_turn }));
        Ok(deliveries)
    }

    fn chat(&mut self, conn: ConnectionId, message: String) -> Result<Vec<Delivery>, RoomError> {
        let (role, room) = self.seated(conn)?;
        if message.trim().is_empty() {
            debug!("Dropping blank chat");
            return Ok(Vec::new());
        }
        Ok(room.broadcast(ServerMessage::Chat {
            message,
            sender_role: Some(role.into()),
        }))
    }
}
