//! Tests for room seating, turn enforcement and message routing.

use bughouse::{
    BoardId, ClientMessage, Color, ConnectionId, Delivery, Piece, Role, RoomError, RoomManager,
    SEAT_ORDER, ServerMessage, Square, TeamId,
};

fn sq(name: &str) -> Square {
    name.parse().expect("valid square")
}

fn piece(glyph: char) -> Piece {
    Piece::from_glyph(glyph).expect("valid glyph")
}

fn join(rooms: &mut RoomManager, conn: ConnectionId) -> Vec<Delivery> {
    rooms.join(conn, "table").expect("seat available")
}

/// Four connections (1..=4) seated in `table`.
fn full_room() -> RoomManager {
    let mut rooms = RoomManager::new();
    for conn in 1..=4 {
        join(&mut rooms, conn);
    }
    rooms
}

fn to(deliveries: &[Delivery], conn: ConnectionId) -> Vec<ServerMessage> {
    deliveries
        .iter()
        .filter(|d| d.to == conn)
        .map(|d| d.message.clone())
        .collect()
}

fn move_msg(board: BoardId, from: &str, to: &str, captured: Option<Piece>) -> ClientMessage {
    ClientMessage::Move {
        from: sq(from),
        to: sq(to),
        board,
        captured_piece: captured,
    }
}

#[test]
fn test_seats_follow_fixed_order() {
    let rooms = full_room();
    for (conn, seat) in (1..=4).zip(SEAT_ORDER) {
        assert_eq!(rooms.role_of(conn), Some(seat));
    }
    assert_eq!(
        SEAT_ORDER[0].partner(),
        Role::new(TeamId::One, BoardId::Two, Color::Black)
    );
    assert_eq!(
        SEAT_ORDER[2].partner(),
        Role::new(TeamId::Two, BoardId::Two, Color::White)
    );
}

#[test]
fn test_join_sends_assignment_then_occupancy() {
    let mut rooms = RoomManager::new();
    join(&mut rooms, 1);
    let deliveries = join(&mut rooms, 2);

    assert_eq!(
        to(&deliveries, 2),
        vec![
            ServerMessage::Assignment {
                team: TeamId::One,
                board: BoardId::Two,
                color: Color::Black,
            },
            ServerMessage::PlayerJoined { player_count: 2 },
        ]
    );
    assert_eq!(
        to(&deliveries, 1),
        vec![ServerMessage::PlayerJoined { player_count: 2 }]
    );
}

#[test]
fn test_fourth_join_starts_game_for_everyone() {
    let mut rooms = RoomManager::new();
    for conn in 1..=3 {
        join(&mut rooms, conn);
    }
    let deliveries = join(&mut rooms, 4);
    for conn in 1..=4 {
        assert!(to(&deliveries, conn).contains(&ServerMessage::GameStart));
    }
    assert!(rooms.room("table").expect("room exists").is_started());
}

#[test]
fn test_fifth_join_is_refused() {
    let mut rooms = full_room();
    assert_eq!(rooms.join(5, "table"), Err(RoomError::RoomFull));
    assert_eq!(RoomError::RoomFull.to_string(), "Room is full");
    assert_eq!(rooms.role_of(5), None);
}

#[test]
fn test_rooms_are_independent() {
    let mut rooms = full_room();
    let deliveries = rooms.join(5, "other").expect("new room");
    assert_eq!(rooms.role_of(5), Some(SEAT_ORDER[0]));
    assert!(to(&deliveries, 1).is_empty());
}

#[test]
fn test_double_join_refused() {
    let mut rooms = RoomManager::new();
    join(&mut rooms, 1);
    assert_eq!(
        rooms.join(1, "elsewhere"),
        Err(RoomError::AlreadySeated("table".to_string()))
    );
}

#[test]
fn test_move_relayed_and_turn_flipped() {
    let mut rooms = full_room();
    let deliveries = rooms
        .handle(1, move_msg(BoardId::One, "e2", "e4", None))
        .expect("white to move on board 1");

    for conn in 1..=4 {
        assert_eq!(
            to(&deliveries, conn),
            vec![
                ServerMessage::Move {
                    from: sq("e2"),
                    to: sq("e4"),
                    board: BoardId::One,
                    captured_piece: None,
                },
                ServerMessage::TurnUpdate {
                    board: BoardId::One,
                    next_turn: Color::Black,
                },
            ]
        );
    }
    let room = rooms.room("table").expect("room");
    assert_eq!(room.turns().get(BoardId::One), Color::Black);
    assert_eq!(room.turns().get(BoardId::Two), Color::White);
}

#[test]
fn test_out_of_turn_and_wrong_board_refused() {
    let mut rooms = full_room();
    // Seat 3 is black on board 1; white moves first.
    assert!(matches!(
        rooms.handle(3, move_msg(BoardId::One, "e7", "e5", None)),
        Err(RoomError::Gate(_))
    ));
    // Seat 1 sits at board 1.
    assert!(matches!(
        rooms.handle(1, move_msg(BoardId::Two, "e2", "e4", None)),
        Err(RoomError::Gate(_))
    ));
}

#[test]
fn test_actions_wait_for_full_room() {
    let mut rooms = RoomManager::new();
    join(&mut rooms, 1);
    assert_eq!(
        rooms.handle(1, move_msg(BoardId::One, "e2", "e4", None)),
        Err(RoomError::NotStarted)
    );
    assert_eq!(
        rooms.handle(9, move_msg(BoardId::One, "e2", "e4", None)),
        Err(RoomError::NotSeated)
    );
}

#[test]
fn test_capture_banks_for_partner_only() {
    let mut rooms = full_room();
    let captured = piece('♟');
    let deliveries = rooms
        .handle(1, move_msg(BoardId::One, "d1", "d7", Some(captured)))
        .expect("white's turn");

    let bank = ServerMessage::AddToBank { piece: captured };
    assert!(to(&deliveries, 2).contains(&bank));
    for conn in [1, 3, 4] {
        assert!(!to(&deliveries, conn).contains(&bank));
    }
}

#[test]
fn test_drop_relayed_and_turn_flipped() {
    let mut rooms = full_room();
    let knight = piece('♘');
    let deliveries = rooms
        .handle(
            4,
            ClientMessage::Drop {
                piece: knight,
                to: sq("e5"),
                board: BoardId::Two,
            },
        )
        .expect("white to move on board 2");
    assert_eq!(
        to(&deliveries, 2),
        vec![
            ServerMessage::Drop {
                piece: knight,
                to: sq("e5"),
                board: BoardId::Two,
            },
            ServerMessage::TurnUpdate {
                board: BoardId::Two,
                next_turn: Color::Black,
            },
        ]
    );
}

#[test]
fn test_chat_broadcast_with_sender() {
    let mut rooms = RoomManager::new();
    join(&mut rooms, 1);
    join(&mut rooms, 2);
    let deliveries = rooms
        .handle(
            2,
            ClientMessage::Chat {
                message: "ready".to_string(),
            },
        )
        .expect("seated");
    let expected = ServerMessage::Chat {
        message: "ready".to_string(),
        sender_role: Some(SEAT_ORDER[1].into()),
    };
    assert_eq!(to(&deliveries, 1), vec![expected.clone()]);
    assert_eq!(to(&deliveries, 2), vec![expected]);

    assert!(rooms
        .handle(
            1,
            ClientMessage::Chat {
                message: "  ".to_string()
            }
        )
        .expect("seated")
        .is_empty());
}

#[test]
fn test_leave_frees_seat_and_stops_game() {
    let mut rooms = full_room();
    let deliveries = rooms.leave(2);
    for conn in [1, 3, 4] {
        assert_eq!(
            to(&deliveries, conn),
            vec![ServerMessage::PlayerJoined { player_count: 3 }]
        );
    }
    assert!(!rooms.room("table").expect("room").is_started());

    let deliveries = join(&mut rooms, 5);
    assert_eq!(rooms.role_of(5), Some(SEAT_ORDER[1]));
    assert!(to(&deliveries, 1).contains(&ServerMessage::GameStart));
}

#[test]
fn test_last_leave_removes_room() {
    let mut rooms = RoomManager::new();
    join(&mut rooms, 1);
    assert!(rooms.leave(1).is_empty());
    assert!(rooms.room("table").is_none());
    assert!(rooms.leave(1).is_empty());
}
