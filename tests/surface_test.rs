//! Tests for the terminal view model and the client glue around the engine.

use bughouse::{
    BoardId, ClientApp, ClientConfig, ClientMessage, Color, KeyOutcome, RenderInstruction,
    Square, TerminalSurface, TransportEvent, View, handle_key,
};
use bughouse_core::Piece;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn sq(name: &str) -> Square {
    name.parse().expect("valid square")
}

fn piece(glyph: char) -> Piece {
    Piece::from_glyph(glyph).expect("valid glyph")
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_line(surface: &mut TerminalSurface, text: &str) {
    for c in text.chars() {
        assert_eq!(handle_key(surface, key(KeyCode::Char(c))), KeyOutcome::Edited);
    }
}

/// A client seated as Team 1, Board 1, white, with the game started.
fn playing() -> ClientApp {
    let mut app = ClientApp::new(&ClientConfig::default());
    app.transport(TransportEvent::Opened);
    let sent = app.submit("/join table").expect("not quit");
    assert_eq!(
        sent,
        vec![ClientMessage::Join {
            room: "table".to_string()
        }]
    );
    app.frame(r#"{"type":"assignment","team":1,"board":1,"color":"white"}"#);
    app.frame(r#"{"type":"game_start"}"#);
    app
}

#[test]
fn test_apply_updates_view_model() {
    let mut surface = TerminalSurface::new();
    surface.apply(RenderInstruction::ShowView(View::Game));
    surface.apply(RenderInstruction::Board {
        board: BoardId::Two,
        square: sq("c3"),
        piece: Some(piece('♘')),
    });
    surface.apply(RenderInstruction::Bank {
        board: BoardId::One,
        color: Color::Black,
        pieces: vec![piece('♟'), piece('♟')],
    });
    surface.apply(RenderInstruction::TurnIndicator {
        board: BoardId::Two,
        is_local_turn: true,
    });
    surface.apply(RenderInstruction::ChatLine {
        sender_label: "System".to_string(),
        text: "welcome".to_string(),
    });
    surface.apply(RenderInstruction::JoinEnabled(true));

    assert_eq!(surface.view(), &View::Game);
    assert_eq!(surface.piece_at(BoardId::Two, sq("c3")), Some(piece('♘')));
    assert_eq!(surface.piece_at(BoardId::One, sq("c3")), None);
    assert_eq!(surface.bank(BoardId::One, Color::Black).len(), 2);
    assert!(surface.bank(BoardId::One, Color::White).is_empty());
    assert!(surface.is_local_turn(BoardId::Two));
    assert!(!surface.is_local_turn(BoardId::One));
    assert_eq!(
        surface.chat(),
        &vec![("System".to_string(), "welcome".to_string())]
    );
    assert!(*surface.join_enabled());
}

#[test]
fn test_input_line_editing() {
    let mut surface = TerminalSurface::new();
    type_line(&mut surface, "e2e5");
    assert_eq!(handle_key(&mut surface, key(KeyCode::Backspace)), KeyOutcome::Edited);
    type_line(&mut surface, "4");
    assert_eq!(
        handle_key(&mut surface, key(KeyCode::Enter)),
        KeyOutcome::Submit("e2e4".to_string())
    );
    assert!(surface.input().is_empty());
    assert_eq!(handle_key(&mut surface, key(KeyCode::Esc)), KeyOutcome::Quit);
}

#[test]
fn test_game_start_draws_standard_position() {
    let app = playing();
    let surface = app.surface();
    assert_eq!(surface.view(), &View::Game);
    assert_eq!(surface.piece_at(BoardId::One, sq("e1")), Some(piece('♔')));
    assert_eq!(surface.piece_at(BoardId::Two, sq("d8")), Some(piece('♛')));
    assert_eq!(surface.piece_at(BoardId::Two, sq("e4")), None);
    assert!(surface.is_local_turn(BoardId::One));
    assert!(!surface.is_local_turn(BoardId::Two));
}

#[test]
fn test_typed_move_waits_for_echo() {
    let mut app = playing();
    let sent = app.submit("e2e4").expect("not quit");
    assert_eq!(
        sent,
        vec![ClientMessage::Move {
            from: sq("e2"),
            to: sq("e4"),
            board: BoardId::One,
            captured_piece: None,
        }]
    );
    assert_eq!(app.surface().piece_at(BoardId::One, sq("e4")), None);

    app.frame(r#"{"type":"move","from":"e2","to":"e4","board":1,"captured_piece":null}"#);
    app.frame(r#"{"type":"turn_update","board":1,"next_turn":"black"}"#);
    assert_eq!(
        app.surface().piece_at(BoardId::One, sq("e4")),
        Some(piece('♙'))
    );
    assert_eq!(app.surface().piece_at(BoardId::One, sq("e2")), None);
    assert!(!app.surface().is_local_turn(BoardId::One));

    // Out of turn now: nothing is sent.
    assert!(app.submit("d2d4").expect("not quit").is_empty());
}

#[test]
fn test_parse_error_lands_in_status() {
    let mut app = playing();
    assert!(app.submit("/drop").expect("not quit").is_empty());
    assert!(app.surface().status().starts_with("Usage:"));
}

#[test]
fn test_quit_command() {
    let mut app = playing();
    assert_eq!(app.submit("/quit"), None);
}

#[test]
fn test_disconnect_returns_to_lobby() {
    let mut app = playing();
    app.transport(TransportEvent::Closed);
    let surface = app.surface();
    assert_eq!(surface.view(), &View::Lobby);
    assert!(!*surface.join_enabled());
    assert_eq!(surface.status(), "Disconnected. Restart to rejoin.");
    assert_eq!(app.engine().session().role(), None);
}

#[test]
fn test_chat_round_trip() {
    let mut app = playing();
    let sent = app.submit("good luck all").expect("not quit");
    assert_eq!(
        sent,
        vec![ClientMessage::Chat {
            message: "good luck all".to_string()
        }]
    );
    assert!(app.surface().chat().is_empty());

    app.frame(
        r#"{"type":"chat","message":"good luck all","sender_role":{"team":1,"board":1,"color":"white"}}"#,
    );
    assert_eq!(
        app.surface().chat(),
        &vec![("Team 1, Board 1".to_string(), "good luck all".to_string())]
    );
}

#[test]
fn test_malformed_frame_ignored() {
    let mut app = playing();
    assert!(app.frame("garbage").is_empty());
    assert_eq!(app.surface().view(), &View::Game);
}
