//! Tests for the local turn gate.

use bughouse_core::{
    Action, BoardId, Color, GateRejection, Role, TeamId, TurnState, check_gate, may_originate,
};

fn role(board: BoardId, color: Color) -> Role {
    Role::new(TeamId::One, board, color)
}

fn turns(board_one: Color, board_two: Color) -> TurnState {
    let mut turns = TurnState::new();
    turns.set(BoardId::One, board_one);
    turns.set(BoardId::Two, board_two);
    turns
}

#[test]
fn test_initial_turns_are_white() {
    let turns = TurnState::new();
    assert_eq!(turns.get(BoardId::One), Color::White);
    assert_eq!(turns.get(BoardId::Two), Color::White);
}

#[test]
fn test_gate_matches_definition_for_every_combination() {
    let colors = [Color::White, Color::Black];
    for role_board in BoardId::ALL {
        for role_color in colors {
            for t1 in colors {
                for t2 in colors {
                    let role = role(role_board, role_color);
                    let turns = turns(t1, t2);
                    for target in BoardId::ALL {
                        let on_turn = role.board == target && role.color == turns.get(target);

                        assert_eq!(
                            may_originate(&role, &turns, target, Action::Drop),
                            on_turn,
                            "drop {role:?} on {target:?}"
                        );

                        for piece_color in colors {
                            let expected = on_turn && piece_color == role.color;
                            assert_eq!(
                                may_originate(&role, &turns, target, Action::Move { piece_color }),
                                expected,
                                "move {piece_color:?} as {role:?} on {target:?}"
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_wrong_board_reported_first() {
    let role = role(BoardId::One, Color::White);
    let result = check_gate(
        &role,
        &turns(Color::Black, Color::Black),
        BoardId::Two,
        Action::Move {
            piece_color: Color::Black,
        },
    );
    assert_eq!(
        result,
        Err(GateRejection::WrongBoard {
            assigned: BoardId::One,
            attempted: BoardId::Two,
        })
    );
}

#[test]
fn test_not_your_turn() {
    let role = role(BoardId::Two, Color::Black);
    let result = check_gate(
        &role,
        &TurnState::new(),
        BoardId::Two,
        Action::Drop,
    );
    assert_eq!(
        result,
        Err(GateRejection::NotYourTurn {
            board: BoardId::Two,
            to_move: Color::White,
        })
    );
}

#[test]
fn test_opponent_piece_rejected_on_own_turn() {
    let role = role(BoardId::One, Color::White);
    let result = check_gate(
        &role,
        &TurnState::new(),
        BoardId::One,
        Action::Move {
            piece_color: Color::Black,
        },
    );
    assert_eq!(result, Err(GateRejection::OpponentPiece(Color::Black)));
    assert!(result.unwrap_err().to_string().contains("black"));
}

#[test]
fn test_advance_flips_only_one_board() {
    let mut turns = TurnState::new();
    assert_eq!(turns.advance(BoardId::Two), Color::Black);
    assert_eq!(turns.get(BoardId::One), Color::White);
    assert_eq!(turns.advance(BoardId::Two), Color::White);
}
