//! Wire format of client and server frames.

use serde_json::json;
use tictac_escrow::{
    BetAmount, Board, ClientMessage, ErrorCode, LAMPORTS_PER_SOL, Mark, RoomError, ServerMessage,
    Verdict, WinTally,
};

#[test]
fn test_parse_create_room_with_numeric_bet() {
    let msg: ClientMessage = serde_json::from_value(json!({
        "type": "createRoom",
        "pubkey": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
        "bet": 0.1
    }))
    .unwrap();

    let ClientMessage::CreateRoom { pubkey, bet } = msg else {
        panic!("expected createRoom");
    };
    assert_eq!(pubkey, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
    assert_eq!(bet.to_lamports(), Ok(100_000_000));
}

#[test]
fn test_parse_create_room_with_string_bet() {
    let msg: ClientMessage =
        serde_json::from_str(r#"{"type":"createRoom","pubkey":"abc","bet":" 1.5 "}"#).unwrap();
    let ClientMessage::CreateRoom { bet, .. } = msg else {
        panic!("expected createRoom");
    };
    assert_eq!(bet.to_lamports(), Ok(3 * LAMPORTS_PER_SOL / 2));
}

#[test]
fn test_parse_make_move() {
    let msg: ClientMessage =
        serde_json::from_str(r#"{"type":"makeMove","index":-1,"player":"O"}"#).unwrap();
    assert_eq!(
        msg,
        ClientMessage::MakeMove {
            index: -1,
            player: Mark::O
        }
    );
}

#[test]
fn test_unknown_type_is_error() {
    assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"resign"}"#).is_err());
    let bad_mark = r#"{"type":"makeMove","index":1,"player":"Z"}"#;
    assert!(serde_json::from_str::<ClientMessage>(bad_mark).is_err());
}

#[test]
fn test_bad_bets() {
    for bet in [
        BetAmount::Number(-0.5),
        BetAmount::Number(1e30),
        BetAmount::Text("ten".to_string()),
        BetAmount::Text("".to_string()),
    ] {
        assert!(
            matches!(bet.to_lamports(), Err(RoomError::InvalidWager(_))),
            "{bet:?} should be refused"
        );
    }
    assert_eq!(BetAmount::Number(0.0).to_lamports(), Ok(0));
    assert_eq!(BetAmount::Number(0.2).to_lamports(), Ok(200_000_000));
}

#[test]
fn test_bet_of_exactly_two_to_the_64_lamports_refused() {
    // 18446744073.709551616 SOL is 2^64 lamports, one past u64::MAX
    let bet = BetAmount::Text("18446744073.709551616".to_string());
    assert!(matches!(bet.to_lamports(), Err(RoomError::InvalidWager(_))));
}

#[test]
fn test_update_board_shape() {
    let msg = ServerMessage::UpdateBoard {
        board: Board::new(),
        current_player: Mark::X,
        wins: WinTally { x: 2, o: 1 },
    };
    assert_eq!(
        serde_json::to_value(&msg).unwrap(),
        json!({
            "type": "updateBoard",
            "board": [null, null, null, null, null, null, null, null, null],
            "currentPlayer": "X",
            "wins": {"X": 2, "O": 1}
        })
    );
}

#[test]
fn test_game_over_shape() {
    let win = ServerMessage::GameOver {
        winner: Verdict::Winner(Mark::O),
        wins: WinTally { x: 0, o: 1 },
    };
    assert_eq!(
        serde_json::to_value(&win).unwrap(),
        json!({"type": "gameOver", "winner": "O", "wins": {"X": 0, "O": 1}})
    );

    let draw = ServerMessage::GameOver {
        winner: Verdict::Draw,
        wins: WinTally::default(),
    };
    assert_eq!(
        serde_json::to_value(&draw).unwrap(),
        json!({"type": "gameOver", "winner": "draw", "wins": {"X": 0, "O": 0}})
    );
}

#[test]
fn test_room_created_and_error_shapes() {
    let created = ServerMessage::RoomCreated {
        room_id: "TIC-TAC-ROOM".to_string(),
        player: Mark::O,
    };
    assert_eq!(
        serde_json::to_value(&created).unwrap(),
        json!({"type": "roomCreated", "roomId": "TIC-TAC-ROOM", "player": "O"})
    );

    let error = ServerMessage::Error {
        code: ErrorCode::RoomFull,
        message: "room TIC-TAC-ROOM already has two players".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&error).unwrap(),
        json!({
            "type": "error",
            "code": "roomFull",
            "message": "room TIC-TAC-ROOM already has two players"
        })
    );
}

#[test]
fn test_verdict_rejects_unknown() {
    assert!(serde_json::from_value::<Verdict>(json!("tie")).is_err());
    assert_eq!(
        serde_json::from_value::<Verdict>(json!("draw")).unwrap(),
        Verdict::Draw
    );
}
