extern crate rand;
extern crate remora;

use remora::position::fen::ALL_FENS;
use remora::Position;

/// Plays up to `plies` random legal moves, then unwinds them all, checking the
/// position is restored bit for bit after every undo.
fn make_undo_walk(fen: &str, plies: usize) {
    let mut pos = Position::from_fen(fen).unwrap();
    let mut snapshots: Vec<(String, u64, u64)> = Vec::new();

    for _ in 0..plies {
        let moves = pos.generate_moves();
        if moves.is_empty() {
            break;
        }
        snapshots.push((pos.fen(), pos.zobrist(), pos.pawn_key()));
        let mv = moves[rand::random::<usize>() % moves.len()];
        pos.make_move(mv);
    }

    while let Some((fen_before, key, pawn_key)) = snapshots.pop() {
        assert!(pos.undo_move());
        assert_eq!(pos.fen(), fen_before);
        assert_eq!(pos.zobrist(), key);
        assert_eq!(pos.pawn_key(), pawn_key);
    }
    assert!(!pos.undo_move());
    assert_eq!(pos.fen(), fen);
}

#[test]
fn random_games_make_and_undo() {
    for fen in ALL_FENS.iter() {
        make_undo_walk(fen, 60);
    }
}

#[test]
fn every_root_move_round_trips() {
    for fen in ALL_FENS.iter() {
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();
        let moves = pos.generate_moves();
        for mv in &moves {
            pos.make_move(mv);
            assert_ne!(pos.zobrist(), before.zobrist(), "key unchanged by {}", mv);
            pos.undo_move();
            assert!(pos == before, "fen: {} move: {}", fen, mv);
            assert_eq!(pos.zobrist(), before.zobrist());
            assert_eq!(pos.pawn_key(), before.pawn_key());
        }
    }
}

#[test]
fn null_moves_round_trip() {
    for fen in ALL_FENS.iter() {
        let mut pos = Position::from_fen(fen).unwrap();
        if pos.in_check(pos.turn()) {
            continue;
        }
        let before = pos.clone();
        pos.make_null_move();
        assert_ne!(pos.turn(), before.turn());
        assert_ne!(pos.zobrist(), before.zobrist());
        pos.undo_null_move();
        assert!(pos == before, "fen: {}", fen);
    }
}

#[test]
fn halfmove_and_fullmove_counters() {
    let mut pos = Position::start_pos();
    let e4 = pos.move_from_uci("e2e4").unwrap();
    pos.make_move(e4);
    // A pawn move resets the halfmove clock; White moving does not bump the
    // fullmove number.
    assert_eq!(pos.halfmove_clock(), 0);
    assert_eq!(pos.fullmove_number(), 1);

    let nf6 = pos.move_from_uci("g8f6").unwrap();
    pos.make_move(nf6);
    assert_eq!(pos.halfmove_clock(), 1);
    assert_eq!(pos.fullmove_number(), 2);
}

#[test]
fn castling_moves_the_rook() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let castle = pos.move_from_uci("e1g1").unwrap();
    assert!(pos.generate_moves().contains(&castle));
    pos.make_move(castle);

    let after = pos.fen();
    assert!(after.starts_with("r3k2r/8/8/8/8/8/8/R4RK1 b kq"));
    pos.undo_move();
    assert_eq!(pos.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
}

#[test]
fn en_passant_removes_the_pawn_behind() {
    let mut pos = Position::from_fen("8/8/8/3Pp3/8/8/8/k6K w - e6 0 1").unwrap();
    let ep = pos.move_from_uci("d5e6").unwrap();
    assert!(pos.generate_moves().contains(&ep));
    pos.make_move(ep);
    assert!(pos.fen().starts_with("8/8/4P3/8/8/8/8/k6K b"));
    pos.undo_move();
    assert_eq!(pos.fen(), "8/8/8/3Pp3/8/8/8/k6K w - e6 0 1");
}

#[test]
fn promotion_replaces_the_pawn() {
    let mut pos = Position::from_fen("8/P1k5/K7/8/8/8/8/8 w - - 0 1").unwrap();
    let promo = pos.move_from_uci("a7a8q").unwrap();
    assert!(pos.generate_moves().contains(&promo));
    pos.make_move(promo);
    assert!(pos.fen().starts_with("Q7/2k5/K7/8/8/8/8/8 b"));
    pos.undo_move();
    assert_eq!(pos.fen(), "8/P1k5/K7/8/8/8/8/8 w - - 0 1");
}

#[test]
fn capturing_a_rook_revokes_castling() {
    let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/6b1/R3K2R b KQkq - 0 1").unwrap();
    // The bishop takes the rook on h1; White loses the king-side right.
    let capture = pos.move_from_uci("g2h1").unwrap();
    assert!(pos.generate_moves().contains(&capture));
    pos.make_move(capture);
    assert!(pos.fen().contains(" Qkq "), "fen: {}", pos.fen());
}
