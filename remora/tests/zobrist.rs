extern crate rand;
extern crate remora;

use std::collections::HashMap;

use remora::position::fen::{ALL_FENS, COMPLEX_POS_FEN};
use remora::Position;

/// The first four FEN fields: everything that identifies a board state apart
/// from the move counters.
fn state_id(pos: &Position) -> String {
    let fen = pos.fen();
    let fields: Vec<&str> = fen.split_whitespace().collect();
    fields[..4].join(" ")
}

#[test]
fn incremental_key_matches_recomputation() {
    for fen in ALL_FENS.iter() {
        let mut pos = Position::from_fen(fen).unwrap();
        for _ in 0..40 {
            let moves = pos.generate_moves();
            if moves.is_empty() {
                break;
            }
            pos.make_move(moves[rand::random::<usize>() % moves.len()]);

            let rebuilt = Position::from_fen(&pos.fen()).unwrap();
            assert_eq!(pos.zobrist(), rebuilt.zobrist(), "fen: {}", pos.fen());
            assert_eq!(pos.pawn_key(), rebuilt.pawn_key(), "fen: {}", pos.fen());
        }
    }
}

#[test]
fn pawn_key_is_never_zero() {
    // Even with no pawns on the board at all.
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_ne!(pos.pawn_key(), 0);
}

#[test]
fn no_key_collisions_across_random_games() {
    let mut seen: HashMap<u64, String> = HashMap::new();

    for _game in 0..500 {
        let mut pos = Position::from_fen(COMPLEX_POS_FEN).unwrap();
        for _ply in 0..200 {
            let moves = pos.generate_moves();
            if moves.is_empty() || pos.halfmove_clock() >= 100 {
                break;
            }
            pos.make_move(moves[rand::random::<usize>() % moves.len()]);

            let id = state_id(&pos);
            if let Some(prev) = seen.get(&pos.zobrist()) {
                assert_eq!(
                    prev,
                    &id,
                    "two distinct states share the key {:#018x}",
                    pos.zobrist()
                );
            } else {
                seen.insert(pos.zobrist(), id);
            }
        }
    }
}
