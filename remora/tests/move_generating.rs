extern crate rand;
extern crate remora;

use std::collections::HashSet;

use remora::position::fen::ALL_FENS;
use remora::position::perft::perft;
use remora::{BitMove, GenTypes, PieceType, Position};

#[test]
fn perft_start_position() {
    let mut pos = Position::start_pos();
    assert_eq!(perft(&mut pos, 1), 20);
    assert_eq!(perft(&mut pos, 2), 400);
    assert_eq!(perft(&mut pos, 3), 8_902);
    assert_eq!(perft(&mut pos, 4), 197_281);
}

#[test]
fn perft_tactical_position() {
    // A promotion/castling heavy position with a known node count.
    let mut pos =
        Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq -")
            .unwrap();
    assert_eq!(perft(&mut pos, 1), 6);
    assert_eq!(perft(&mut pos, 2), 264);
    assert_eq!(perft(&mut pos, 3), 9_467);
    assert_eq!(perft(&mut pos, 4), 422_333);
}

#[test]
fn captures_and_quiets_partition_the_legal_moves() {
    for fen in ALL_FENS.iter() {
        let pos = Position::from_fen(fen).unwrap();
        if pos.in_check(pos.turn()) {
            continue;
        }

        let all: HashSet<u16> = pos
            .generate_moves()
            .iter()
            .map(|m| m.get_raw())
            .collect();
        let captures: HashSet<u16> = pos
            .generate_moves_of_type(GenTypes::Captures)
            .iter()
            .map(|m| m.get_raw())
            .collect();
        let quiets: HashSet<u16> = pos
            .generate_moves_of_type(GenTypes::Quiets)
            .iter()
            .map(|m| m.get_raw())
            .collect();

        assert!(captures.is_disjoint(&quiets), "overlap for fen: {}", fen);
        let union: HashSet<u16> = captures.union(&quiets).cloned().collect();
        assert_eq!(union, all, "partition mismatch for fen: {}", fen);

        // Captures are exactly the captures plus queen promotions.
        for raw in &captures {
            let mv = BitMove::new(*raw);
            let is_queen_promo = mv.is_promo() && mv.promo_piece() == PieceType::Q;
            assert!(
                pos.captured_piece(mv) != PieceType::None || is_queen_promo,
                "fen: {} move: {}",
                fen,
                mv
            );
        }
    }
}

#[test]
fn evasions_resolve_the_check() {
    for fen in ALL_FENS.iter() {
        let mut pos = Position::from_fen(fen).unwrap();
        if !pos.in_check(pos.turn()) {
            continue;
        }
        let us = pos.turn();
        let evasions = pos.generate_moves_of_type(GenTypes::Evasions);
        assert!(!evasions.is_empty() || pos.generate_moves().is_empty());

        for mv in &evasions {
            pos.make_move(mv);
            assert!(!pos.in_check(us), "fen: {} move: {}", fen, mv);
            pos.undo_move();
        }

        // Evasions are exactly the legal moves of an in-check position.
        assert_eq!(evasions.len(), pos.generate_moves().len(), "fen: {}", fen);
    }
}

#[test]
fn gives_check_agrees_with_make_move() {
    for fen in ALL_FENS.iter() {
        let mut pos = Position::from_fen(fen).unwrap();
        let moves = pos.generate_moves();
        for mv in &moves {
            let predicted = pos.gives_check(mv);
            pos.make_move(mv);
            let actual = pos.in_check(pos.turn());
            pos.undo_move();
            assert_eq!(predicted, actual, "fen: {} move: {}", fen, mv);
        }
    }
}

#[test]
fn gives_check_agrees_across_random_games(){
    for seed_game in 0..20 {
        let mut pos = Position::start_pos();
        for _ in 0..60 {
            let moves = pos.generate_moves();
            if moves.is_empty() {
                break;
            }
            for mv in &moves {
                let predicted = pos.gives_check(mv);
                pos.make_move(mv);
                let actual = pos.in_check(pos.turn());
                pos.undo_move();
                assert_eq!(predicted, actual, "game {} move {}", seed_game, mv);
            }
            let mv = moves[rand::random::<usize>() % moves.len()];
            pos.make_move(mv);
        }
    }
}

#[test]
fn uci_round_trips_every_legal_move() {
    for fen in ALL_FENS.iter() {
        let pos = Position::from_fen(fen).unwrap();
        for mv in &pos.generate_moves() {
            let uci = mv.stringify();
            let parsed = pos.move_from_uci(&uci).unwrap();
            assert_eq!(parsed, mv, "fen: {} uci: {}", fen, uci);
        }
    }
}

#[test]
fn oracle_accepts_all_legal_moves() {
    for fen in ALL_FENS.iter() {
        let pos = Position::from_fen(fen).unwrap();
        for mv in &pos.generate_moves() {
            assert!(pos.pseudo_legal(mv), "fen: {} move: {}", fen, mv);
        }
    }
}

#[test]
fn oracle_rejects_everything_else() {
    // Every 16-bit pattern the oracle accepts must be in the legal move list;
    // all other encodings, coherent looking or not, must be rejected.
    for fen in ALL_FENS.iter() {
        let pos = Position::from_fen(fen).unwrap();
        let legal: HashSet<u16> = pos
            .generate_moves()
            .iter()
            .map(|m| m.get_raw())
            .collect();

        for raw in 0..=u16::MAX {
            let mv = BitMove::new(raw);
            if pos.pseudo_legal(mv) {
                // Accepted moves must match a generated move, up to stray
                // promotion bits, which only matter for promotion encodings.
                let canonical = if mv.move_type() == remora::MoveType::Promotion {
                    raw
                } else {
                    mv.from_to() | ((mv.move_type() as u16) << 14)
                };
                assert!(
                    legal.contains(&canonical),
                    "fen: {} raw: {:#06x} accepted but not legal",
                    fen,
                    raw
                );
            } else {
                assert!(
                    !legal.contains(&raw),
                    "fen: {} rejected the legal move {}",
                    fen,
                    mv
                );
            }
        }
    }
}

#[test]
fn stale_moves_are_rejected_after_the_board_changes() {
    let mut pos = Position::start_pos();
    let e4 = pos.move_from_uci("e2e4").unwrap();
    assert!(pos.pseudo_legal(e4));
    pos.make_move(e4);
    // Same encoding, different position: the pawn is no longer on e2.
    assert!(!pos.pseudo_legal(e4));
}
