extern crate remora;
extern crate remora_engine;

use remora::helper::prelude::piece_value;
use remora::{PieceType, Position};
use remora_engine::see::static_exchange_evaluation;

fn see(fen: &str, uci: &str, threshold: i32) -> bool {
    let pos = Position::from_fen(fen).unwrap();
    let mv = pos.move_from_uci(uci).unwrap();
    assert!(pos.generate_moves().contains(&mv), "{} not legal in {}", uci, fen);
    static_exchange_evaluation(&pos, mv, threshold)
}

#[test]
fn undefended_piece() {
    // The white queen takes an undefended pawn: wins exactly a pawn.
    let fen = "4k3/8/8/3p4/8/8/3Q4/4K3 w - - 0 1";
    assert!(see(fen, "d2d5", 0));
    assert!(see(fen, "d2d5", piece_value(PieceType::P)));
    assert!(!see(fen, "d2d5", piece_value(PieceType::P) + 1));
}

#[test]
fn single_defender() {
    // The pawn is defended by the queen; taking it loses the queen.
    assert!(!see("4k3/8/3q4/3p4/8/8/3Q4/4K3 w - - 0 1", "d2d5", 0));
    // Defended by a distant bishop instead.
    assert!(!see("4k1b1/8/8/3p4/8/8/3Q4/4K3 w - - 0 1", "d2d5", 0));

    // An even knight trade.
    let fen = "4k3/8/8/3n2r1/8/4N3/8/4K3 w - - 0 1";
    assert!(see(fen, "e3d5", 0));
    assert!(!see(fen, "e3d5", 1));
}

#[test]
fn multiple_defenders() {
    // A knight trade that stays even because the attacker can stand pat after
    // the first exchange.
    let fen = "4k1b1/8/8/3n2r1/8/4N3/8/3RK3 w - - 0 1";
    assert!(see(fen, "e3d5", 0));
    assert!(!see(fen, "e3d5", 1));
}

#[test]
fn discovered_attackers() {
    // Capturing opens the rook on f5 towards the target square; black wins
    // exactly a knight.
    let fen = "4k3/4n3/8/3N1Rr1/8/8/8/4K3 b - - 0 1";
    assert!(see(fen, "e7d5", piece_value(PieceType::N)));
    assert!(!see(fen, "e7d5", piece_value(PieceType::N) + 1));
}

#[test]
fn king_involved() {
    // The king may finish an even exchange when nothing attacks it afterwards.
    let fen = "4k3/4n3/8/3N1Rr1/2K5/8/8/8 b - - 0 1";
    assert!(see(fen, "e7d5", 0));
    assert!(!see(fen, "e7d5", 1));

    // With a second black rook the king may no longer recapture; black wins at
    // least a knight.
    let fen = "4k3/4n3/8/3N1Rrr/2K5/8/8/8 b - - 0 1";
    assert!(see(fen, "e7d5", piece_value(PieceType::N)));
    assert!(!see(fen, "e7d5", piece_value(PieceType::N) + 1));
}

#[test]
fn pinned_defender_cannot_recapture() {
    // The black rook is pinned to its king by the rook on a3: only the even
    // knight trade is available.
    let fen = "7K/4n3/8/3N4/2P5/R2r3k/8/8 b - - 0 1";
    assert!(see(fen, "e7d5", 0));
    assert!(!see(fen, "e7d5", 1));
}

#[test]
fn capturing_the_pinner_unpins() {
    // If white recaptures with the queen, the rook on d3 is unpinned and joins
    // the exchange: black wins a pawn.
    let fen = "3q4/4n3/8/3N4/2P5/1Q1r3k/8/7K b - - 0 1";
    assert!(see(fen, "e7d5", piece_value(PieceType::P)));
    assert!(!see(fen, "e7d5", piece_value(PieceType::P) + 1));
}

#[test]
fn non_normal_moves_evaluate_to_zero() {
    // An en-passant capture is treated as SEE = 0.
    let pos = Position::from_fen("8/8/8/3Pp3/8/8/8/k6K w - e6 0 1").unwrap();
    let ep = pos.move_from_uci("d5e6").unwrap();
    assert!(static_exchange_evaluation(&pos, ep, 0));
    assert!(!static_exchange_evaluation(&pos, ep, 1));
}
