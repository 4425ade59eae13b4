extern crate remora;
extern crate remora_engine;

use remora::Position;
use remora_engine::Searcher;

/// Runs `find_mate` under a node budget and returns the reported distance and
/// the move.
fn find_mate(fen: &str, expected_mate_in: i32, node_limit: i64) -> (i32, String) {
    let max_depth = 20.max(expected_mate_in * 2 + 4);
    let mut searcher = Searcher::new(max_depth, 300.0, 64);
    searcher.set_max_nodes(node_limit);
    searcher.set_board(fen).unwrap();
    searcher.find_mate().unwrap()
}

static MATE_IN_1: [&str; 3] = [
    // Scholar's mate: Qxf7#.
    "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 0 1",
    // Back-rank: Ra8#.
    "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
    // The same back rank from Black's side.
    "r5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1",
];

static MATE_IN_2: [&str; 4] = [
    // Two-rook ladder: Ra7, then Rb8#.
    "7k/8/8/8/8/8/R7/1R5K w - - 0 1",
    // The mirrored ladder for Black.
    "1r5k/r7/8/8/8/8/8/7K b - - 0 1",
    // Queen and king: Qf7+, then Qg7#.
    "6k1/8/6K1/8/8/8/8/5Q2 w - - 0 1",
    // Smothered: Qg8+ Rxg8, then Nf7#.
    "1r5k/6pp/7N/3Q4/8/8/8/7K w - - 0 1",
];

static MATE_IN_3: [&str; 2] = [
    // Stacked rooks: one must swing to the b-file before the ladder mates.
    "8/6k1/8/5PPP/8/8/R7/R6K w - - 0 1",
    // The same, mirrored for Black.
    "r6k/r7/8/8/5ppp/8/6K1/8 b - - 0 1",
];

#[test]
fn mate_in_one_positions() {
    for fen in MATE_IN_1.iter() {
        let (distance, uci) = find_mate(fen, 1, 1_000);
        assert_eq!(distance, 1, "fen: {}", fen);

        // The reported move must actually checkmate.
        let mut pos = Position::from_fen(fen).unwrap();
        let mv = pos.move_from_uci(&uci).unwrap();
        assert!(pos.generate_moves().contains(&mv), "fen: {}", fen);
        pos.make_move(mv);
        assert!(pos.in_check(pos.turn()), "fen: {}", fen);
        assert!(pos.generate_moves().is_empty(), "fen: {}", fen);
    }
}

#[test]
fn mate_in_two_positions() {
    for fen in MATE_IN_2.iter() {
        let (distance, _) = find_mate(fen, 2, 10_000);
        assert_eq!(distance, 2, "fen: {}", fen);
    }
}

#[test]
fn mate_in_three_positions() {
    for fen in MATE_IN_3.iter() {
        let (distance, _) = find_mate(fen, 3, 100_000);
        assert_eq!(distance, 3, "fen: {}", fen);
    }
}

#[test]
fn getting_mated_reports_a_negative_distance() {
    // The second rook seals the second rank: whatever White plays, Ra1#
    // follows.
    let fen = "r6k/8/8/8/8/8/1r3PPP/6K1 w - - 0 1";
    let mut searcher = Searcher::new(8, 60.0, 16);
    searcher.set_max_nodes(50_000);
    searcher.set_board(fen).unwrap();
    let (distance, _) = searcher.find_mate().unwrap();
    assert_eq!(distance, -1);
}

#[test]
fn no_mate_reports_zero() {
    let (distance, _) = find_mate(
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        0,
        5_000,
    );
    assert_eq!(distance, 0);
}
