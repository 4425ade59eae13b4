//! FEN (Forsyth-Edwards Notation) constants and test positions.
//!
//! A FEN string describes a chess position in six whitespace-separated fields:
//! piece placement, side to move, castling rights, en-passant target, halfmove
//! clock, and fullmove number. See [`Position::from_fen`] for the accepted
//! grammar.
//!
//! [`Position::from_fen`]: ../struct.Position.html#method.from_fen

/// FEN string of the start position.
pub const START_POS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A complex but quiet middlegame position.
pub const COMPLEX_POS_FEN: &str =
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

#[doc(hidden)]
pub static FENS_MIDDLE_GAME: [&str; 7] = [
    "rnbqkbnr/pppp1ppp/8/4Q3/3P4/8/PPP1PPPP/RNB1KBNR b KQkq - 0 2",
    "2r4r/p5pp/8/2B1Q2k/1P1P4/2P3P1/P4P1P/4K2R b K - 0 2",
    "2r4r/pB4pp/2b5/3Q4/1P6/2P2kP1/P4P1P/4K2R b K - 0 2",
    "7r/1R1p1kpp/8/4P3/2B5/1P4P1/P6P/3QK3 b - - 0 2",
    "rnb2rk1/p4pbp/3p2p1/qBpP4/4N3/5N1P/PP3PP1/R1BQK2R w KQ - 0 1",
    "6k1/r2b1p1p/2pq2p1/1p1p4/1P1PN3/1R2Pn1P/2B2PP1/1Q4K1 w - - 0 1",
    "r2q1rk1/1pp3pp/p1n1p3/4p3/4P1n1/2P4P/PPBN1KP1/R1BQ3R w - - 0 1",
];

#[doc(hidden)]
pub static FENS_SINGLE_CHECK: [&str; 4] = [
    "8/4k3/3n1p2/6p1/3N1KP1/7P/8/8 w - - 0 1",
    "8/5k2/3n1p2/8/3N2Pp/6K1/8/8 w - - 0 1",
    "8/8/3n2k1/5P2/3N4/6K1/8/8 b - - 0 1",
    "4R1k1/pp5p/3nN1p1/3p4/1P5P/2P2P2/P5P1/6K1 b - - 0 1",
];

#[doc(hidden)]
pub static FENS_DOUBLE_CHECK: [&str; 2] = [
    "4r3/pp4k1/5rnp/2p5/2P1B3/P1N1p3/1P1R1KPP/8 w - - 0 1",
    "7r/4k1p1/1q1P2p1/1p4P1/p1p1R3/6P1/PP2Q1K1/8 b - - 0 1",
];

#[doc(hidden)]
pub static FENS_EN_PASSANT: [&str; 5] = [
    "8/8/8/3Pp3/8/8/8/k6K w - e6 0 1",
    "7b/8/4k3/3pP3/4K3/8/8/8 w - d6 0 2",
    "r1b2rk1/1pp1q2p/3p2p1/pP1Pb3/PR1pPp2/3P1P2/2Q1B1PP/2B2RK1 w - a6 0 1",
    "r1bq1rk1/pp1pb1pp/2n1p1n1/4Pp2/2P5/1P1BQN2/PB3PPP/RN3RK1 w - f6 0 1",
    "r2q1rk1/pp4pp/1np1p3/4Pp2/3P1P1b/2NQB3/PP4PP/3R1RK1 w - f6 0 1",
];

#[doc(hidden)]
pub static FENS_CASTLING: [&str; 6] = [
    "rnbqk2r/p3ppPp/5n2/Pp1p4/8/3P1Q2/1pP2PPP/R1B1K2R w KQkq b6 0 1",
    "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
    "r3k2r/8/3Q4/8/8/5q2/8/R3K2R b KQkq - 0 1",
    "r3k2r/1b4bq/8/8/8/8/7B/R3K2R w KQkq - 0 1",
    "3k4/8/8/8/8/8/8/R3K3 w Q - 0 1",
    "5k2/8/8/8/8/8/8/4K2R w K - 0 1",
];

#[doc(hidden)]
pub static FENS_PROMOTION: [&str; 4] = [
    "8/P7/8/8/8/8/8/k6K w - - 0 1",
    "2K2r2/4P3/8/8/8/8/8/3k4 w - - 0 1",
    "4k3/1P6/8/8/8/8/K7/8 w - - 0 1",
    "8/P1k5/K7/8/8/8/8/8 w - - 0 1",
];

lazy_static! {
    /// Every test position above, plus the start position, gathered for
    /// sweep-style tests.
    #[doc(hidden)]
    pub static ref ALL_FENS: Vec<&'static str> = {
        let mut vec = Vec::new();
        vec.push(START_POS_FEN);
        vec.push(COMPLEX_POS_FEN);
        vec.extend_from_slice(&FENS_MIDDLE_GAME);
        vec.extend_from_slice(&FENS_SINGLE_CHECK);
        vec.extend_from_slice(&FENS_DOUBLE_CHECK);
        vec.extend_from_slice(&FENS_EN_PASSANT);
        vec.extend_from_slice(&FENS_CASTLING);
        vec.extend_from_slice(&FENS_PROMOTION);
        vec
    };
}
