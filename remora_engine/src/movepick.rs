//! The staged move picker.
//!
//! Rather than materializing and sorting every move up front, the picker is a
//! small state machine advanced by [`next`], yielding one move at a time in a
//! good-first order and generating each segment only when the previous one ran
//! dry:
//!
//! ```md,ignore
//! Normal:     TT move -> good captures (SEE >= 0) -> killers -> quiets -> bad captures
//! Evasions:   TT move -> all evasions, captures first
//! Quiescence: TT move (if a capture or queen promotion) -> good captures
//! ```
//!
//! The TT move is trusted only after passing the pseudo-legality oracle, which
//! defends against hash collisions; killer moves get the same treatment. Moves
//! already emitted as the TT move or a killer are skipped by later segments.
//!
//! [`next`]: struct.MovePicker.html#method.next

use std::mem;

use remora::core::move_list::MAX_MOVES;
use remora::helper::prelude::piece_value;
use remora::{BitMove, GenTypes, PieceType, Position};

use crate::see::static_exchange_evaluation;
use crate::tables::ButterflyHistory;

/// Bonus slapped onto queen promotions when scoring captures.
const PROMO_SCORE_BONUS: i32 = 90_000;
/// Bonus for capturing evasions over blocking ones.
const EVASION_CAPTURE_BONUS: i32 = 1_000;
/// Quiet bonus for moves by pieces other than pawns and the king.
const QUIET_MINOR_MAJOR_BONUS: i32 = 1_000;

/// The stages the picker walks through. Each chain advances only within
/// itself.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
enum Stage {
    // Normal search
    TTMoveNormal = 0,
    ScoreCaptures = 1,
    GoodCaptures = 2,
    FirstKiller = 3,
    SecondKiller = 4,
    ScoreQuiets = 5,
    Quiets = 6,
    BadCaptures = 7,

    // Quiescence search
    TTMoveQuiescence = 8,
    ScoreQuiescenceCaptures = 9,
    GoodQuiescenceCaptures = 10,

    // Check evasions, shared by both searches
    TTMoveEvasion = 11,
    ScoreEvasions = 12,
    Evasions = 13,
}

impl Stage {
    #[inline(always)]
    fn incr(&mut self) {
        debug_assert!(*self != Stage::BadCaptures);
        debug_assert!(*self != Stage::GoodQuiescenceCaptures);
        debug_assert!(*self != Stage::Evasions);
        unsafe { *self = mem::transmute(*self as u8 + 1) }
    }
}

#[derive(Copy, Clone)]
struct ScoredMove {
    mv: BitMove,
    score: i32,
}

impl Default for ScoredMove {
    fn default() -> Self {
        ScoredMove {
            mv: BitMove::null(),
            score: 0,
        }
    }
}

/// Staged move picker. Holds no reference to the position; the caller passes
/// the (restored) position into every [`next`] call, which must describe the
/// same position the picker was created for.
///
/// [`next`]: struct.MovePicker.html#method.next
pub struct MovePicker {
    stage: Stage,
    tt_move: BitMove,
    killers: [BitMove; 2],

    moves: [ScoredMove; MAX_MOVES],
    cur: usize,
    end: usize,
    bad_begin: usize,
    bad_end: usize,
}

impl MovePicker {
    /// Creates a move picker for the main search.
    pub fn new(pos: &Position, tt_move: BitMove, killers: [BitMove; 2]) -> MovePicker {
        let stage = if pos.in_check(pos.turn()) {
            Stage::TTMoveEvasion
        } else {
            Stage::TTMoveNormal
        };
        MovePicker::init(pos, stage, tt_move, killers)
    }

    /// Creates a move picker for the quiescence search: the TT move is used
    /// only if it belongs to the quiescence move set (a capture or a queen
    /// promotion), followed by good captures. In check, evasions are produced
    /// instead so that mates are not missed.
    pub fn quiescence(pos: &Position, mut tt_move: BitMove) -> MovePicker {
        let stage = if pos.in_check(pos.turn()) {
            Stage::TTMoveEvasion
        } else {
            if !tt_move.is_null()
                && pos.captured_piece(tt_move) == PieceType::None
                && !(tt_move.is_promo() && tt_move.promo_piece() == PieceType::Q)
            {
                tt_move = BitMove::null();
            }
            Stage::TTMoveQuiescence
        };
        MovePicker::init(pos, stage, tt_move, [BitMove::null(); 2])
    }

    fn init(pos: &Position, mut stage: Stage, tt_move: BitMove, killers: [BitMove; 2]) -> Self {
        // A zobrist collision can hand us a move from a different position
        // entirely; drop anything the oracle rejects.
        if tt_move.is_null() || !pos.pseudo_legal(tt_move) {
            stage.incr();
        }
        MovePicker {
            stage,
            tt_move,
            killers,
            moves: [ScoredMove::default(); MAX_MOVES],
            cur: 0,
            end: 0,
            bad_begin: 0,
            bad_end: 0,
        }
    }

    /// Returns the next-best move, or `BitMove::null()` when no moves remain.
    /// Every yielded move is legal and yielded exactly once.
    pub fn next(&mut self, pos: &Position, history: &ButterflyHistory) -> BitMove {
        loop {
            match self.stage {
                Stage::TTMoveNormal | Stage::TTMoveQuiescence | Stage::TTMoveEvasion => {
                    self.stage.incr();
                    return self.tt_move;
                }

                Stage::ScoreCaptures | Stage::ScoreQuiescenceCaptures => {
                    let list = pos.generate_moves_of_type(GenTypes::Captures);
                    self.cur = 0;
                    self.end = 0;
                    for mv in &list {
                        self.moves[self.end] = ScoredMove {
                            mv,
                            score: score_capture(pos, mv),
                        };
                        self.end += 1;
                    }
                    self.bad_end = self.end;
                    self.moves[..self.end].sort_by(|a, b| b.score.cmp(&a.score));
                    self.stage.incr();
                }

                Stage::GoodCaptures | Stage::GoodQuiescenceCaptures => {
                    while self.cur < self.end {
                        let mv = self.moves[self.cur].mv;
                        if mv == self.tt_move {
                            self.cur += 1;
                            continue;
                        }
                        if static_exchange_evaluation(pos, mv, 0) {
                            self.cur += 1;
                            return mv;
                        }
                        // Losing capture: defer it to the very end.
                        self.end -= 1;
                        self.moves.swap(self.cur, self.end);
                    }
                    if self.stage == Stage::GoodQuiescenceCaptures {
                        return BitMove::null();
                    }
                    self.bad_begin = self.end;
                    self.stage.incr();
                }

                Stage::FirstKiller | Stage::SecondKiller => {
                    let killer = if self.stage == Stage::FirstKiller {
                        self.killers[0]
                    } else {
                        self.killers[1]
                    };
                    self.stage.incr();
                    if !killer.is_null()
                        && killer != self.tt_move
                        && is_quiet(pos, killer)
                        && pos.pseudo_legal(killer)
                    {
                        return killer;
                    }
                }

                Stage::ScoreQuiets => {
                    let list = pos.generate_moves_of_type(GenTypes::Quiets);
                    self.cur = self.bad_end;
                    self.end = self.bad_end;
                    for mv in &list {
                        self.moves[self.end] = ScoredMove {
                            mv,
                            score: score_quiet(pos, history, mv),
                        };
                        self.end += 1;
                    }
                    self.moves[self.cur..self.end].sort_by(|a, b| b.score.cmp(&a.score));
                    self.stage.incr();
                }

                Stage::Quiets => {
                    while self.cur < self.end {
                        let mv = self.moves[self.cur].mv;
                        self.cur += 1;
                        if mv == self.tt_move || mv == self.killers[0] || mv == self.killers[1] {
                            continue;
                        }
                        return mv;
                    }
                    self.stage = Stage::BadCaptures;
                }

                Stage::BadCaptures => {
                    while self.bad_begin < self.bad_end {
                        let mv = self.moves[self.bad_begin].mv;
                        self.bad_begin += 1;
                        if mv == self.tt_move {
                            continue;
                        }
                        return mv;
                    }
                    return BitMove::null();
                }

                Stage::ScoreEvasions => {
                    let list = pos.generate_moves_of_type(GenTypes::Evasions);
                    self.cur = 0;
                    self.end = 0;
                    for mv in &list {
                        self.moves[self.end] = ScoredMove {
                            mv,
                            score: score_evasion(pos, mv),
                        };
                        self.end += 1;
                    }
                    self.moves[..self.end].sort_by(|a, b| b.score.cmp(&a.score));
                    self.stage.incr();
                }

                Stage::Evasions => {
                    while self.cur < self.end {
                        let mv = self.moves[self.cur].mv;
                        self.cur += 1;
                        if mv == self.tt_move {
                            continue;
                        }
                        return mv;
                    }
                    return BitMove::null();
                }
            }
        }
    }
}

/// Captures are ordered most-valuable-victim / least-valuable-attacker, with
/// queen promotions on top.
fn score_capture(pos: &Position, mv: BitMove) -> i32 {
    let mut score =
        piece_value(pos.captured_piece(mv)) - piece_value(pos.moved_piece(mv).type_of());
    if mv.is_promo() {
        score += PROMO_SCORE_BONUS;
    }
    score
}

/// Evasions prefer capturing the checker over blocking.
fn score_evasion(pos: &Position, mv: BitMove) -> i32 {
    if pos.captured_piece(mv) != PieceType::None {
        EVASION_CAPTURE_BONUS
    } else {
        0
    }
}

/// Quiets are ordered by butterfly history, with a small bonus for minor and
/// major pieces and a small bias towards the center.
fn score_quiet(pos: &Position, history: &ButterflyHistory, mv: BitMove) -> i32 {
    let piece = pos.moved_piece(mv);
    let to = mv.get_dest();

    let mut score = history.get(piece, to);
    let pt = piece.type_of();
    if pt != PieceType::P && pt != PieceType::K {
        score += QUIET_MINOR_MAJOR_BONUS;
    }

    let center_dist = (3 - to.file() as i32).abs() + (3 - to.rank() as i32).abs();
    score + (10 - center_dist)
}

/// Returns if a move belongs to the quiet segment of the current position: not
/// a capture and not a queen promotion.
fn is_quiet(pos: &Position, mv: BitMove) -> bool {
    pos.captured_piece(mv) == PieceType::None
        && !(mv.is_promo() && mv.promo_piece() == PieceType::Q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn drain(pos: &Position, tt_move: BitMove, killers: [BitMove; 2]) -> Vec<BitMove> {
        let history = ButterflyHistory::new();
        let mut picker = MovePicker::new(pos, tt_move, killers);
        let mut out = Vec::new();
        loop {
            let mv = picker.next(pos, &history);
            if mv.is_null() {
                break;
            }
            out.push(mv);
        }
        out
    }

    #[test]
    fn yields_every_legal_move_once() {
        let fens = [
            remora::position::fen::START_POS_FEN,
            remora::position::fen::COMPLEX_POS_FEN,
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            "8/P1k5/K7/8/8/8/8/8 w - - 0 1",
            "8/8/8/3Pp3/8/8/8/k6K w - e6 0 1",
        ];
        for fen in fens.iter() {
            let pos = Position::from_fen(fen).unwrap();
            let picked = drain(&pos, BitMove::null(), [BitMove::null(); 2]);
            let legal = pos.generate_moves();

            assert_eq!(picked.len(), legal.len(), "fen: {}", fen);
            let set: HashSet<u16> = picked.iter().map(|m| m.get_raw()).collect();
            assert_eq!(set.len(), picked.len(), "duplicates for fen: {}", fen);
            for mv in &legal {
                assert!(set.contains(&mv.get_raw()), "fen: {} missing {}", fen, mv);
            }
        }
    }

    #[test]
    fn yields_evasions_in_check() {
        let pos = Position::from_fen("8/4k3/3n1p2/6p1/3N1KP1/7P/8/8 w - - 0 1").unwrap();
        assert!(pos.in_check(pos.turn()));
        let picked = drain(&pos, BitMove::null(), [BitMove::null(); 2]);
        let legal = pos.generate_moves();
        assert_eq!(picked.len(), legal.len());
    }

    #[test]
    fn tt_move_comes_first_and_is_not_repeated() {
        let pos = Position::start_pos();
        let tt_move = pos.move_from_uci("e2e4").unwrap();
        let picked = drain(&pos, tt_move, [BitMove::null(); 2]);
        assert_eq!(picked[0], tt_move);
        assert_eq!(picked.iter().filter(|m| **m == tt_move).count(), 1);
        assert_eq!(picked.len(), pos.generate_moves().len());
    }

    #[test]
    fn bogus_tt_move_is_rejected() {
        let pos = Position::start_pos();
        // A move from a colliding hash entry: e5 holds no piece at all.
        let bogus = pos.move_from_uci("e5d6").unwrap();
        let picked = drain(&pos, bogus, [BitMove::null(); 2]);
        assert!(picked.iter().all(|m| *m != bogus));
        assert_eq!(picked.len(), pos.generate_moves().len());
    }

    #[test]
    fn killers_follow_good_captures() {
        let pos = Position::start_pos();
        let killer = pos.move_from_uci("b1c3").unwrap();
        let picked = drain(&pos, BitMove::null(), [killer, BitMove::null()]);
        // No captures at the start position, so the killer leads.
        assert_eq!(picked[0], killer);
        assert_eq!(picked.iter().filter(|m| **m == killer).count(), 1);
    }
}
