//! The [`SearchPosition`]: a `Position` wrapped with an incrementally
//! maintained tapered evaluation, a pawn-structure cache, and the Zobrist
//! history needed for repetition detection.
//!
//! [`SearchPosition`]: struct.SearchPosition.html

use remora::core::score::Value;
use remora::helper::prelude::*;
use remora::helper::psqt::{MATERIAL_WEIGHTS, PHASE_MAX, PHASE_MIN, PHASE_WIDTH};
use remora::position::FenBuildError;
use remora::{BitMove, MoveType, Phase, PieceType, Player, Position};

use crate::eval;
use crate::pawn_table::PawnTable;

/// Default size of the pawn-structure cache, in megabytes.
const PAWN_TABLE_MB: usize = 4;

/// A tapered evaluation from White's perspective: a middle-game score, an
/// end-game score, and the material phase blending them.
#[derive(Copy, Clone)]
struct Eval {
    mg: Value,
    eg: Value,
    phase: Value,
}

/// Incremental evaluation wrapper around a [`Position`].
///
/// Normal moves update the evaluation by piece-square deltas; promotions,
/// castles and en-passant captures trigger a full recompute, their frequency
/// being too low to justify the incremental bookkeeping.
///
/// [`Position`]: ../../remora/position/struct.Position.html
pub struct SearchPosition {
    pos: Position,

    /// One evaluation per position reached, parallel to the make/undo stack.
    evals: Vec<Eval>,
    pawn_table: PawnTable,

    /// Zobrist keys of all ancestor positions.
    zobrist_history: Vec<u64>,
    /// Indices into the history marking halfmove-clock resets; repetitions
    /// cannot reach past the most recent one.
    irreversible_plies: Vec<usize>,
}

impl SearchPosition {
    /// Creates a search position at the standard starting position.
    pub fn new() -> SearchPosition {
        let pos = Position::start_pos();
        let mut spos = SearchPosition {
            pos,
            evals: Vec::with_capacity(128),
            pawn_table: PawnTable::new(PAWN_TABLE_MB),
            zobrist_history: Vec::with_capacity(128),
            irreversible_plies: Vec::with_capacity(64),
        };
        spos.reset_accumulators();
        spos
    }

    /// Sets the board from a FEN description, resetting all accumulated state.
    pub fn set_board(&mut self, fen: &str) -> Result<(), FenBuildError> {
        self.pos = Position::from_fen(fen)?;
        self.reset_accumulators();
        Ok(())
    }

    fn reset_accumulators(&mut self) {
        self.evals.clear();
        let eval = self.compute_full_eval();
        self.evals.push(eval);
        self.zobrist_history.clear();
        self.irreversible_plies.clear();
        self.irreversible_plies.push(0);
    }

    /// Returns the wrapped position.
    #[inline(always)]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns the evaluation of the position from the perspective of the side
    /// to move, blending the middle-game and end-game scores by the material
    /// phase and adding the cached pawn-structure term.
    pub fn evaluate(&mut self) -> Value {
        let eval = *self.evals.last().unwrap();

        // The piece-pair bonuses depend on piece counts only, so they are
        // cheap enough to fold in at evaluation time.
        let pairs = eval::piece_pairs(&self.pos);
        let mg = eval.mg + pairs.mg();
        let eg = eval.eg + pairs.eg();

        let phase = eval.phase.max(PHASE_MIN).min(PHASE_MAX);
        let weight = phase - PHASE_MIN;
        let mut value = (mg * weight + eg * (PHASE_WIDTH - weight)) / PHASE_WIDTH;

        value += self.pawn_structure_cached();

        if self.pos.turn() == Player::White {
            value
        } else {
            -value
        }
    }

    /// The pawn-structure term, looked up under the pawn key or computed and
    /// stored on a miss.
    fn pawn_structure_cached(&mut self) -> Value {
        let key = self.pos.pawn_key();
        if let Some(cached) = self.pawn_table.find(key) {
            return cached;
        }
        let value = eval::pawn_structure(&self.pos);
        self.pawn_table.store(key, value);
        value
    }

    /// Returns how many times the current position has occurred, counting the
    /// current one and scanning only the tail after the last irreversible move.
    pub fn repetition_count(&self) -> u32 {
        let mut count = 1;
        let current = self.pos.zobrist();
        let start = *self.irreversible_plies.last().unwrap();
        for &key in &self.zobrist_history[start..] {
            count += (key == current) as u32;
        }
        count
    }

    /// Returns the number of plies since the last irreversible (pawn or
    /// capture) move.
    pub fn plies_since_irreversible(&self) -> usize {
        self.zobrist_history.len() - *self.irreversible_plies.last().unwrap()
    }

    /// Returns the current material phase.
    pub fn material_phase(&self) -> Value {
        self.evals.last().unwrap().phase
    }

    /// Makes a move, updating the evaluation incrementally for normal moves
    /// and recomputing it for the rest.
    pub fn make_move(&mut self, mv: BitMove) {
        self.zobrist_history.push(self.pos.zobrist());

        let mut eval = *self.evals.last().unwrap();

        if mv.move_type() != MoveType::Normal {
            // Slower recomputation for the rarer move kinds.
            self.pos.make_move(mv);
            eval = self.compute_full_eval();
        } else {
            let side = self.pos.turn();
            let from = mv.get_src();
            let to = mv.get_dest();
            let pt = self.pos.piece_at(from).type_of();
            let sign: Value = if side == Player::White { 1 } else { -1 };

            // The mover leaves one square and lands on another.
            eval.mg += sign
                * (psq(pt, side, to, Phase::MG) - psq(pt, side, from, Phase::MG));
            eval.eg += sign
                * (psq(pt, side, to, Phase::EG) - psq(pt, side, from, Phase::EG));

            let captured = self.pos.captured_piece(mv);
            if captured != PieceType::None {
                let opp = !side;
                eval.phase -= MATERIAL_WEIGHTS[captured as usize];
                eval.mg += sign * (piece_value(captured) + psq(captured, opp, to, Phase::MG));
                eval.eg += sign * (piece_value(captured) + psq(captured, opp, to, Phase::EG));
            }

            self.pos.make_move(mv);
        }

        self.evals.push(eval);

        if self.pos.halfmove_clock() == 0 {
            self.irreversible_plies.push(self.zobrist_history.len());
        }
    }

    /// Un-does the last move. Returns `false` when there is nothing to undo.
    pub fn undo_move(&mut self) -> bool {
        if self.evals.len() <= 1 {
            return false;
        }
        self.evals.pop();
        self.pos.undo_move();

        if *self.irreversible_plies.last().unwrap() == self.zobrist_history.len()
            && self.irreversible_plies.len() > 1
        {
            self.irreversible_plies.pop();
        }
        self.zobrist_history.pop();
        true
    }

    /// Passes the turn. The evaluation is unchanged apart from the side flip
    /// applied in [`evaluate`].
    ///
    /// [`evaluate`]: struct.SearchPosition.html#method.evaluate
    pub fn make_null_move(&mut self) {
        self.zobrist_history.push(self.pos.zobrist());
        let eval = *self.evals.last().unwrap();
        self.evals.push(eval);
        self.pos.make_null_move();
    }

    /// Reverts a null move.
    pub fn undo_null_move(&mut self) {
        debug_assert!(self.evals.len() > 1);
        self.evals.pop();
        self.pos.undo_null_move();
        self.zobrist_history.pop();
    }

    /// Computes the evaluation from scratch: material, piece-square values,
    /// and the material phase.
    fn compute_full_eval(&self) -> Eval {
        let mut eval = Eval {
            mg: 0,
            eg: 0,
            phase: 0,
        };

        let mut occ = self.pos.occupied();
        while let Some(sq) = occ.pop_some_lsb() {
            let piece = self.pos.piece_at(sq);
            let pt = piece.type_of();
            let player = piece.player_lossy();
            let sign: Value = if player == Player::White { 1 } else { -1 };

            eval.phase += MATERIAL_WEIGHTS[pt as usize];
            eval.mg += sign * (piece_value(pt) + psq(pt, player, sq, Phase::MG));
            eval.eg += sign * (piece_value(pt) + psq(pt, player, sq, Phase::EG));
        }

        eval.phase = eval.phase.min(PHASE_MAX);
        eval
    }
}

impl Default for SearchPosition {
    fn default() -> Self {
        SearchPosition::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_evaluates_to_zero() {
        let mut spos = SearchPosition::new();
        assert_eq!(spos.evaluate(), 0);
    }

    #[test]
    fn incremental_matches_full_recompute() {
        let mut spos = SearchPosition::new();
        for uci in &["e2e4", "d7d5", "e4d5", "d8d5", "b1c3"] {
            let mv = spos.position().move_from_uci(uci).unwrap();
            spos.make_move(mv);

            let fen = spos.position().fen();
            let mut fresh = SearchPosition::new();
            fresh.set_board(&fen).unwrap();
            assert_eq!(spos.evaluate(), fresh.evaluate(), "after {}", uci);
        }
        while spos.undo_move() {}
        assert_eq!(spos.evaluate(), 0);
    }

    #[test]
    fn repetition_detection() {
        let mut spos = SearchPosition::new();
        for uci in &["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = spos.position().move_from_uci(uci).unwrap();
            spos.make_move(mv);
        }
        // Back at the start position: second occurrence.
        assert_eq!(spos.repetition_count(), 2);
        assert_eq!(spos.plies_since_irreversible(), 4);

        for uci in &["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = spos.position().move_from_uci(uci).unwrap();
            spos.make_move(mv);
        }
        assert_eq!(spos.repetition_count(), 3);
    }

    #[test]
    fn irreversible_moves_cut_the_tail() {
        let mut spos = SearchPosition::new();
        for uci in &["e2e4", "e7e5", "g1f3", "g8f6"] {
            let mv = spos.position().move_from_uci(uci).unwrap();
            spos.make_move(mv);
        }
        // The pawn moves reset the clock; only two reversible plies since.
        assert_eq!(spos.plies_since_irreversible(), 2);
        assert_eq!(spos.repetition_count(), 1);
    }
}
