//! Module for generating moves from a `Position`. Allows for generating legal
//! and pseudo-legal moves of various types.
//!
//! # Generation types
//!
//! The types of moves that can be generated are [`GenTypes`]:
//! `All`, `Captures`, `Quiets`, and `Evasions`.
//!
//! Generating `All` moves is valid in every position. `Captures` (captures plus
//! queen promotions) and `Quiets` (everything else, under-promotions included)
//! may only be generated when not in check, while `Evasions` may only be
//! generated when in check.
//!
//! # `Legal` vs. `PseudoLegal` moves
//!
//! For the generation type, moves can either be generated as legal or
//! pseudo-legal. Pseudo-legal moves skip the king-safety filter; they must be
//! checked with [`Position::legal`] before being applied to the board.
//!
//! [`GenTypes`]: ../../core/enum.GenTypes.html
//! [`Position::legal`]: ../struct.Position.html#method.legal

use std::mem;
use std::ptr;

use super::Position;

use crate::core::bitboard::BitBoard;
use crate::core::mono_traits::*;
use crate::core::move_list::MoveList;
use crate::core::piece_move::BitMove;
use crate::core::sq::{NO_SQ, SQ};
use crate::core::{CastleType, GenTypes, PieceType, Player, Rank};
use crate::helper::prelude::*;

/// Determines if the moves generated are `PseudoLegal` or `Legal` moves.
/// PseudoLegal moves require a separate legality check before being applied to
/// a `Position`.
pub trait Legality {
    /// Returns if only legal moves should be generated.
    fn gen_legal() -> bool;
}

/// Dummy struct to represent the generation of legal moves.
pub struct Legal {}

/// Dummy struct to represent the generation of pseudo-legal moves.
pub struct PseudoLegal {}

impl Legality for Legal {
    #[inline(always)]
    fn gen_legal() -> bool {
        true
    }
}

impl Legality for PseudoLegal {
    #[inline(always)]
    fn gen_legal() -> bool {
        false
    }
}

/// Public move generator.
///
/// A wrapper around the monomorphized `InnerMoveGen`, providing a friendlier
/// API.
pub struct MoveGen {}

impl MoveGen {
    /// Returns a `MoveList` of all moves of the given legality and generation
    /// type for the position.
    #[inline]
    pub fn generate<L: Legality, G: GenTypeTrait>(pos: &Position) -> MoveList {
        let mut movelist = MoveList::default();
        unsafe {
            let ptr: *mut BitMove = movelist.as_mut_ptr();
            let new_ptr = InnerMoveGen::generate::<L, G>(pos, ptr);
            let new_size = (new_ptr as usize - ptr as usize) / mem::size_of::<BitMove>();
            movelist.unchecked_set_len(new_size);
        }
        movelist
    }

    /// Writes the generated moves starting at `ptr`, returning a pointer one
    /// past the last move written.
    ///
    /// # Safety
    ///
    /// The buffer behind `ptr` must have room for every generated move (256
    /// entries always suffice).
    #[inline(always)]
    pub unsafe fn extend_from_ptr<L: Legality, G: GenTypeTrait>(
        pos: &Position,
        ptr: *mut BitMove,
    ) -> *mut BitMove {
        InnerMoveGen::generate::<L, G>(pos, ptr)
    }
}

/// Structure to generate moves from. Stores the current state of the board and
/// the write cursor.
struct InnerMoveGen<'a> {
    ptr: *mut BitMove,
    pos: &'a Position,
    /// Squares occupied by all pieces.
    occ: BitBoard,
    /// Squares occupied by the player to move.
    us_occ: BitBoard,
    /// Squares occupied by the opposing player.
    them_occ: BitBoard,
}

impl<'a> InnerMoveGen<'a> {
    #[inline(always)]
    fn generate<L: Legality, G: GenTypeTrait>(pos: &Position, ptr: *mut BitMove) -> *mut BitMove {
        match pos.turn() {
            Player::White => InnerMoveGen::generate_helper::<L, G, WhiteType>(pos, ptr),
            Player::Black => InnerMoveGen::generate_helper::<L, G, BlackType>(pos, ptr),
        }
    }

    #[inline(always)]
    fn get_self(pos: &'a Position, ptr: *mut BitMove) -> Self {
        InnerMoveGen {
            ptr,
            pos,
            occ: pos.occupied(),
            us_occ: pos.occupied_player(pos.turn()),
            them_occ: pos.occupied_player(!pos.turn()),
        }
    }

    fn generate_helper<L: Legality, G: GenTypeTrait, P: PlayerTrait>(
        pos: &Position,
        ptr: *mut BitMove,
    ) -> *mut BitMove {
        let mut movegen = InnerMoveGen::get_self(pos, ptr);
        let gen_type = G::gen_type();

        if gen_type == GenTypes::Evasions {
            movegen.generate_evasions::<L, P>();
        } else if gen_type == GenTypes::All {
            if movegen.pos.in_check(P::player()) {
                movegen.generate_evasions::<L, P>();
            } else {
                movegen.generate_non_evasions::<L, AllGenType, P>();
            }
        } else {
            movegen.generate_non_evasions::<L, G, P>();
        }
        movegen.ptr
    }

    fn generate_non_evasions<L: Legality, G: GenTypeTrait, P: PlayerTrait>(&mut self) {
        debug_assert_ne!(G::gen_type(), GenTypes::Evasions);
        debug_assert!(!self.pos.in_check(P::player()));

        // Target is the bitboard of squares the generator aims for.
        let target: BitBoard = match G::gen_type() {
            GenTypes::All => !self.us_occ,
            GenTypes::Captures => self.them_occ,
            GenTypes::Quiets => !(self.us_occ | self.them_occ),
            GenTypes::Evasions => unreachable!(),
        };

        self.generate_all::<L, G, P>(target);
    }

    /// Generates moves for all pieces with the given target. Used by both the
    /// non-evasion modes and (with a constrained target) single-check evasions.
    fn generate_all<L: Legality, G: GenTypeTrait, P: PlayerTrait>(&mut self, target: BitBoard) {
        self.generate_pawn_moves::<L, G, P>(target);
        self.moves_per_piece::<L, P, KnightType>(target);
        self.moves_per_piece::<L, P, BishopType>(target);
        self.moves_per_piece::<L, P, RookType>(target);
        self.moves_per_piece::<L, P, QueenType>(target);

        if G::gen_type() != GenTypes::Evasions {
            self.moves_per_piece::<L, P, KingType>(target);
        }

        if G::gen_type() != GenTypes::Captures
            && G::gen_type() != GenTypes::Evasions
            && self.pos.castling().player_can_castle(P::player())
        {
            self.generate_castling::<L, P>();
        }
    }

    /// Generates evasions for a position in check: king steps off the checking
    /// slider lines, plus interpositions and captures when only one piece gives
    /// check.
    fn generate_evasions<L: Legality, P: PlayerTrait>(&mut self) {
        debug_assert!(self.pos.in_check(P::player()));

        let ksq: SQ = self.pos.king_sq(P::player());
        let checkers = self.pos.checkers();

        // All squares attacked by checking sliders, through and beyond the
        // king, are unavailable to it.
        let mut slider_attacks = BitBoard(0);
        let mut sliders = checkers
            & !(self.pos.type_bb(PieceType::P) | self.pos.type_bb(PieceType::N));
        while let Some((check_sq, check_sq_bb)) = sliders.pop_some_lsb_and_bit() {
            slider_attacks |= line_bb(check_sq, ksq) ^ check_sq_bb;
        }

        let mut k_moves = king_moves(ksq) & !slider_attacks & !self.us_occ;
        while let Some(dst) = k_moves.pop_some_lsb() {
            self.check_and_add::<L>(BitMove::make_normal(ksq, dst));
        }

        // With a single checker, blocking the ray or capturing the checker is
        // also possible.
        if !checkers.more_than_one() {
            let checking_sq = checkers.to_sq();
            let target = between_bb(checking_sq, ksq) | checking_sq.to_bb();
            self.generate_all::<L, EvasionsGenType, P>(target);
        }
    }

    fn generate_castling<L: Legality, P: PlayerTrait>(&mut self) {
        self.castling_side::<L, P>(CastleType::KingSide);
        self.castling_side::<L, P>(CastleType::QueenSide);
    }

    /// Generates castling for a single side. Castling is possible only when not
    /// in check, the squares between king and rook are empty, and the square
    /// the king crosses is not attacked. The destination square is covered by
    /// the king-move legality filter.
    fn castling_side<L: Legality, P: PlayerTrait>(&mut self, side: CastleType) {
        let us = P::player();
        if !self.pos.can_castle(us, side) || self.pos.in_check(us) {
            return;
        }

        let clear = castle_clear_bb(us, side as usize);
        if (clear & self.occ).is_not_empty() {
            return;
        }

        let ksq = us.king_start();
        let (crossed, k_dst) = match side {
            CastleType::KingSide => (ksq + SQ(1), ksq + SQ(2)),
            CastleType::QueenSide => (ksq - SQ(1), ksq - SQ(2)),
        };
        if self.pos.attackers_exist(P::opp_player(), crossed, self.occ) {
            return;
        }

        self.check_and_add::<L>(BitMove::make_castle(ksq, k_dst));
    }

    /// Gets the moves for each piece of one non-pawn type.
    fn moves_per_piece<L: Legality, PL: PlayerTrait, P: PieceTrait>(&mut self, target: BitBoard) {
        let mut piece_bb = self.pos.piece_bb(PL::player(), P::piece_type());
        while let Some(src) = piece_bb.pop_some_lsb() {
            let mut moves_bb = self.moves_bb::<P>(src) & !self.us_occ & target;
            while let Some(dst) = moves_bb.pop_some_lsb() {
                self.check_and_add::<L>(BitMove::make_normal(src, dst));
            }
        }
    }

    /// Generates pawn moves: pushes, captures, promotions, and en-passant. The
    /// promotion fan-out depends on the generation mode, so that queen
    /// promotions classify as captures and under-promotions as quiets.
    fn generate_pawn_moves<L: Legality, G: GenTypeTrait, P: PlayerTrait>(
        &mut self,
        target: BitBoard,
    ) {
        let (rank_8, rank_7, rank_3): (BitBoard, BitBoard, BitBoard) =
            if P::player() == Player::White {
                (BitBoard::RANK_8, BitBoard::RANK_7, BitBoard::RANK_3)
            } else {
                (BitBoard::RANK_1, BitBoard::RANK_2, BitBoard::RANK_6)
            };

        let all_pawns = self.pos.piece_bb(P::player(), PieceType::P);
        let pawns_rank_7 = all_pawns & rank_7;
        let pawns_not_rank_7 = all_pawns & !rank_7;

        let enemies: BitBoard = if G::gen_type() == GenTypes::Evasions {
            self.them_occ & target
        } else if G::gen_type() == GenTypes::Captures {
            target
        } else {
            self.them_occ
        };

        // Single and double pawn pushes, the latter requiring an empty
        // intermediate rank.
        if G::gen_type() != GenTypes::Captures {
            let empty_squares = if G::gen_type() == GenTypes::Quiets {
                target
            } else {
                !self.occ
            };

            let mut push_one = empty_squares & P::shift_up(pawns_not_rank_7);
            let mut push_two = P::shift_up(push_one & rank_3) & empty_squares;

            if G::gen_type() == GenTypes::Evasions {
                push_one &= target;
                push_two &= target;
            }

            while let Some(dst) = push_one.pop_some_lsb() {
                self.check_and_add::<L>(BitMove::make_normal(P::down(dst), dst));
            }
            while let Some(dst) = push_two.pop_some_lsb() {
                self.check_and_add::<L>(BitMove::make_normal(P::down(P::down(dst)), dst));
            }
        }

        // Promotions, both pushing and capturing.
        if pawns_rank_7.is_not_empty()
            && (G::gen_type() != GenTypes::Evasions || (target & rank_8).is_not_empty())
        {
            let mut no_cap_promo = P::shift_up(pawns_rank_7) & !self.occ;
            if G::gen_type() == GenTypes::Evasions {
                no_cap_promo &= target;
            }
            let mut left_cap_promo = P::shift_up_left(pawns_rank_7) & enemies;
            let mut right_cap_promo = P::shift_up_right(pawns_rank_7) & enemies;

            while let Some(dst) = no_cap_promo.pop_some_lsb() {
                self.create_promotions::<L, G>(P::down(dst), dst);
            }
            while let Some(dst) = left_cap_promo.pop_some_lsb() {
                self.create_promotions::<L, G>(P::down_right(dst), dst);
            }
            while let Some(dst) = right_cap_promo.pop_some_lsb() {
                self.create_promotions::<L, G>(P::down_left(dst), dst);
            }
        }

        // Regular captures and en-passant.
        if G::gen_type() != GenTypes::Quiets {
            let mut left_cap = P::shift_up_left(pawns_not_rank_7) & enemies;
            let mut right_cap = P::shift_up_right(pawns_not_rank_7) & enemies;

            while let Some(dst) = left_cap.pop_some_lsb() {
                self.check_and_add::<L>(BitMove::make_normal(P::down_right(dst), dst));
            }
            while let Some(dst) = right_cap.pop_some_lsb() {
                self.check_and_add::<L>(BitMove::make_normal(P::down_left(dst), dst));
            }

            if self.pos.ep_square() != NO_SQ {
                let ep_sq = self.pos.ep_square();
                debug_assert_eq!(ep_sq.rank(), P::player().relative_rank(Rank::R6));

                // An en-passant capture can evade check only by capturing the
                // double-pushed pawn itself; a discovered check cannot be
                // resolved this way.
                if G::gen_type() != GenTypes::Evasions
                    || target.contains(P::down(ep_sq))
                {
                    let mut capturers =
                        pawns_not_rank_7 & pawn_attacks_from(ep_sq, P::opp_player());
                    while let Some(src) = capturers.pop_some_lsb() {
                        self.check_and_add::<L>(BitMove::make_en_passant(src, ep_sq));
                    }
                }
            }
        }
    }

    /// Expands a promoting from/to pair into the promotion pieces belonging to
    /// the generation mode: the queen promotion counts as a capture, the
    /// under-promotions as quiets.
    #[inline]
    fn create_promotions<L: Legality, G: GenTypeTrait>(&mut self, src: SQ, dst: SQ) {
        if G::gen_type() != GenTypes::Quiets {
            self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::Q));
        }
        if G::gen_type() != GenTypes::Captures {
            self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::R));
            self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::B));
            self.check_and_add::<L>(BitMove::make_promotion(src, dst, PieceType::N));
        }
    }

    /// Returns the attack bitboard for a non-pawn piece.
    #[inline]
    fn moves_bb<P: PieceTrait>(&self, square: SQ) -> BitBoard {
        debug_assert!(square.is_okay());
        match P::piece_type() {
            PieceType::N => knight_moves(square),
            PieceType::B => bishop_moves(self.occ, square),
            PieceType::R => rook_moves(self.occ, square),
            PieceType::Q => queen_moves(self.occ, square),
            PieceType::K => king_moves(square),
            _ => unreachable!(),
        }
    }

    /// Checks the move against the legality filter if needed, and writes it
    /// through the cursor.
    #[inline]
    fn check_and_add<L: Legality>(&mut self, mv: BitMove) {
        if !L::gen_legal() || self.pos.legal(mv) {
            unsafe {
                ptr::write(self.ptr, mv);
                self.ptr = self.ptr.add(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::fen::ALL_FENS;

    #[test]
    fn movegen_legal_subset_of_pseudo() {
        for fen in ALL_FENS.iter() {
            let pos = Position::from_fen(fen).unwrap();
            let legal = MoveGen::generate::<Legal, AllGenType>(&pos);
            let pseudo = MoveGen::generate::<PseudoLegal, AllGenType>(&pos);
            assert!(legal.len() <= pseudo.len(), "fen: {}", fen);
            for m in &legal {
                assert!(pseudo.contains(&m), "fen: {} move: {}", fen, m);
            }
        }
    }

    #[test]
    fn startpos_move_count() {
        let pos = Position::start_pos();
        assert_eq!(pos.generate_moves().len(), 20);
        assert_eq!(
            pos.generate_moves_of_type(GenTypes::Captures).len(),
            0
        );
        assert_eq!(pos.generate_moves_of_type(GenTypes::Quiets).len(), 20);
    }
}
