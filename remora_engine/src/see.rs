//! Static exchange evaluation: a non-search estimate of the material outcome
//! of a capture sequence on one square.

use remora::core::bitboard::BitBoard;
use remora::helper::prelude::*;
use remora::{BitMove, MoveType, PieceType, Player, Position};

/// Returns whether the side to move comes out of the exchange on the move's
/// destination square at least `threshold` centipawns ahead, assuming both
/// sides always recapture with their least valuable attacker.
///
/// The walk accounts for discovered attackers as sliders and pawns vacate
/// their rays, excludes pinned attackers while their pinner remains on the
/// board, and ends the exchange when a king would step into a defended
/// capture. Non-normal moves (promotions, castles, en-passant) are treated as
/// an exchange value of zero.
pub fn static_exchange_evaluation(pos: &Position, mv: BitMove, threshold: i32) -> bool {
    if mv.move_type() != MoveType::Normal {
        return 0 >= threshold;
    }

    let from = mv.get_src();
    let to = mv.get_dest();

    debug_assert!(!pos.piece_at(from).is_none());
    debug_assert_ne!(pos.piece_at(to).type_of(), PieceType::K);

    // Capturing the target and standing pat must already clear the threshold.
    let mut swap = piece_value(pos.piece_at(to).type_of()) - threshold;
    if swap < 0 {
        return false;
    }

    // If the opponent recaptures our attacker for free and we still clear the
    // threshold, no exchange can change the verdict.
    swap = piece_value(pos.piece_at(from).type_of()) - swap;
    if swap <= 0 {
        return true;
    }

    let mut side = pos.turn();
    let mut occupied = pos.occupied() ^ from.to_bb();
    let mut attackers = pos.attackers(Player::White, to, occupied)
        | pos.attackers(Player::Black, to, occupied);

    let diag_sliders = pos.type_bb(PieceType::B) | pos.type_bb(PieceType::Q);
    let line_sliders = pos.type_bb(PieceType::R) | pos.type_bb(PieceType::Q);

    // `res` flips with every capture performed; the in-loop threshold test is
    // asymmetric against it so that an equal trade favors the side that may
    // stand pat.
    let mut res = true;

    loop {
        side = !side;
        attackers &= occupied;

        let mut side_attackers = attackers & pos.occupied_player(side);

        // A pinned piece cannot recapture while its pinner is still standing.
        if (pos.pinners(side) & occupied).is_not_empty() {
            side_attackers &= !pos.king_blockers(side);
        }

        if side_attackers.is_empty() {
            break;
        }
        res = !res;

        // Recapture with the least valuable attacker, opening the ray behind
        // it for discovered attackers.
        let mut pc: BitBoard;

        pc = side_attackers & pos.type_bb(PieceType::P);
        if pc.is_not_empty() {
            swap = piece_value(PieceType::P) - swap;
            if swap < res as i32 {
                break;
            }
            occupied ^= pc.lsb();
            attackers |= bishop_moves(occupied, to) & diag_sliders;
            continue;
        }

        pc = side_attackers & pos.type_bb(PieceType::N);
        if pc.is_not_empty() {
            swap = piece_value(PieceType::N) - swap;
            if swap < res as i32 {
                break;
            }
            occupied ^= pc.lsb();
            continue;
        }

        pc = side_attackers & pos.type_bb(PieceType::B);
        if pc.is_not_empty() {
            swap = piece_value(PieceType::B) - swap;
            if swap < res as i32 {
                break;
            }
            occupied ^= pc.lsb();
            attackers |= bishop_moves(occupied, to) & diag_sliders;
            continue;
        }

        pc = side_attackers & pos.type_bb(PieceType::R);
        if pc.is_not_empty() {
            swap = piece_value(PieceType::R) - swap;
            if swap < res as i32 {
                break;
            }
            occupied ^= pc.lsb();
            attackers |= rook_moves(occupied, to) & line_sliders;
            continue;
        }

        pc = side_attackers & pos.type_bb(PieceType::Q);
        if pc.is_not_empty() {
            swap = piece_value(PieceType::Q) - swap;
            if swap < res as i32 {
                break;
            }
            occupied ^= pc.lsb();
            attackers |= (bishop_moves(occupied, to) & diag_sliders)
                | (rook_moves(occupied, to) & line_sliders);
            continue;
        }

        // Only the king is left; it may recapture only if the other side has
        // no attacker waiting behind it.
        return if (attackers & !pos.occupied_player(side)).is_not_empty() {
            !res
        } else {
            res
        };
    }

    res
}
