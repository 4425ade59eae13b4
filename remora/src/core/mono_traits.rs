//! Traits for monomorphizing the move generator over player, piece, and
//! generation mode.
//!
//! The move generator is generic over these traits so that the per-side pawn
//! arithmetic and the per-mode target selection compile down to branch-free
//! code for each combination.

use super::bitboard::BitBoard;
use super::sq::SQ;
use super::{GenTypes, PieceType, Player};

/// Defines a player, allowing for specific functions in relation to a certain
/// player. The shift helpers are oriented "up" from the given player's
/// perspective, with file-edge wraps masked off.
pub trait PlayerTrait {
    /// Returns the `Player`.
    fn player() -> Player;

    /// Returns the opposing `Player`.
    fn opp_player() -> Player;

    /// Given a `SQ`, returns a square that is down relative to the current player.
    fn down(sq: SQ) -> SQ;

    /// Given a `SQ`, returns a square that is up relative to the current player.
    fn up(sq: SQ) -> SQ;

    /// Given a `SQ`, returns a square that is down-left relative to the current player.
    fn down_left(sq: SQ) -> SQ;

    /// Given a `SQ`, returns a square that is down-right relative to the current player.
    fn down_right(sq: SQ) -> SQ;

    /// Shifts the bitboard up relative to the current player.
    fn shift_up(bb: BitBoard) -> BitBoard;

    /// Shifts the bitboard up-left relative to the current player.
    fn shift_up_left(bb: BitBoard) -> BitBoard;

    /// Shifts the bitboard up-right relative to the current player.
    fn shift_up_right(bb: BitBoard) -> BitBoard;
}

/// Dummy type to represent a `Player::White` which implements `PlayerTrait`.
pub struct WhiteType {}

/// Dummy type to represent a `Player::Black` which implements `PlayerTrait`.
pub struct BlackType {}

impl PlayerTrait for WhiteType {
    #[inline(always)]
    fn player() -> Player {
        Player::White
    }

    #[inline(always)]
    fn opp_player() -> Player {
        Player::Black
    }

    #[inline(always)]
    fn down(sq: SQ) -> SQ {
        sq - SQ(8)
    }

    #[inline(always)]
    fn up(sq: SQ) -> SQ {
        sq + SQ(8)
    }

    #[inline(always)]
    fn down_left(sq: SQ) -> SQ {
        sq - SQ(9)
    }

    #[inline(always)]
    fn down_right(sq: SQ) -> SQ {
        sq - SQ(7)
    }

    #[inline(always)]
    fn shift_up(bb: BitBoard) -> BitBoard {
        bb << 8
    }

    #[inline(always)]
    fn shift_up_left(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_A) << 7
    }

    #[inline(always)]
    fn shift_up_right(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_H) << 9
    }
}

impl PlayerTrait for BlackType {
    #[inline(always)]
    fn player() -> Player {
        Player::Black
    }

    #[inline(always)]
    fn opp_player() -> Player {
        Player::White
    }

    #[inline(always)]
    fn down(sq: SQ) -> SQ {
        sq + SQ(8)
    }

    #[inline(always)]
    fn up(sq: SQ) -> SQ {
        sq - SQ(8)
    }

    #[inline(always)]
    fn down_left(sq: SQ) -> SQ {
        sq + SQ(9)
    }

    #[inline(always)]
    fn down_right(sq: SQ) -> SQ {
        sq + SQ(7)
    }

    #[inline(always)]
    fn shift_up(bb: BitBoard) -> BitBoard {
        bb >> 8
    }

    #[inline(always)]
    fn shift_up_left(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_A) >> 9
    }

    #[inline(always)]
    fn shift_up_right(bb: BitBoard) -> BitBoard {
        (bb & !BitBoard::FILE_H) >> 7
    }
}

/// Defines the type of moves to generate.
pub trait GenTypeTrait {
    /// Returns the `GenTypes`.
    fn gen_type() -> GenTypes;
}

/// Dummy type to represent `GenTypes::All`.
pub struct AllGenType {}
/// Dummy type to represent `GenTypes::Captures`.
pub struct CapturesGenType {}
/// Dummy type to represent `GenTypes::Quiets`.
pub struct QuietsGenType {}
/// Dummy type to represent `GenTypes::Evasions`.
pub struct EvasionsGenType {}

impl GenTypeTrait for AllGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::All
    }
}

impl GenTypeTrait for CapturesGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Captures
    }
}

impl GenTypeTrait for QuietsGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Quiets
    }
}

impl GenTypeTrait for EvasionsGenType {
    #[inline(always)]
    fn gen_type() -> GenTypes {
        GenTypes::Evasions
    }
}

/// Defines a piece type for move generation of non-pawn pieces.
pub trait PieceTrait {
    /// Returns the `PieceType`.
    fn piece_type() -> PieceType;
}

/// Dummy type to represent a `PieceType::N`.
pub struct KnightType {}
/// Dummy type to represent a `PieceType::B`.
pub struct BishopType {}
/// Dummy type to represent a `PieceType::R`.
pub struct RookType {}
/// Dummy type to represent a `PieceType::Q`.
pub struct QueenType {}
/// Dummy type to represent a `PieceType::K`.
pub struct KingType {}

impl PieceTrait for KnightType {
    #[inline(always)]
    fn piece_type() -> PieceType {
        PieceType::N
    }
}

impl PieceTrait for BishopType {
    #[inline(always)]
    fn piece_type() -> PieceType {
        PieceType::B
    }
}

impl PieceTrait for RookType {
    #[inline(always)]
    fn piece_type() -> PieceType {
        PieceType::R
    }
}

impl PieceTrait for QueenType {
    #[inline(always)]
    fn piece_type() -> PieceType {
        PieceType::Q
    }
}

impl PieceTrait for KingType {
    #[inline(always)]
    fn piece_type() -> PieceType {
        PieceType::K
    }
}
