//! Zobrist key material for hashing positions.

use crate::core::masks::*;
use crate::core::sq::SQ;
use crate::core::Piece;
use crate::tools::prng::PRNG;

/// Seed for the Zobrist pseudo-random number generator. Fixed so every run of
/// the engine hashes identically.
const ZOBRIST_SEED: u64 = 8_523_011;

/// Zobrist key for each piece on each square, indexed directly by the 4-bit
/// piece tag.
static mut ZOBRIST_PIECE_SQUARE: [[u64; SQ_CNT]; PIECE_CNT] = [[0; SQ_CNT]; PIECE_CNT];

/// Zobrist key for each castling-rights bitmask.
static mut ZOBRIST_CASTLE: [u64; ALL_CASTLING_RIGHTS] = [0; ALL_CASTLING_RIGHTS];

/// Zobrist key for each possible en-passant file.
static mut ZOBRIST_ENPASSANT: [u64; FILE_CNT] = [0; FILE_CNT];

/// Zobrist key for the side to move being Black.
static mut ZOBRIST_SIDE: u64 = 0;

/// Initializes the Zobrist keys.
#[cold]
pub fn init_zobrist() {
    let mut rng = PRNG::init(ZOBRIST_SEED);

    unsafe {
        for color in 0..PLAYER_CNT {
            for piece in 0..PIECE_TYPE_CNT {
                let tag = (color << 3) | piece;
                for sq in 0..SQ_CNT {
                    ZOBRIST_PIECE_SQUARE[tag][sq] = rng.rand();
                }
            }
        }

        for cr in 0..ALL_CASTLING_RIGHTS {
            ZOBRIST_CASTLE[cr] = rng.rand();
        }

        for f in 0..FILE_CNT {
            ZOBRIST_ENPASSANT[f] = rng.rand();
        }

        ZOBRIST_SIDE = rng.rand();
    }
}

/// Returns the Zobrist key of the given piece sitting on the given square.
#[inline(always)]
pub fn z_square(sq: SQ, piece: Piece) -> u64 {
    debug_assert!(sq.is_okay());
    debug_assert!((piece as usize) < PIECE_CNT);
    unsafe {
        *ZOBRIST_PIECE_SQUARE
            .get_unchecked(piece as usize)
            .get_unchecked(sq.0 as usize)
    }
}

/// Returns the Zobrist key of a castling-rights bitmask.
#[inline(always)]
pub fn z_castle(castle: u8) -> u64 {
    debug_assert!((castle as usize) < ALL_CASTLING_RIGHTS);
    unsafe { *ZOBRIST_CASTLE.get_unchecked(castle as usize) }
}

/// Returns the Zobrist key of the file of an en-passant square.
#[inline(always)]
pub fn z_ep(sq: SQ) -> u64 {
    debug_assert!(sq.is_okay());
    unsafe { *ZOBRIST_ENPASSANT.get_unchecked(sq.file() as usize) }
}

/// Returns the Zobrist key for Black being the side to move. Doubles as the
/// fixed constant mixed into the pawn key so that it is never zero.
#[inline(always)]
pub fn z_side() -> u64 {
    unsafe { ZOBRIST_SIDE }
}
