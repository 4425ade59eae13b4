//! This module contains [`Position`], the object representing the current state
//! of a chessboard. All modifications to the current state of the board are done
//! through this object, as well as gathering information about it.
//!
//! The module also contains structures used by the position, such as
//! [`Castling`] for tracking castling rights and [`StoredState`] for the
//! reversible make/undo stack.
//!
//! [`Position`]: struct.Position.html
//! [`Castling`]: castle_rights/struct.Castling.html
//! [`StoredState`]: state/struct.StoredState.html

pub mod castle_rights;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod state;

use crate::core::bitboard::BitBoard;
use crate::core::masks::*;
use crate::core::move_list::MoveList;
use crate::core::mono_traits::{
    AllGenType, CapturesGenType, EvasionsGenType, QuietsGenType,
};
use crate::core::piece_move::{BitMove, MoveType};
use crate::core::sq::{NO_SQ, SQ};
use crate::core::{CastleType, GenTypes, Piece, PieceType, Player, Rank};
use crate::helper::prelude::*;

use self::castle_rights::Castling;
use self::movegen::{Legal, MoveGen};
use self::state::{PinInfo, StoredState};

use std::cell::Cell;
use std::fmt;

use thiserror::Error;

/// Possible errors encountered while building a `Position` from a FEN string.
#[derive(Error, Debug)]
pub enum FenBuildError {
    #[error("invalid number of fen sections: {sections}, expected at least 4")]
    NotEnoughSections { sections: usize },
    #[error("invalid board description")]
    BoardFormat,
    #[error("unrecognized piece character: {piece}")]
    UnrecognizedPiece { piece: char },
    #[error("invalid side to move: {turn}, expected 'w' or 'b'")]
    UnrecognizedTurn { turn: String },
    #[error("invalid castling rights: {castling}")]
    CastlingFormat { castling: String },
    #[error("castling letter '{letter}' does not match the board")]
    CastlingMismatch { letter: char },
    #[error("invalid en-passant square: {ep}")]
    EPSquareInvalid { ep: String },
    #[error("unreadable move counter")]
    UnreadableCounter(#[from] std::num::ParseIntError),
    #[error("{player} must have exactly one king, found {num}")]
    IncorrectKingNum { player: Player, num: u8 },
    #[error("the side not to move is in check")]
    OppositeCheck,
    #[error("pawn on the first or last rank")]
    PawnOnBackRank,
}

/// Possible errors encountered while parsing a UCI move string.
#[derive(Error, Debug)]
pub enum UciParseError {
    #[error("invalid uci move: {uci}")]
    BadMove { uci: String },
    #[error("invalid promotion piece: {piece}")]
    BadPromotion { piece: char },
}

/// Per-piece-type squares from which that piece would check the opposing king,
/// computed lazily after each move.
#[derive(Copy, Clone, Default)]
struct CheckSquares {
    sqs: [BitBoard; PIECE_TYPE_CNT],
    computed: bool,
}

/// Represents a chess position.
///
/// A `Position` contains the piece-centric and color-centric bitboards, a
/// square-indexed piece array, the side to move, castling rights, the
/// en-passant target, move counters, and incrementally maintained Zobrist keys
/// (full and pawn-only). Moves are applied with [`make_move`] and reverted with
/// [`undo_move`] through an internal state stack.
///
/// # BitBoard representation
///
/// Squares are indexed file-major from A1 = 0 to H8 = 63:
///
/// ```md,ignore
/// 8 | 56 57 58 59 60 61 62 63
/// 7 | 48 49 50 51 52 53 54 55
/// 6 | 40 41 42 43 44 45 46 47
/// 5 | 32 33 34 35 36 37 38 39
/// 4 | 24 25 26 27 28 29 30 31
/// 3 | 16 17 18 19 20 21 22 23
/// 2 | 8  9  10 11 12 13 14 15
/// 1 | 0  1  2  3  4  5  6  7
///   -------------------------
///      a  b  c  d  e  f  g  h
/// ```
///
/// [`make_move`]: struct.Position.html#method.make_move
/// [`undo_move`]: struct.Position.html#method.undo_move
#[derive(Clone)]
pub struct Position {
    // Piece-type bitboards cover both colors; intersect with a color board to
    // get one side's set.
    by_type: [BitBoard; PIECE_TYPE_CNT],
    by_color: [BitBoard; PLAYER_CNT],
    occ_all: BitBoard,
    board: [Piece; SQ_CNT],

    turn: Player,
    castling: Castling,
    ep_square: SQ,
    halfmoves: u16,
    fullmoves: u16,

    key: u64,
    pawn_key: u64,

    history: Vec<StoredState>,
    null_ep_history: Vec<SQ>,

    // Lazily computed caches. The pin cache is snapshot into the state stack;
    // the check-squares cache is invalidated by any mutation.
    pins: Cell<PinInfo>,
    check_sqs: Cell<CheckSquares>,
}

impl Position {
    /// Constructs the standard starting position.
    ///
    /// # Examples
    ///
    /// ```
    /// use remora::{Player, Position};
    ///
    /// let pos = Position::start_pos();
    /// assert_eq!(pos.turn(), Player::White);
    /// ```
    pub fn start_pos() -> Position {
        Position::from_fen(fen::START_POS_FEN).unwrap()
    }

    /// Constructs a position from a FEN string.
    ///
    /// The board, side, castling, and en-passant fields are required; the two
    /// move counters are optional. The castling letters are cross-checked
    /// against the king and rook placement, an en-passant square must carry the
    /// pawn that could be captured, each side must have exactly one king, the
    /// side not to move may not be in check, and no pawn may sit on the first
    /// or last rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use remora::Position;
    ///
    /// let pos = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// assert!(pos.is_ok());
    /// assert!(Position::from_fen("not a fen").is_err());
    /// ```
    pub fn from_fen(fen_str: &str) -> Result<Position, FenBuildError> {
        init_statics();

        let sections: Vec<&str> = fen_str.split_whitespace().collect();
        if sections.len() < 4 {
            return Err(FenBuildError::NotEnoughSections {
                sections: sections.len(),
            });
        }

        let mut pos = Position {
            by_type: [BitBoard(0); PIECE_TYPE_CNT],
            by_color: [BitBoard(0); PLAYER_CNT],
            occ_all: BitBoard(0),
            board: [Piece::None; SQ_CNT],
            turn: Player::White,
            castling: Castling::empty(),
            ep_square: NO_SQ,
            halfmoves: 0,
            fullmoves: 1,
            key: 0,
            pawn_key: 0,
            history: Vec::with_capacity(256),
            null_ep_history: Vec::with_capacity(32),
            pins: Cell::new(PinInfo::default()),
            check_sqs: Cell::new(CheckSquares::default()),
        };

        // 1. Piece placement, from rank 8 down to rank 1.
        let mut king_count = [0_u8; PLAYER_CNT];
        let mut rank: i8 = 7;
        let mut file: i8 = 0;
        for c in sections[0].chars() {
            if c == '/' {
                if file != 8 {
                    return Err(FenBuildError::BoardFormat);
                }
                rank -= 1;
                file = 0;
                continue;
            }
            if let Some(d) = c.to_digit(10) {
                file += d as i8;
                if file > 8 {
                    return Err(FenBuildError::BoardFormat);
                }
                continue;
            }
            if file >= 8 || rank < 0 {
                return Err(FenBuildError::BoardFormat);
            }

            let player = if c.is_uppercase() {
                Player::White
            } else {
                Player::Black
            };
            let pt = match c.to_ascii_lowercase() {
                'n' => PieceType::N,
                'b' => PieceType::B,
                'r' => PieceType::R,
                'q' => PieceType::Q,
                'p' => PieceType::P,
                'k' => {
                    king_count[player as usize] += 1;
                    PieceType::K
                }
                _ => return Err(FenBuildError::UnrecognizedPiece { piece: c }),
            };

            let sq = SQ((rank * 8 + file) as u8);
            pos.put_piece(Piece::make(player, pt), sq);
            file += 1;
        }
        if rank != 0 || file != 8 {
            return Err(FenBuildError::BoardFormat);
        }

        // 2. Side to move.
        pos.turn = match sections[1] {
            "w" => Player::White,
            "b" => Player::Black,
            _ => {
                return Err(FenBuildError::UnrecognizedTurn {
                    turn: sections[1].to_string(),
                })
            }
        };

        // 3. Castling rights, cross-checked against the piece placement.
        if sections[2] != "-" {
            if sections[2].len() > 4 {
                return Err(FenBuildError::CastlingFormat {
                    castling: sections[2].to_string(),
                });
            }
            for c in sections[2].chars() {
                if !pos.castling.add_castling_char(c) {
                    return Err(FenBuildError::CastlingFormat {
                        castling: sections[2].to_string(),
                    });
                }
                let (player, rook_sq) = match c {
                    'K' => (Player::White, SQ(ROOK_WHITE_KSIDE_START)),
                    'Q' => (Player::White, SQ(ROOK_WHITE_QSIDE_START)),
                    'k' => (Player::Black, SQ(ROOK_BLACK_KSIDE_START)),
                    _ => (Player::Black, SQ(ROOK_BLACK_QSIDE_START)),
                };
                if pos.piece_at(player.king_start()) != Piece::make(player, PieceType::K)
                    || pos.piece_at(rook_sq) != Piece::make(player, PieceType::R)
                {
                    return Err(FenBuildError::CastlingMismatch { letter: c });
                }
            }
        }

        // 4. En-passant target, which must sit on the correct rank and have the
        // capturable pawn behind it.
        if sections[3] != "-" {
            let ep = sections[3].as_bytes();
            let expected_rank = if pos.turn == Player::White { b'6' } else { b'3' };
            if ep.len() != 2 || ep[0] < b'a' || ep[0] > b'h' || ep[1] != expected_rank {
                return Err(FenBuildError::EPSquareInvalid {
                    ep: sections[3].to_string(),
                });
            }
            let ep_sq = SQ((ep[1] - b'1') * 8 + (ep[0] - b'a'));
            let pawn_sq = SQ(((ep_sq.0 as i8) - pos.turn.pawn_push()) as u8);
            if pos.piece_at(pawn_sq) != Piece::make(!pos.turn, PieceType::P) {
                return Err(FenBuildError::EPSquareInvalid {
                    ep: sections[3].to_string(),
                });
            }
            pos.ep_square = ep_sq;
        }

        // 5/6. Optional halfmove clock and fullmove number.
        if let Some(s) = sections.get(4) {
            pos.halfmoves = s.parse::<u16>()?;
        }
        if let Some(s) = sections.get(5) {
            pos.fullmoves = s.parse::<u16>()?;
        }

        // Position legality.
        for &player in &[Player::White, Player::Black] {
            if king_count[player as usize] != 1 {
                return Err(FenBuildError::IncorrectKingNum {
                    player,
                    num: king_count[player as usize],
                });
            }
        }
        if pos.in_check(!pos.turn) {
            return Err(FenBuildError::OppositeCheck);
        }
        if ((BitBoard::RANK_1 | BitBoard::RANK_8) & pos.type_bb(PieceType::P)).is_not_empty() {
            return Err(FenBuildError::PawnOnBackRank);
        }

        pos.set_zob_keys();
        Ok(pos)
    }

    /// Creates a FEN string of the position, in canonical form.
    ///
    /// # Examples
    ///
    /// ```
    /// use remora::Position;
    ///
    /// let pos = Position::start_pos();
    /// assert_eq!(pos.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn fen(&self) -> String {
        let mut s = String::with_capacity(80);

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                let piece = self.piece_at(SQ(rank * 8 + file));
                match piece.character() {
                    Some(c) => {
                        if empty != 0 {
                            s.push(std::char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        s.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty != 0 {
                s.push(std::char::from_digit(empty, 10).unwrap());
            }
            if rank > 0 {
                s.push('/');
            }
        }

        s.push(' ');
        s.push(if self.turn == Player::White { 'w' } else { 'b' });
        s.push(' ');
        s.push_str(&self.castling.pretty_string());
        s.push(' ');
        if self.ep_square == NO_SQ {
            s.push('-');
        } else {
            s.push_str(&self.ep_square.to_string());
        }
        s.push_str(&format!(" {} {}", self.halfmoves, self.fullmoves));
        s
    }

    /// Returns a copy of this position with an empty move history. The copy can
    /// no longer undo moves played before the split.
    pub fn clone_without_history(&self) -> Position {
        let mut other = self.clone();
        other.history.clear();
        other.null_ep_history.clear();
        other
    }

    //  ------- ACCESSORS -------

    /// Get the player whose turn it is to move.
    #[inline(always)]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Return the Zobrist key of the position.
    #[inline(always)]
    pub fn zobrist(&self) -> u64 {
        self.key
    }

    /// Return the pawn-only Zobrist key of the position. Never zero.
    #[inline(always)]
    pub fn pawn_key(&self) -> u64 {
        self.pawn_key
    }

    /// Get the number of halfmoves since the last capture or pawn move.
    #[inline(always)]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmoves
    }

    /// Get the fullmove number, starting at 1 and incremented after Black moves.
    #[inline(always)]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmoves
    }

    /// Get the current en-passant target square, or `NO_SQ` if there is none.
    #[inline(always)]
    pub fn ep_square(&self) -> SQ {
        self.ep_square
    }

    /// Gets the `BitBoard` of all pieces.
    #[inline(always)]
    pub fn occupied(&self) -> BitBoard {
        self.occ_all
    }

    /// Gets the `BitBoard` of all pieces of the given player.
    #[inline(always)]
    pub fn occupied_player(&self, player: Player) -> BitBoard {
        self.by_color[player as usize]
    }

    /// Gets the `BitBoard` of all pieces of a given type, for both players.
    #[inline(always)]
    pub fn type_bb(&self, pt: PieceType) -> BitBoard {
        self.by_type[pt as usize]
    }

    /// Gets the `BitBoard` of a single player's pieces of one type.
    #[inline(always)]
    pub fn piece_bb(&self, player: Player, pt: PieceType) -> BitBoard {
        self.by_type[pt as usize] & self.by_color[player as usize]
    }

    /// Returns the rooks and queens of a given player.
    #[inline(always)]
    pub fn sliding_piece_bb(&self, player: Player) -> BitBoard {
        (self.type_bb(PieceType::R) | self.type_bb(PieceType::Q)) & self.by_color[player as usize]
    }

    /// Returns the bishops and queens of a given player.
    #[inline(always)]
    pub fn diagonal_piece_bb(&self, player: Player) -> BitBoard {
        (self.type_bb(PieceType::B) | self.type_bb(PieceType::Q)) & self.by_color[player as usize]
    }

    /// Returns the piece at the given square, `Piece::None` if the square is
    /// empty.
    #[inline(always)]
    pub fn piece_at(&self, sq: SQ) -> Piece {
        debug_assert!(sq.is_okay());
        self.board[sq.0 as usize]
    }

    /// Returns the square of the king of the given player.
    #[inline(always)]
    pub fn king_sq(&self, player: Player) -> SQ {
        self.piece_bb(player, PieceType::K).to_sq()
    }

    /// Returns the castling rights of the position.
    #[inline(always)]
    pub fn castling(&self) -> Castling {
        self.castling
    }

    /// Returns if the player still has the right to castle on the given side.
    #[inline(always)]
    pub fn can_castle(&self, player: Player, side: CastleType) -> bool {
        self.castling.castle_rights(player, side)
    }

    /// Returns the last move played, if any.
    #[inline]
    pub fn last_move(&self) -> Option<BitMove> {
        self.history.last().map(|s| s.mov)
    }

    /// Returns the number of moves stored in the history stack.
    #[inline(always)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Returns the piece being moved by the given move.
    ///
    /// # Safety
    ///
    /// Assumes the move's origin square holds a piece.
    #[inline]
    pub fn moved_piece(&self, m: BitMove) -> Piece {
        self.piece_at(m.get_src())
    }

    /// Returns the type of the piece the given move captures, `PieceType::None`
    /// for non-captures. Handles the en-passant capture square.
    #[inline]
    pub fn captured_piece(&self, m: BitMove) -> PieceType {
        let to = m.get_dest();
        if m.move_type() == MoveType::EnPassant {
            return PieceType::P;
        }
        self.piece_at(to).type_of()
    }

    //  ------- ATTACKS AND CHECKS -------

    /// Returns the `BitBoard` of `side`'s pieces attacking `sq`, given an
    /// arbitrary occupancy. The occupancy parameter allows callers to mask out
    /// pieces that have already been exchanged away.
    pub fn attackers(&self, side: Player, sq: SQ, occupied: BitBoard) -> BitBoard {
        (pawn_attacks_from(sq, !side) & self.piece_bb(side, PieceType::P))
            | (knight_moves(sq) & self.piece_bb(side, PieceType::N))
            | (king_moves(sq) & self.piece_bb(side, PieceType::K))
            | (bishop_moves(occupied, sq) & self.diagonal_piece_bb(side))
            | (rook_moves(occupied, sq) & self.sliding_piece_bb(side))
    }

    /// Returns if any piece of `side` attacks `sq`, short-circuiting on the
    /// first attacker found.
    pub fn attackers_exist(&self, side: Player, sq: SQ, occupied: BitBoard) -> bool {
        if (pawn_attacks_from(sq, !side) & self.piece_bb(side, PieceType::P)).is_not_empty() {
            return true;
        }
        if (knight_moves(sq) & self.piece_bb(side, PieceType::N)).is_not_empty() {
            return true;
        }
        if (king_moves(sq) & self.piece_bb(side, PieceType::K)).is_not_empty() {
            return true;
        }
        if (bishop_moves(occupied, sq) & self.diagonal_piece_bb(side)).is_not_empty() {
            return true;
        }
        (rook_moves(occupied, sq) & self.sliding_piece_bb(side)).is_not_empty()
    }

    /// Returns if the given side's king is attacked.
    #[inline]
    pub fn in_check(&self, side: Player) -> bool {
        self.attackers_exist(!side, self.king_sq(side), self.occupied())
    }

    /// Returns the `BitBoard` of pieces checking the side to move's king.
    #[inline]
    pub fn checkers(&self) -> BitBoard {
        self.attackers(!self.turn, self.king_sq(self.turn), self.occupied())
    }

    /// Returns the pieces (of either color) that stand between `side`'s king
    /// and an opposing slider, computed lazily.
    #[inline]
    pub fn king_blockers(&self, side: Player) -> BitBoard {
        if !self.pins.get().computed[side as usize] {
            self.compute_pins(side);
        }
        self.pins.get().blockers[side as usize]
    }

    /// Returns the opposing sliders pinning a piece of `side` to its king,
    /// computed lazily.
    #[inline]
    pub fn pinners(&self, side: Player) -> BitBoard {
        if !self.pins.get().computed[side as usize] {
            self.compute_pins(side);
        }
        self.pins.get().pinners[side as usize]
    }

    /// For each opposing slider aligned with the king, a lone piece in between
    /// is a blocker; if that piece belongs to `side`, the slider is a pinner.
    fn compute_pins(&self, side: Player) {
        let opp = !side;
        let ksq = self.king_sq(side);

        let possible_pinners = (rook_rays(ksq) & self.sliding_piece_bb(opp))
            | (bishop_rays(ksq) & self.diagonal_piece_bb(opp));
        let occupancy = self.occupied() ^ possible_pinners;

        let mut blockers = BitBoard(0);
        let mut pinners = BitBoard(0);
        let mut candidates = possible_pinners;
        while let Some(pinner_sq) = candidates.pop_some_lsb() {
            let between = between_bb(ksq, pinner_sq) & occupancy;
            if between.is_not_empty() && !between.more_than_one() {
                blockers |= between;
                if (between & self.occupied_player(side)).is_not_empty() {
                    pinners |= pinner_sq.to_bb();
                }
            }
        }

        let mut info = self.pins.get();
        info.blockers[side as usize] = blockers;
        info.pinners[side as usize] = pinners;
        info.computed[side as usize] = true;
        self.pins.set(info);
    }

    /// Squares from which a piece of the given type would check the opposing
    /// king, computed lazily against the current occupancy.
    fn check_squares(&self, pt: PieceType) -> BitBoard {
        let mut cs = self.check_sqs.get();
        if !cs.computed {
            let opp = !self.turn;
            let ksq = self.king_sq(opp);
            let occ = self.occupied();
            cs.sqs[PieceType::P as usize] = pawn_attacks_from(ksq, opp);
            cs.sqs[PieceType::N as usize] = knight_moves(ksq);
            cs.sqs[PieceType::B as usize] = bishop_moves(occ, ksq);
            cs.sqs[PieceType::R as usize] = rook_moves(occ, ksq);
            cs.sqs[PieceType::Q as usize] =
                cs.sqs[PieceType::B as usize] | cs.sqs[PieceType::R as usize];
            cs.sqs[PieceType::K as usize] = BitBoard(0);
            cs.computed = true;
            self.check_sqs.set(cs);
        }
        cs.sqs[pt as usize]
    }

    /// Decides, without making the move, whether `m` delivers check.
    ///
    /// # Safety
    ///
    /// Assumes the move is legal for the current position.
    pub fn gives_check(&self, m: BitMove) -> bool {
        let us = self.turn;
        let opp = !us;
        let from = m.get_src();
        let to = m.get_dest();
        let moved = self.piece_at(from);

        debug_assert_ne!(from, to);
        debug_assert_eq!(moved.player(), Some(us));

        // Direct checks come straight from the pre-computed table.
        if self.check_squares(moved.type_of()).contains(to) {
            return true;
        }

        let king_bb = self.piece_bb(opp, PieceType::K);

        // Discovered checks: the moving piece shields the opposing king, and
        // does not stay on the king-blocker line.
        if self.king_blockers(opp).contains(from) {
            return (line_bb(from, to) & king_bb).is_empty();
        }

        let ksq = king_bb.to_sq();
        match m.move_type() {
            MoveType::Normal => false,
            MoveType::Promotion => {
                let occ = self.occupied() ^ from.to_bb();
                (attacks_from(m.promo_piece(), to, occ) & king_bb).is_not_empty()
            }
            MoveType::EnPassant => {
                // Both pawns leave their files at once; simulate the occupancy
                // after the capture and look for a slider on the opened rays.
                let cap_sq = SQ(((to.0 as i8) - us.pawn_push()) as u8);
                let occ = (self.occupied() ^ from.to_bb() ^ cap_sq.to_bb()) | to.to_bb();
                (rook_moves(occ, ksq) & self.sliding_piece_bb(us)).is_not_empty()
                    || (bishop_moves(occ, ksq) & self.diagonal_piece_bb(us)).is_not_empty()
            }
            MoveType::Castle => {
                let rook_to = SQ((to.0 + from.0) >> 1);
                self.check_squares(PieceType::R).contains(rook_to)
            }
        }
    }

    //  ------- MAKING AND UNDOING MOVES -------

    /// Applies a move to the position.
    ///
    /// Updates the bitboards, the square array, both Zobrist keys, castling
    /// rights, the en-passant target, the halfmove clock (reset on capture or
    /// pawn move), the fullmove counter (incremented after Black moves), and
    /// the side to move, pushing a [`StoredState`] for [`undo_move`].
    ///
    /// # Safety
    ///
    /// The move must be legal for the current position; there are no safety
    /// checks here for performance reasons. Illegal moves corrupt the state.
    ///
    /// [`StoredState`]: state/struct.StoredState.html
    /// [`undo_move`]: struct.Position.html#method.undo_move
    pub fn make_move(&mut self, m: BitMove) {
        let us = self.turn;
        let them = !us;
        let from = m.get_src();
        let to = m.get_dest();
        let move_type = m.move_type();
        let moved = self.piece_at(from);

        debug_assert!(from.is_okay() && to.is_okay() && from != to);
        debug_assert_eq!(moved.player(), Some(us));

        // Determine the capture, handling the en-passant square.
        let cap_sq = if move_type == MoveType::EnPassant {
            SQ(((to.0 as i8) - us.pawn_push()) as u8)
        } else {
            to
        };
        let captured = self.piece_at(cap_sq);

        debug_assert!(move_type != MoveType::EnPassant || to == self.ep_square);
        debug_assert!(
            move_type != MoveType::EnPassant
                || captured == Piece::make(them, PieceType::P)
        );
        debug_assert_ne!(captured.type_of(), PieceType::K);

        self.history.push(StoredState {
            mov: m,
            captured,
            castling: self.castling,
            ep_square: self.ep_square,
            halfmoves: self.halfmoves,
            key: self.key,
            pawn_key: self.pawn_key,
            pins: self.pins.get(),
        });

        self.halfmoves += 1;
        self.fullmoves += us as u16;

        // Clear the en-passant square.
        if self.ep_square != NO_SQ {
            self.key ^= z_ep(self.ep_square);
            self.ep_square = NO_SQ;
        }

        // Lift the moved piece off its origin square.
        self.remove_piece(moved, from);
        self.key ^= z_square(from, moved);

        // Remove a captured piece.
        if captured != Piece::None {
            if captured.type_of() == PieceType::P {
                self.pawn_key ^= z_square(cap_sq, captured);
            }
            self.remove_piece(captured, cap_sq);
            self.key ^= z_square(cap_sq, captured);
            self.halfmoves = 0;
        }

        // Place the moved (or promoted) piece on the target square. A pawn
        // advancing two ranks sets the en-passant target.
        if move_type == MoveType::Promotion {
            let promo = Piece::make(us, m.promo_piece());
            self.put_piece(promo, to);
            self.key ^= z_square(to, promo);
            self.pawn_key ^= z_square(from, moved);
        } else {
            self.put_piece(moved, to);
            self.key ^= z_square(to, moved);

            if moved.type_of() == PieceType::P {
                if (to.0 as i16 - from.0 as i16).abs() == 16 {
                    self.ep_square = SQ(((from.0 as i8) + us.pawn_push()) as u8);
                    self.key ^= z_ep(self.ep_square);
                }
                self.pawn_key ^= z_square(from, moved) ^ z_square(to, moved);
                self.halfmoves = 0;
            }
        }

        // Move the rook for a castle: to the square the king crossed.
        if move_type == MoveType::Castle {
            let rook_from = if to > from { from + SQ(3) } else { from - SQ(4) };
            let rook_to = SQ((to.0 + from.0) >> 1);
            let rook = Piece::make(us, PieceType::R);

            debug_assert_eq!(from, us.king_start());
            debug_assert_eq!(self.piece_at(rook_from), rook);
            debug_assert!(self.piece_at(rook_to).is_none());

            self.remove_piece(rook, rook_from);
            self.put_piece(rook, rook_to);
            self.key ^= z_square(rook_from, rook) ^ z_square(rook_to, rook);
        }

        // A rook moving, a rook being captured, and a king moving all revoke
        // the appropriate rights in one step.
        let flag_change = castle_flag(from) | castle_flag(to);
        if self.castling.bits() & flag_change != 0 {
            self.key ^= z_castle(self.castling.bits());
            self.castling = Castling::from_bits_truncate(self.castling.bits() & !flag_change);
            self.key ^= z_castle(self.castling.bits());
        }

        self.turn = them;
        self.key ^= z_side();
        self.pins.set(PinInfo::default());
        self.check_sqs.set(CheckSquares::default());
    }

    /// Un-does the last move, restoring every field (including both Zobrist
    /// keys and the pin cache) from the stored state.
    ///
    /// Returns `false` if the history is empty.
    pub fn undo_move(&mut self) -> bool {
        let state = match self.history.pop() {
            Some(s) => s,
            None => return false,
        };

        self.turn = !self.turn;
        let us = self.turn;
        let m = state.mov;
        let from = m.get_src();
        let to = m.get_dest();
        let move_type = m.move_type();

        let moved = if move_type == MoveType::Promotion {
            Piece::make(us, PieceType::P)
        } else {
            self.piece_at(to)
        };

        // Lift the moved (or promoted) piece off the target square.
        let on_to = self.piece_at(to);
        debug_assert!(!on_to.is_none());
        self.remove_piece(on_to, to);

        // Put back a captured piece, handling the en-passant square.
        if state.captured != Piece::None {
            let cap_sq = if move_type == MoveType::EnPassant {
                SQ(((to.0 as i8) - us.pawn_push()) as u8)
            } else {
                to
            };
            self.put_piece(state.captured, cap_sq);
        }

        // Return the moved piece to its origin square.
        self.put_piece(moved, from);

        // Return the rook for a castle.
        if move_type == MoveType::Castle {
            let rook_from = if to > from { from + SQ(3) } else { from - SQ(4) };
            let rook_to = SQ((to.0 + from.0) >> 1);
            let rook = Piece::make(us, PieceType::R);
            self.remove_piece(rook, rook_to);
            self.put_piece(rook, rook_from);
        }

        self.castling = state.castling;
        self.ep_square = state.ep_square;
        self.fullmoves -= us as u16;
        self.halfmoves = state.halfmoves;
        self.key = state.key;
        self.pawn_key = state.pawn_key;
        self.pins.set(state.pins);
        self.check_sqs.set(CheckSquares::default());
        true
    }

    /// Applies a null move: passes the turn without moving a piece, clearing
    /// the en-passant square.
    ///
    /// # Safety
    ///
    /// Must not be called while the side to move is in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check(self.turn));

        self.halfmoves += 1;
        self.fullmoves += self.turn as u16;

        self.null_ep_history.push(self.ep_square);
        if self.ep_square != NO_SQ {
            self.key ^= z_ep(self.ep_square);
            self.ep_square = NO_SQ;
        }

        self.turn = !self.turn;
        self.key ^= z_side();
        self.check_sqs.set(CheckSquares::default());
    }

    /// Un-does a null move, restoring the en-passant square from its own stack.
    ///
    /// # Panics
    ///
    /// Must only be called to revert a previous [`make_null_move`].
    ///
    /// [`make_null_move`]: struct.Position.html#method.make_null_move
    pub fn undo_null_move(&mut self) {
        self.turn = !self.turn;
        self.key ^= z_side();

        let ep = self.null_ep_history.pop().expect("no null move to undo");
        self.ep_square = ep;
        if ep != NO_SQ {
            self.key ^= z_ep(ep);
        }

        self.fullmoves -= self.turn as u16;
        self.halfmoves -= 1;
        self.check_sqs.set(CheckSquares::default());
    }

    //  ------- MOVE TESTING -------

    /// Tests if a pseudo-legal move is legal: after playing it, the king of the
    /// side that moved is not attacked.
    ///
    /// Moves by non-king, non-pinned pieces that are not en-passant are always
    /// legal. King moves verify the destination in the post-move occupancy,
    /// pinned pieces must stay on the pin line, and en-passant verifies that
    /// removing both pawns exposes no slider ray.
    pub fn legal(&self, m: BitMove) -> bool {
        let us = self.turn;
        let them = !us;
        let from = m.get_src();
        let to = m.get_dest();

        if m.move_type() == MoveType::EnPassant {
            let ksq = self.king_sq(us);
            let cap_sq = SQ(((to.0 as i8) - us.pawn_push()) as u8);
            let occ = (self.occupied() ^ from.to_bb() ^ cap_sq.to_bb()) | to.to_bb();
            return (rook_moves(occ, ksq) & self.sliding_piece_bb(them)).is_empty()
                && (bishop_moves(occ, ksq) & self.diagonal_piece_bb(them)).is_empty();
        }

        let piece = self.piece_at(from);
        debug_assert!(!piece.is_none());

        if piece.type_of() == PieceType::K {
            // Castling already verified its path; only the destination remains.
            let occ = if m.move_type() == MoveType::Castle {
                self.occupied()
            } else {
                (self.occupied() ^ from.to_bb()) | to.to_bb()
            };
            return !self.attackers_exist(them, to, occ);
        }

        (self.king_blockers(us) & self.occupied_player(us) & from.to_bb()).is_empty()
            || aligned(from, to, self.king_sq(us))
    }

    /// Tests whether playing an arbitrary 16-bit encoded move in the current
    /// position is legal.
    ///
    /// This is the oracle used to validate moves drawn from the transposition
    /// table, whose key may have collided: illegal, incoherent, or stale
    /// encodings are all rejected.
    pub fn pseudo_legal(&self, m: BitMove) -> bool {
        if m.is_null() {
            return false;
        }
        let us = self.turn;
        let them = !us;
        let from = m.get_src();
        let to = m.get_dest();
        if from == to {
            return false;
        }

        let piece = self.piece_at(from);
        if piece.is_none() || piece.player_lossy() != us {
            return false;
        }
        let pt = piece.type_of();

        let on_to = self.piece_at(to);
        if !on_to.is_none() && (on_to.player_lossy() == us || on_to.type_of() == PieceType::K) {
            return false;
        }

        match m.move_type() {
            MoveType::Castle => {
                if pt != PieceType::K || from != us.king_start() || self.in_check(us) {
                    return false;
                }
                let (side, side_idx) = if to == from + SQ(2) {
                    (CastleType::KingSide, 0)
                } else if to == from - SQ(2) {
                    (CastleType::QueenSide, 1)
                } else {
                    return false;
                };
                if !self.castling.castle_rights(us, side)
                    || (castle_clear_bb(us, side_idx) & self.occupied()).is_not_empty()
                {
                    return false;
                }
                let crossed = if side == CastleType::KingSide {
                    from + SQ(1)
                } else {
                    from - SQ(1)
                };
                if self.attackers_exist(them, crossed, self.occupied()) {
                    return false;
                }
            }
            MoveType::Promotion => {
                if pt != PieceType::P
                    || us.relative_rank_of_sq(from) != Rank::R7
                    || us.relative_rank_of_sq(to) != Rank::R8
                    || !self.pawn_move_coherent(us, from, to, on_to)
                {
                    return false;
                }
            }
            MoveType::EnPassant => {
                if pt != PieceType::P
                    || self.ep_square == NO_SQ
                    || to != self.ep_square
                    || !on_to.is_none()
                    || !pawn_attacks_from(from, us).contains(to)
                {
                    return false;
                }
            }
            MoveType::Normal => {
                if pt == PieceType::P {
                    // Reaching the last rank must be encoded as a promotion.
                    if us.relative_rank_of_sq(to) == Rank::R8
                        || !self.pawn_move_coherent(us, from, to, on_to)
                    {
                        return false;
                    }
                } else if !attacks_from(pt, from, self.occupied()).contains(to) {
                    return false;
                }
            }
        }

        // When in check, a non-king move must capture the checker or block a
        // lone checking ray.
        if pt != PieceType::K {
            let checkers = self.checkers();
            if checkers.is_not_empty() {
                if checkers.more_than_one() {
                    return false;
                }
                let checker_sq = checkers.to_sq();
                let target = between_bb(checker_sq, self.king_sq(us)) | checkers;
                let resolves = target.contains(to)
                    || (m.move_type() == MoveType::EnPassant
                        && checker_sq == SQ(((to.0 as i8) - us.pawn_push()) as u8));
                if !resolves {
                    return false;
                }
            }
        }

        self.legal(m)
    }

    // Shared pawn geometry for the pseudo-legality oracle: single push onto an
    // empty square, double push over an empty intermediate from the start rank,
    // or a diagonal capture of an enemy piece.
    fn pawn_move_coherent(&self, us: Player, from: SQ, to: SQ, on_to: Piece) -> bool {
        let push = us.pawn_push();
        let one_up = (from.0 as i8).wrapping_add(push) as u8;
        if to.0 == one_up {
            return on_to.is_none();
        }
        let two_up = (from.0 as i8).wrapping_add(2 * push) as u8;
        if to.0 == two_up {
            return us.relative_rank_of_sq(from) == Rank::R2
                && on_to.is_none()
                && self.piece_at(SQ(one_up)).is_none();
        }
        pawn_attacks_from(from, us).contains(to)
            && !on_to.is_none()
            && on_to.player_lossy() != us
    }

    //  ------- MOVE GENERATION -------

    /// Gets a list of all legal moves for the player whose turn it is to move.
    ///
    /// Takes into account whether the position is in check, returning evasions
    /// in that case.
    pub fn generate_moves(&self) -> MoveList {
        MoveGen::generate::<Legal, AllGenType>(self)
    }

    /// Gets a list of legal moves of a certain type.
    ///
    /// # Panics
    ///
    /// `GenTypes::Captures` and `GenTypes::Quiets` may only be requested when
    /// not in check, and `GenTypes::Evasions` only when in check. Debug builds
    /// assert this.
    pub fn generate_moves_of_type(&self, gen_type: GenTypes) -> MoveList {
        match gen_type {
            GenTypes::All => MoveGen::generate::<Legal, AllGenType>(self),
            GenTypes::Captures => MoveGen::generate::<Legal, CapturesGenType>(self),
            GenTypes::Quiets => MoveGen::generate::<Legal, QuietsGenType>(self),
            GenTypes::Evasions => MoveGen::generate::<Legal, EvasionsGenType>(self),
        }
    }

    /// Converts a UCI move string to a `BitMove` for this position.
    ///
    /// The returned move is classified (castle, en-passant, promotion) against
    /// the current board, but is not guaranteed to be legal.
    pub fn move_from_uci(&self, uci: &str) -> Result<BitMove, UciParseError> {
        let bytes = uci.as_bytes();
        if bytes.len() < 4 || bytes.len() > 5 {
            return Err(UciParseError::BadMove {
                uci: uci.to_string(),
            });
        }
        let valid_file = |c: u8| (b'a'..=b'h').contains(&c);
        let valid_rank = |c: u8| (b'1'..=b'8').contains(&c);
        if !valid_file(bytes[0])
            || !valid_rank(bytes[1])
            || !valid_file(bytes[2])
            || !valid_rank(bytes[3])
        {
            return Err(UciParseError::BadMove {
                uci: uci.to_string(),
            });
        }

        let from = SQ((bytes[1] - b'1') * 8 + (bytes[0] - b'a'));
        let to = SQ((bytes[3] - b'1') * 8 + (bytes[2] - b'a'));

        if bytes.len() == 5 {
            let promo = match bytes[4] {
                b'q' => PieceType::Q,
                b'r' => PieceType::R,
                b'b' => PieceType::B,
                b'n' => PieceType::N,
                c => {
                    return Err(UciParseError::BadPromotion { piece: c as char });
                }
            };
            return Ok(BitMove::make_promotion(from, to, promo));
        }

        let piece = self.piece_at(from);
        if piece.type_of() == PieceType::K
            && from.rank() == to.rank()
            && from.file().distance(to.file()) == 2
        {
            return Ok(BitMove::make_castle(from, to));
        }
        if piece.type_of() == PieceType::P && to == self.ep_square {
            return Ok(BitMove::make_en_passant(from, to));
        }
        Ok(BitMove::make_normal(from, to))
    }

    //  ------- PRIVATE HELPERS -------

    /// Places a piece on the board.
    ///
    /// # Safety
    ///
    /// Assumes the square is empty.
    #[inline]
    fn put_piece(&mut self, piece: Piece, sq: SQ) {
        debug_assert!(self.piece_at(sq).is_none());
        let bb = sq.to_bb();
        self.by_type[piece.type_of() as usize] |= bb;
        self.by_color[piece.player_lossy() as usize] |= bb;
        self.occ_all |= bb;
        self.board[sq.0 as usize] = piece;
    }

    /// Removes a piece from the board.
    ///
    /// # Safety
    ///
    /// Assumes the given piece is at the given square.
    #[inline]
    fn remove_piece(&mut self, piece: Piece, sq: SQ) {
        debug_assert_eq!(self.piece_at(sq), piece);
        let bb = sq.to_bb();
        self.by_type[piece.type_of() as usize] ^= bb;
        self.by_color[piece.player_lossy() as usize] ^= bb;
        self.occ_all ^= bb;
        self.board[sq.0 as usize] = Piece::None;
    }

    /// Rebuilds both Zobrist keys from scratch. Used only at construction; the
    /// keys are maintained incrementally afterwards.
    fn set_zob_keys(&mut self) {
        let mut key: u64 = 0;
        // The side key doubles as a constant guaranteeing the pawn key is
        // never zero, which the pawn cache uses as its empty sentinel.
        let mut pawn_key: u64 = z_side();

        let mut occ = self.occupied();
        while let Some(sq) = occ.pop_some_lsb() {
            let piece = self.piece_at(sq);
            let z = z_square(sq, piece);
            key ^= z;
            if piece.type_of() == PieceType::P {
                pawn_key ^= z;
            }
        }

        key ^= z_castle(self.castling.bits());
        if self.ep_square != NO_SQ {
            key ^= z_ep(self.ep_square);
        }
        if self.turn == Player::Black {
            key ^= z_side();
        }

        self.key = key;
        self.pawn_key = pawn_key;
    }

    /// Returns a prettified String of the current position for command-line
    /// display. Capital letters represent white pieces.
    pub fn pretty_string(&self) -> String {
        let mut s = String::with_capacity(SQ_CNT * 2 + 8);
        for sq in SQ_DISPLAY_ORDER.iter() {
            s.push(self.piece_at(SQ(*sq)).character().unwrap_or('-'));
            s.push(' ');
            if sq % 8 == 7 {
                s.push('\n');
            }
        }
        s
    }
}

impl PartialEq for Position {
    /// Two positions are equal if everything but their histories and caches
    /// match bit for bit.
    fn eq(&self, other: &Position) -> bool {
        self.turn == other.turn
            && self.by_type == other.by_type
            && self.by_color == other.by_color
            && self.occ_all == other.occ_all
            && self.board[..] == other.board[..]
            && self.castling == other.castling
            && self.ep_square == other.ep_square
            && self.halfmoves == other.halfmoves
            && self.fullmoves == other.fullmoves
            && self.key == other.key
            && self.pawn_key == other.pawn_key
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\nfen: {}", self.pretty_string(), self.fen())
    }
}
