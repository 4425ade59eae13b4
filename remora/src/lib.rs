//! A bitboard-based chess library, providing the building blocks of a chess engine.
//!
//! This crate contains the board representation (the [`Position`]), magic-bitboard
//! move generation, incremental Zobrist hashing, and the transposition table used
//! by the companion crate `remora_engine`.
//!
//! # Usage
//!
//! A [`Position`] can be created from the starting position like so:
//!
//! ```
//! use remora::Position;
//! let pos = Position::start_pos();
//! ```
//!
//! Generating a list of legal moves (contained inside a [`MoveList`]):
//!
//! ```
//! use remora::Position;
//! let pos = Position::start_pos();
//! let list = pos.generate_moves();
//! assert_eq!(list.len(), 20);
//! ```
//!
//! Applying and un-doing moves is simple:
//!
//! ```
//! use remora::Position;
//! let mut pos = Position::start_pos();
//! let list = pos.generate_moves();
//!
//! for mov in &list {
//!     pos.make_move(mov);
//!     pos.undo_move();
//! }
//! ```
//!
//! FEN strings are supported as well:
//!
//! ```
//! use remora::Position;
//! let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
//! let pos = Position::from_fen(fen).unwrap();
//! assert_eq!(pos.fen(), fen);
//! ```
//!
//! [`Position`]: position/struct.Position.html
//! [`MoveList`]: core/move_list/struct.MoveList.html

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;

pub mod core;
pub mod helper;
pub mod position;
pub mod tools;

pub use crate::core::bitboard::BitBoard;
pub use crate::core::move_list::MoveList;
pub use crate::core::piece_move::{BitMove, MoveType};
pub use crate::core::sq::SQ;
pub use crate::core::{File, GenTypes, Phase, Piece, PieceType, Player, Rank};
pub use crate::position::Position;
