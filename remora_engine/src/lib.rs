//! An alpha-beta chess engine built on the [`remora`] board library.
//!
//! The engine searches with iterative-deepening principal-variation search and
//! a quiescence extension, ordering moves through a staged picker fed by the
//! transposition table, killers, and a butterfly history. Evaluation is a
//! tapered material + piece-square blend with a cached pawn-structure term.
//!
//! # Usage
//!
//! ```
//! use remora_engine::Searcher;
//!
//! let mut searcher = Searcher::new(3, 10.0, 8);
//! searcher
//!     .set_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
//!     .unwrap();
//! let best = searcher.compute_move().unwrap();
//! assert_eq!(best.len(), 4);
//! ```
//!
//! [`remora`]: ../remora/index.html

pub mod consts;
pub mod eval;
pub mod movepick;
pub mod pawn_table;
pub mod position;
pub mod search;
pub mod see;
pub mod tables;

pub use crate::position::SearchPosition;
pub use crate::search::{SearchError, Searcher, Stats};
