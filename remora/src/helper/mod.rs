//! Statically initialized lookup tables.
//!
//! Whenever a `Position` is created, these are initialized as well. The tables
//! cover single-square masks, non-sliding attack masks, magic-bitboard sliding
//! attacks, between/line masks, castling helpers, Zobrist key material, and the
//! piece-square tables.
//!
//! Nothing in here is ever mutated after the one-time initialization performed
//! by [`prelude::init_statics`], so the raw accessors in [`prelude`] are safe to
//! call once any `Position` has been constructed.
//!
//! [`prelude::init_statics`]: prelude/fn.init_statics.html
//! [`prelude`]: prelude/index.html

mod boards;
mod magic;
pub mod prelude;
pub mod psqt;
mod zobrist;
