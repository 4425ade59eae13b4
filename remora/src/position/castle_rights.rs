//! Module for the `Castling` structure, which keeps track of the castling
//! rights still available to each player.
//!
//! At its core, a [`Castling`] is a simple u8 with one bit per possible castle.
//! A set bit only marks that castling has not been permanently forfeited; it
//! does not mean castling is legal right now.
//!
//! [`Castling`]: struct.Castling.html

use crate::core::masks::*;
use crate::core::{CastleType, Player};
use std::fmt;

bitflags! {
    /// Keeps track of the castling rights remaining for both players.
    ///
    /// For internal use by the [`Position`] only.
    ///
    /// [`Position`]: ../struct.Position.html
    pub struct Castling: u8 {
        const WHITE_K = C_WHITE_K_MASK;
        const WHITE_Q = C_WHITE_Q_MASK;
        const BLACK_K = C_BLACK_K_MASK;
        const BLACK_Q = C_BLACK_Q_MASK;
        const WHITE_ALL = Self::WHITE_K.bits | Self::WHITE_Q.bits;
        const BLACK_ALL = Self::BLACK_K.bits | Self::BLACK_Q.bits;
    }
}

impl Castling {
    /// Returns if a player may still castle on the given side.
    #[inline]
    pub fn castle_rights(self, player: Player, side: CastleType) -> bool {
        let mask = match (player, side) {
            (Player::White, CastleType::KingSide) => Castling::WHITE_K,
            (Player::White, CastleType::QueenSide) => Castling::WHITE_Q,
            (Player::Black, CastleType::KingSide) => Castling::BLACK_K,
            (Player::Black, CastleType::QueenSide) => Castling::BLACK_Q,
        };
        self.contains(mask)
    }

    /// Returns if a player has any castling rights left.
    #[inline]
    pub fn player_can_castle(self, player: Player) -> bool {
        let mask = match player {
            Player::White => Castling::WHITE_ALL,
            Player::Black => Castling::BLACK_ALL,
        };
        self.intersects(mask)
    }

    /// Returns if both players have lost the ability to castle.
    #[inline]
    pub fn no_castling(self) -> bool {
        self.is_empty()
    }

    /// Adds a castling right from a FEN character. Returns false for a
    /// character that is not one of `K`, `Q`, `k`, `q`.
    pub fn add_castling_char(&mut self, c: char) -> bool {
        self.bits |= match c {
            'K' => C_WHITE_K_MASK,
            'Q' => C_WHITE_Q_MASK,
            'k' => C_BLACK_K_MASK,
            'q' => C_BLACK_Q_MASK,
            _ => return false,
        };
        true
    }

    /// Returns the FEN representation of the castling state, with letters in
    /// `KQkq` order, or "-" if no rights remain.
    pub fn pretty_string(self) -> String {
        if self.no_castling() {
            "-".to_owned()
        } else {
            let mut s = String::with_capacity(4);
            if self.contains(Castling::WHITE_K) {
                s.push('K');
            }
            if self.contains(Castling::WHITE_Q) {
                s.push('Q');
            }
            if self.contains(Castling::BLACK_K) {
                s.push('k');
            }
            if self.contains(Castling::BLACK_Q) {
                s.push('q');
            }
            s
        }
    }
}

impl fmt::Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rights_and_strings() {
        let mut c = Castling::empty();
        assert!(c.no_castling());
        assert_eq!(c.pretty_string(), "-");

        assert!(c.add_castling_char('K'));
        assert!(c.add_castling_char('q'));
        assert!(!c.add_castling_char('x'));

        assert!(c.castle_rights(Player::White, CastleType::KingSide));
        assert!(!c.castle_rights(Player::White, CastleType::QueenSide));
        assert!(c.castle_rights(Player::Black, CastleType::QueenSide));
        assert!(c.player_can_castle(Player::White));
        assert_eq!(c.pretty_string(), "Kq");

        assert_eq!(Castling::all().pretty_string(), "KQkq");
    }
}
