//! Primitives for the value of a position or location.
//!
//! A `Value` is a single `i32` score in centipawns. A `Score` stores two values,
//! the first for the middle-game and the second for the end-game, to be blended
//! by the material phase.

use std::ops::*;

/// Type used for an evaluation in centipawns.
pub type Value = i32;

/// Value of a drawn position.
pub const DRAW: Value = 0;

/// Struct pairing a mid-game and an end-game evaluation.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Score(pub Value, pub Value);

impl Score {
    pub const ZERO: Score = Score(0, 0);

    /// Creates a new `Score`.
    #[inline(always)]
    pub fn new(mg: Value, eg: Value) -> Self {
        Score(mg, eg)
    }

    /// Returns the mid-game score.
    #[inline(always)]
    pub fn mg(self) -> Value {
        self.0
    }

    /// Returns the end-game score.
    #[inline(always)]
    pub fn eg(self) -> Value {
        self.1
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, other: Score) -> Score {
        Score(self.0 + other.0, self.1 + other.1)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, other: Score) {
        *self = *self + other;
    }
}

impl Sub for Score {
    type Output = Score;

    fn sub(self, other: Score) -> Score {
        Score(self.0 - other.0, self.1 - other.1)
    }
}

impl SubAssign for Score {
    fn sub_assign(&mut self, other: Score) {
        *self = *self - other;
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score(-self.0, -self.1)
    }
}
