//! Constant values and node-type traits used by the search.

/// A score no real evaluation can reach, returned as a sentinel by interrupted
/// nodes.
pub const INF_SCORE: i32 = 100_000_000;

/// Score of delivering checkmate at the root.
pub const MATE_SCORE: i32 = 100_000;

/// Scores within this distance of `MATE_SCORE` encode a mate and carry a ply
/// distance.
pub const MATE_WINDOW: i32 = 1_000;

/// Score of a drawn position.
pub const DRAW_SCORE: i32 = 0;

/// The deepest ply the killer table accounts for.
pub const MAX_PLY: usize = 256;

/// Returns the score for being mated in `ply` halfmoves, preferring later mates
/// for the losing side.
#[inline(always)]
pub fn mated_in(ply: i32) -> i32 {
    -MATE_SCORE + ply
}

/// Adjusts a mate score so that the stored value is ply-independent before it
/// enters the transposition table.
#[inline]
pub fn normalize_score_for_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_SCORE - MATE_WINDOW {
        score + ply
    } else if score < -MATE_SCORE + MATE_WINDOW {
        score - ply
    } else {
        score
    }
}

/// Reverses [`normalize_score_for_tt`] when a stored score is retrieved at a
/// given ply.
///
/// [`normalize_score_for_tt`]: fn.normalize_score_for_tt.html
#[inline]
pub fn adjust_score_from_tt(stored: i32, ply: i32) -> i32 {
    if stored > MATE_SCORE - MATE_WINDOW {
        stored - ply
    } else if stored < -MATE_SCORE + MATE_WINDOW {
        stored + ply
    } else {
        stored
    }
}

/// The type of a node in the search tree, monomorphizing the search function.
pub trait NodeType {
    /// Returns if this is the root node.
    fn is_root() -> bool;
    /// Returns if this node is on the principal variation.
    fn is_pv() -> bool;
}

/// The root of the search tree.
pub struct Root {}
/// A principal-variation node.
pub struct PV {}
/// A null-window node.
pub struct NonPV {}

impl NodeType for Root {
    #[inline(always)]
    fn is_root() -> bool {
        true
    }
    #[inline(always)]
    fn is_pv() -> bool {
        true
    }
}

impl NodeType for PV {
    #[inline(always)]
    fn is_root() -> bool {
        false
    }
    #[inline(always)]
    fn is_pv() -> bool {
        true
    }
}

impl NodeType for NonPV {
    #[inline(always)]
    fn is_root() -> bool {
        false
    }
    #[inline(always)]
    fn is_pv() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_scores_round_trip() {
        for ply in 0..32 {
            let score = MATE_SCORE - ply;
            let stored = normalize_score_for_tt(score, ply);
            assert_eq!(adjust_score_from_tt(stored, ply), score);

            let score = -MATE_SCORE + ply;
            let stored = normalize_score_for_tt(score, ply);
            assert_eq!(adjust_score_from_tt(stored, ply), score);
        }
        assert_eq!(normalize_score_for_tt(120, 10), 120);
        assert_eq!(adjust_score_from_tt(-75, 10), -75);
    }
}
