//! The search core: an iterative-deepening, fail-soft principal-variation
//! search with quiescence, driven by the staged move picker and memoized
//! through the transposition table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use thiserror::Error;

use remora::position::FenBuildError;
use remora::tools::tt::{Bound, TTEntry, TranspositionTable};
use remora::{BitMove, PieceType, Position};

use crate::consts::*;
use crate::movepick::MovePicker;
use crate::position::SearchPosition;
use crate::tables::{ButterflyHistory, KillerTable};

/// Errors surfaced by the engine facade. Running out of time is not an error;
/// an interrupted search simply answers from its deepest completed iteration.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("illegal move: {uci}")]
    IllegalMove { uci: String },
    #[error("no move to undo")]
    NoPreviousMove,
    #[error("no legal moves in the current position")]
    NoLegalMoves,
}

/// Statistics gathered over the last search.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    /// Deepest fully completed iteration.
    pub depth: u32,
    /// Nodes visited by the main search.
    pub alpha_beta_nodes: u64,
    /// Nodes visited by the quiescence search.
    pub quiescence_nodes: u64,
    /// Transposition probes that found a matching key.
    pub tt_raw_hits: u64,
    /// Probes whose stored depth satisfied the node.
    pub tt_usable_hits: u64,
    /// Probes that cut the node off entirely.
    pub tt_cutoffs: u64,
    /// Score of the best move from the last completed iteration.
    pub eval: i32,
    /// Wall-clock duration of the search.
    pub time_seconds: f64,
}

/// The searcher: owns the search position, the transposition table, and the
/// ordering heuristics, and exposes the engine facade.
///
/// A search runs to completion inside [`compute_move`] unless the wall-clock
/// deadline or node ceiling fires, or a cooperating caller raises the shared
/// stop flag obtained from [`stop_signal`].
///
/// [`compute_move`]: struct.Searcher.html#method.compute_move
/// [`stop_signal`]: struct.Searcher.html#method.stop_signal
pub struct Searcher {
    spos: SearchPosition,
    tt: TranspositionTable,
    killers: KillerTable,
    history: ButterflyHistory,

    max_depth: i32,
    time_limit_seconds: f64,
    max_nodes: i64,

    /// Best move of the iteration currently in progress. A later iteration may
    /// time out partway, so the driver only reads this after completed ones.
    root_best_move: BitMove,

    start: Instant,
    deadline_ms: i64,
    nodes_visited: i64,
    stop_search: bool,
    stop_signal: Arc<AtomicBool>,

    stats: Stats,
}

impl Searcher {
    /// Creates a searcher with a maximum depth, a per-move time limit in
    /// seconds, and a transposition-table budget in megabytes. The board starts
    /// at the standard starting position.
    pub fn new(max_depth: i32, time_limit_seconds: f64, tt_megabytes: usize) -> Searcher {
        Searcher {
            spos: SearchPosition::new(),
            tt: TranspositionTable::new(tt_megabytes),
            killers: KillerTable::new(),
            history: ButterflyHistory::new(),
            max_depth,
            time_limit_seconds,
            max_nodes: i64::MAX,
            root_best_move: BitMove::null(),
            start: Instant::now(),
            deadline_ms: i64::MAX,
            nodes_visited: 0,
            stop_search: false,
            stop_signal: Arc::new(AtomicBool::new(false)),
            stats: Stats::default(),
        }
    }

    /// Sets the time limit in seconds. Negative means no limit.
    pub fn set_time_limit_seconds(&mut self, secs: f64) {
        self.time_limit_seconds = if secs < 0.0 { 1e9 } else { secs };
    }

    /// Sets the maximum search depth. Negative means no practical limit.
    pub fn set_max_depth(&mut self, depth: i32) {
        self.max_depth = if depth < 0 { 9_999 } else { depth };
    }

    /// Sets the maximum number of nodes to search. Negative means no limit.
    pub fn set_max_nodes(&mut self, nodes: i64) {
        self.max_nodes = if nodes < 0 { i64::MAX } else { nodes };
    }

    /// Clears the transposition table and the ordering heuristics, as between
    /// two games.
    pub fn clear_tables(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }

    /// Returns the shared stop flag. A cooperating caller (e.g. a GUI thread)
    /// sets it to make the search return early with the best completed
    /// iteration's move.
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Raises the shared stop flag.
    pub fn request_stop(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }

    /// Returns the statistics of the last search.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Returns the current position.
    pub fn position(&self) -> &Position {
        self.spos.position()
    }

    /// Sets the board from a FEN description.
    pub fn set_board(&mut self, fen: &str) -> Result<(), FenBuildError> {
        self.spos.set_board(fen)
    }

    /// Applies a move given in UCI notation, validating it against the legal
    /// move list.
    pub fn apply_move(&mut self, uci: &str) -> Result<(), SearchError> {
        let mv = self
            .spos
            .position()
            .move_from_uci(uci)
            .map_err(|_| SearchError::IllegalMove {
                uci: uci.to_string(),
            })?;
        if !self.spos.position().generate_moves().contains(&mv) {
            return Err(SearchError::IllegalMove {
                uci: uci.to_string(),
            });
        }
        self.spos.make_move(mv);
        Ok(())
    }

    /// Un-does the last applied move.
    pub fn undo_move(&mut self) -> Result<(), SearchError> {
        if self.spos.undo_move() {
            Ok(())
        } else {
            Err(SearchError::NoPreviousMove)
        }
    }

    /// Searches the current position and returns the best move in UCI notation.
    pub fn compute_move(&mut self) -> Result<String, SearchError> {
        self.search_root().map(|(mv, _)| mv.stringify())
    }

    /// Searches the current position and returns the best move.
    pub fn best_move(&mut self) -> Result<BitMove, SearchError> {
        self.search_root().map(|(mv, _)| mv)
    }

    /// Mate finding utility: searches under the configured limits and converts
    /// a mate score into a signed distance in moves. Positive means the side to
    /// move mates in that many moves, negative that it gets mated; zero means
    /// no mate was proven.
    pub fn find_mate(&mut self) -> Result<(i32, String), SearchError> {
        let (mv, score) = self.search_root()?;
        let distance = if score > MATE_SCORE - MATE_WINDOW {
            (MATE_SCORE - score + 1) / 2
        } else if score < -MATE_SCORE + MATE_WINDOW {
            -((MATE_SCORE + score) / 2)
        } else {
            0
        };
        Ok((distance, mv.stringify()))
    }

    /// The iterative-deepening driver. Each completed iteration updates the
    /// returned best move; an interrupted iteration is discarded. If even the
    /// first iteration was interrupted, an arbitrary legal move is returned.
    fn search_root(&mut self) -> Result<(BitMove, i32), SearchError> {
        let move_list = self.spos.position().generate_moves();
        if move_list.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        self.stats = Stats::default();
        self.tt.new_search();
        self.killers.clear();
        self.stop_signal.store(false, Ordering::Relaxed);

        self.start = Instant::now();
        self.deadline_ms = (self.time_limit_seconds * 1000.0) as i64;
        self.stop_search = false;
        self.nodes_visited = 0;

        let mut best_move = BitMove::null();
        let mut best_score = -INF_SCORE;

        let mut depth = 1;
        while depth <= self.max_depth {
            let score = self.alpha_beta::<Root>(-INF_SCORE, INF_SCORE, depth, 0);
            if self.stop_search {
                break;
            }

            best_move = self.root_best_move;
            best_score = score;
            debug!(
                "depth {} score {} nodes {} time {}ms pv {}",
                depth,
                score,
                self.nodes_visited,
                self.elapsed_ms(),
                best_move
            );
            depth += 1;
        }

        if best_move.is_null() {
            // The clock ran out inside the very first iteration; any legal
            // move beats returning none at all.
            warn!("search stopped during the first iteration; playing an arbitrary legal move");
            best_move = move_list[0];
        }

        self.stats.depth = (depth - 1).max(0) as u32;
        self.stats.eval = best_score;
        self.stats.time_seconds = self.elapsed_ms() as f64 / 1000.0;

        Ok((best_move, best_score))
    }

    /// Fail-soft negamax with principal-variation search: the first move of a
    /// PV node gets the full window, later moves a null window with a
    /// re-search when they land inside it.
    fn alpha_beta<N: NodeType>(
        &mut self,
        mut alpha: i32,
        mut beta: i32,
        depth: i32,
        ply: i32,
    ) -> i32 {
        self.stats.alpha_beta_nodes += 1;

        if N::is_root() {
            self.root_best_move = BitMove::null();
        }

        if self.stop_check() {
            return -INF_SCORE;
        }

        if self.spos.position().halfmove_clock() >= 100 {
            return DRAW_SCORE; // fifty-move rule
        }
        if self.spos.plies_since_irreversible() >= 4 && self.spos.repetition_count() >= 3 {
            return DRAW_SCORE; // threefold repetition
        }

        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }

        let starting_alpha = alpha;
        let key = self.spos.position().zobrist();
        let tt_entry: Option<TTEntry> = self.tt.find(key).copied();

        let mut tt_move = BitMove::null();
        if let Some(entry) = tt_entry {
            self.stats.tt_raw_hits += 1;
            tt_move = entry.best_move;

            if !N::is_pv() && entry.depth as i32 >= depth {
                self.stats.tt_usable_hits += 1;
                // Use the stored score, adjusted back to this ply's mate
                // distance, if its bound allows a cutoff against the window.
                let stored = adjust_score_from_tt(entry.score, ply);
                match entry.bound {
                    Bound::Lower => alpha = alpha.max(stored),
                    Bound::Upper => beta = beta.min(stored),
                    _ => {}
                }
                if entry.bound == Bound::Exact || alpha >= beta {
                    self.stats.tt_cutoffs += 1;
                    return stored;
                }
            }
        }

        let killers = [
            self.killers.first(ply as usize),
            self.killers.second(ply as usize),
        ];
        let mut picker = MovePicker::new(self.spos.position(), tt_move, killers);

        let mut best_move = BitMove::null();
        let mut best_score = -INF_SCORE;
        let mut move_count = 0;

        loop {
            let mv = picker.next(self.spos.position(), &self.history);
            if mv.is_null() {
                break;
            }
            move_count += 1;

            self.spos.make_move(mv);

            let score = if (N::is_pv() && move_count == 1) || depth <= 1 {
                // Full window for the first move of a PV node, and for every
                // move near the horizon.
                if N::is_pv() {
                    -self.alpha_beta::<PV>(-beta, -alpha, depth - 1, ply + 1)
                } else {
                    -self.alpha_beta::<NonPV>(-beta, -alpha, depth - 1, ply + 1)
                }
            } else {
                let s = -self.alpha_beta::<NonPV>(-alpha - 1, -alpha, depth - 1, ply + 1);
                if s > alpha && s < beta {
                    // The null window failed to refute the move; re-search it
                    // with the full window.
                    -self.alpha_beta::<PV>(-beta, -alpha, depth - 1, ply + 1)
                } else {
                    s
                }
            };

            self.spos.undo_move();

            if self.stop_search {
                return -INF_SCORE;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;

                if N::is_root() {
                    self.root_best_move = mv;
                }

                if score > alpha {
                    if score < beta {
                        alpha = score;
                    } else {
                        // Refutation found, fail-high node. Quiet refutations
                        // feed the killer and history ordering heuristics.
                        if self.spos.position().captured_piece(mv) == PieceType::None
                            && !(mv.is_promo() && mv.promo_piece() == PieceType::Q)
                        {
                            self.killers.store(mv, ply as usize);
                            let piece = self.spos.position().moved_piece(mv);
                            self.history.update(piece, mv.get_dest(), depth * depth);
                        }
                        break;
                    }
                }
            }
        }

        if move_count == 0 {
            // Checkmate or stalemate.
            let us = self.spos.position().turn();
            best_score = if self.spos.position().in_check(us) {
                mated_in(ply)
            } else {
                DRAW_SCORE
            };
        }

        let bound = if best_score <= starting_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(
            key,
            normalize_score_for_tt(best_score, ply),
            depth as i16,
            bound,
            best_move,
        );

        best_score
    }

    /// Quiescence search over captures and queen promotions. In check, all
    /// evasions are generated so checkmates are detected; stalemates cannot
    /// be, as most moves are never considered. No draw checks are performed
    /// here.
    fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.stats.quiescence_nodes += 1;

        if self.stop_check() {
            return -INF_SCORE;
        }

        let us = self.spos.position().turn();
        let in_check = self.spos.position().in_check(us);
        let mut best_score = -INF_SCORE;

        if !in_check {
            // Stand pat: the static evaluation bounds the node from below.
            let stand_pat = self.spos.evaluate();
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            best_score = stand_pat;
        }

        // The table is probed for its move hint only; depth-0 scores are not
        // trusted for cutoffs here.
        let key = self.spos.position().zobrist();
        let tt_move = self
            .tt
            .find(key)
            .map(|e| e.best_move)
            .unwrap_or_else(BitMove::null);
        let mut picker = MovePicker::quiescence(self.spos.position(), tt_move);

        let mut move_count = 0;
        loop {
            let mv = picker.next(self.spos.position(), &self.history);
            if mv.is_null() {
                break;
            }
            move_count += 1;

            self.spos.make_move(mv);
            let score = -self.quiescence(-beta, -alpha, ply + 1);
            self.spos.undo_move();

            if self.stop_search {
                return -INF_SCORE;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    if score < beta {
                        alpha = score;
                    } else {
                        break;
                    }
                }
            }
        }

        if in_check && move_count == 0 {
            best_score = mated_in(ply);
        }

        best_score
    }

    /// Sticky stop condition, sampled every node. The node counter comes
    /// first so the sampling is deterministic; the wall clock is consulted
    /// every 1024 nodes.
    fn stop_check(&mut self) -> bool {
        self.nodes_visited += 1;
        if self.nodes_visited & 1023 == 0
            && (self.elapsed_ms() >= self.deadline_ms
                || self.nodes_visited >= self.max_nodes
                || self.stop_signal.load(Ordering::Relaxed))
        {
            self.stop_search = true;
        }
        self.stop_search
    }

    fn elapsed_ms(&self) -> i64 {
        chrono::Duration::from_std(self.start.elapsed())
            .unwrap()
            .num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_an_opening_move() {
        let mut searcher = Searcher::new(4, 60.0, 8);
        let uci = searcher.compute_move().unwrap();
        let mv = searcher.position().move_from_uci(&uci).unwrap();
        assert!(searcher.position().generate_moves().contains(&mv));
        assert!(searcher.stats().depth >= 1);
    }

    #[test]
    fn rejects_illegal_moves() {
        let mut searcher = Searcher::new(2, 10.0, 4);
        assert!(searcher.apply_move("e2e5").is_err());
        assert!(searcher.apply_move("e2e4").is_ok());
        assert!(searcher.undo_move().is_ok());
        assert!(matches!(
            searcher.undo_move(),
            Err(SearchError::NoPreviousMove)
        ));
    }

    #[test]
    fn no_legal_moves_is_an_error() {
        let mut searcher = Searcher::new(2, 10.0, 4);
        // A stalemated position: black to move with no moves at all.
        searcher
            .set_board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1")
            .unwrap();
        assert!(matches!(
            searcher.compute_move(),
            Err(SearchError::NoLegalMoves)
        ));
    }

    #[test]
    fn saves_the_attacked_queen() {
        // The queen on h5 is attacked by the g6 pawn; even a shallow search
        // must not leave it hanging.
        let mut searcher = Searcher::new(3, 60.0, 8);
        searcher
            .set_board("rnbqkbnr/pppp1p1p/6p1/4p2Q/4P3/8/PPPP1PPP/RNB1KBNR w KQkq - 0 3")
            .unwrap();
        let uci = searcher.compute_move().unwrap();
        let mv = searcher.position().move_from_uci(&uci).unwrap();
        assert!(searcher.position().generate_moves().contains(&mv));
        // Losing the queen would show up as a score hundreds of centipawns
        // down; keeping her keeps the score near level.
        assert!(searcher.stats().eval > -300);
    }
}
