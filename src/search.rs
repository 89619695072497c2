//! Deku - Search Engine Module
//!
//! Iterative deepening over minimax with alpha-beta pruning. Every node owns
//! a private copy of its board, and the deadline is passed down explicitly
//! and checked on entry. Past the deadline a node returns a sentinel that is
//! only used to unwind; an iteration that ran into the deadline is thrown
//! away and the result of the deepest completed iteration stands.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::{Board, Move};
use crate::config::MAX_DEPTH;
use crate::evaluation::{evaluate, MATE_SCORE};
use crate::move_generator::MoveGenerator;
use crate::types::Color;

/// Sentinel bound, beyond any reachable score
pub const INFINITY: i32 = 100_000;

/// Outcome of one search call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Score of `best_move` at `depth`, from the searching side's view
    pub score: i32,
    /// Deepest fully completed iteration (0 if none completed)
    pub depth: u32,
    pub nodes: u64,
}

impl SearchResult {
    fn empty() -> Self {
        SearchResult {
            best_move: None,
            score: -INFINITY,
            depth: 0,
            nodes: 0,
        }
    }
}

/// Shift a mate score by the remaining depth so that quicker mates score
/// higher and quicker losses score lower.
#[inline]
fn mate_bias(score: i32, depth: u32) -> i32 {
    if score >= MATE_SCORE {
        score + depth as i32
    } else if score <= -MATE_SCORE {
        score - depth as i32
    } else {
        score
    }
}

/// Recursive search state for one thread
pub(crate) struct NodeSearch {
    perspective: Color,
    move_generator: MoveGenerator,
    pub(crate) nodes: u64,
    pub(crate) timed_out: bool,
}

impl NodeSearch {
    pub(crate) fn new(perspective: Color) -> Self {
        NodeSearch {
            perspective,
            move_generator: MoveGenerator::new(),
            nodes: 0,
            timed_out: false,
        }
    }

    /// Score `board` from the perspective side's point of view. The side to
    /// move on the board decides whether this node maximizes or minimizes.
    pub(crate) fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        deadline: Instant,
    ) -> i32 {
        self.nodes += 1;

        // Drawn positions are terminal
        if board.is_draw() {
            return 0;
        }

        let fitness = evaluate(board, self.perspective);
        if fitness.abs() >= MATE_SCORE {
            return mate_bias(fitness, depth);
        }

        let to_move = board.side_to_move();
        let maximizing = to_move == self.perspective;

        if Instant::now() >= deadline {
            self.timed_out = true;
            return if maximizing { -INFINITY } else { INFINITY };
        }

        let in_check = board.in_check(to_move);

        // Leaves only look further when the side to move might be mated
        if depth == 0 && !in_check {
            return fitness;
        }

        let moves = self.move_generator.generate_legal_moves(board, to_move);

        // Checkmate / Stalemate
        if moves.is_empty() {
            if !in_check {
                return 0;
            }
            let score = if maximizing { -MATE_SCORE } else { MATE_SCORE };
            return mate_bias(score, depth);
        }

        if depth == 0 {
            return fitness;
        }

        let mut best = if maximizing { -INFINITY } else { INFINITY };

        for mv in moves {
            let mut child = *board;
            child.apply_unchecked(mv);
            let value = self.minimax(&child, depth - 1, alpha, beta, deadline);

            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }

            if beta <= alpha || self.timed_out {
                break;
            }
        }

        best
    }
}

/// Result of one root iteration
pub(crate) enum Iteration {
    /// Every candidate was scored
    Complete(Move, i32),
    /// A candidate forces mate; remaining candidates were skipped
    Mate(Move, i32),
    /// The deadline hit; holds the best fully scored candidate, if any
    Aborted(Option<(Move, i32)>),
}

/// Run iterative deepening, calling `iterate(depth)` for each depth until an
/// iteration aborts, finds a forced mate, or `depth_limit` is done.
pub(crate) fn iterative_deepening<F>(candidates: &[Move], depth_limit: u32, mut iterate: F) -> SearchResult
where
    F: FnMut(u32) -> Iteration,
{
    let mut result = SearchResult::empty();
    let Some(&first) = candidates.first() else {
        return result;
    };
    let mut fallback = None;

    for depth in 1..=depth_limit.min(MAX_DEPTH) {
        match iterate(depth) {
            Iteration::Complete(mv, score) => {
                result.best_move = Some(mv);
                result.score = score;
                result.depth = depth;
                debug!(depth, best = %mv, score, "iteration complete");
            }
            Iteration::Mate(mv, score) => {
                result.best_move = Some(mv);
                result.score = score;
                result.depth = depth;
                debug!(depth, best = %mv, score, "forced mate found");
                break;
            }
            Iteration::Aborted(partial) => {
                fallback = partial;
                debug!(depth, "deadline reached");
                break;
            }
        }
    }

    // Nothing completed: keep whatever depth one managed to score
    if result.best_move.is_none() {
        let (mv, score) = fallback.unwrap_or((first, -INFINITY));
        result.best_move = Some(mv);
        result.score = score;
    }

    result
}

/// Sequential search engine for one side
pub struct SearchEngine {
    color: Color,
    move_generator: MoveGenerator,
    depth_limit: u32,
    pub nodes_searched: u64,
}

impl SearchEngine {
    pub fn new(color: Color, depth_limit: u32) -> Self {
        SearchEngine {
            color,
            move_generator: MoveGenerator::new(),
            depth_limit,
            nodes_searched: 0,
        }
    }

    /// Pick a move for this engine's side within `budget`. The board should
    /// have this side to move.
    pub fn search(&mut self, board: &Board, budget: Duration) -> SearchResult {
        let started = Instant::now();
        let deadline = started + budget;
        let candidates = self.move_generator.generate_legal_moves(board, self.color);
        let mut searcher = NodeSearch::new(self.color);

        let mut result = iterative_deepening(&candidates, self.depth_limit, |depth| {
            search_root(&mut searcher, board, &candidates, depth, deadline)
        });

        result.nodes = searcher.nodes;
        self.nodes_searched = searcher.nodes;
        debug!(
            depth = result.depth,
            nodes = result.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        result
    }
}

/// One root iteration over `candidates`, pruning with the best root score
fn search_root(
    searcher: &mut NodeSearch,
    board: &Board,
    candidates: &[Move],
    depth: u32,
    deadline: Instant,
) -> Iteration {
    let mut best: Option<(Move, i32)> = None;
    let mut alpha = -INFINITY;

    for &mv in candidates {
        if Instant::now() >= deadline {
            return Iteration::Aborted(best);
        }

        let mut child = *board;
        child.apply_unchecked(mv);
        let score = searcher.minimax(&child, depth - 1, alpha, INFINITY, deadline);

        if searcher.timed_out {
            searcher.timed_out = false;
            return Iteration::Aborted(best);
        }

        // Strictly better only: earlier candidates win ties
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((mv, score));
        }
        alpha = alpha.max(score);

        if score >= MATE_SCORE {
            return Iteration::Mate(mv, score);
        }
    }

    match best {
        Some((mv, score)) => Iteration::Complete(mv, score),
        None => Iteration::Aborted(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FIFTY_MOVE_PLIES;
    use crate::types::*;

    fn layout(pieces: &[(&str, Piece)]) -> Layout {
        let mut grid = [[EMPTY; 8]; 8];
        for (name, piece) in pieces {
            let s = Square::parse(name).unwrap();
            grid[s.file as usize][s.rank as usize] = *piece;
        }
        grid
    }

    #[test]
    fn test_mate_bias_prefers_fast_mates() {
        assert!(mate_bias(MATE_SCORE, 3) > mate_bias(MATE_SCORE, 1));
        assert!(mate_bias(-MATE_SCORE, 3) < mate_bias(-MATE_SCORE, 1));
        assert_eq!(mate_bias(12, 5), 12);
    }

    #[test]
    fn test_finds_mate_in_one() {
        let grid = layout(&[("h8", -KING), ("g7", -PAWN), ("h7", -PAWN), ("a1", ROOK), ("g1", KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let mut engine = SearchEngine::new(Color::White, 3);
        let result = engine.search(&board, Duration::from_secs(30));
        assert_eq!(result.best_move, Some(Move::parse("a1a8").unwrap()));
        assert!(result.score >= MATE_SCORE);
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_captures_hanging_queen() {
        let grid = layout(&[("e1", KING), ("e8", -KING), ("d1", ROOK), ("d5", -QUEEN), ("a7", PAWN)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let mut engine = SearchEngine::new(Color::White, 2);
        let result = engine.search(&board, Duration::from_secs(30));
        assert_eq!(result.best_move, Some(Move::parse("d1d5").unwrap()));
        assert_eq!(result.depth, 2);
        assert!(result.nodes > 0);
    }

    #[test]
    fn test_depth_limit_completes() {
        let mut engine = SearchEngine::new(Color::White, 2);
        let result = engine.search(&Board::new(), Duration::from_secs(60));
        assert_eq!(result.depth, 2);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_zero_budget_still_returns_a_move() {
        let board = Board::new();
        let mut engine = SearchEngine::new(Color::White, MAX_DEPTH);
        let result = engine.search(&board, Duration::ZERO);
        let legal = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        assert!(legal.contains(&result.best_move.unwrap()));
    }

    #[test]
    fn test_no_candidates() {
        let grid = layout(&[("a8", -KING), ("c7", KING), ("b6", QUEEN)]);
        let board = Board::from_layout(grid, Color::Black).unwrap();
        let mut engine = SearchEngine::new(Color::Black, 3);
        assert_eq!(engine.search(&board, Duration::from_millis(50)).best_move, None);
    }

    fn back_rank() -> Board {
        let grid = layout(&[("h8", -KING), ("g7", -PAWN), ("h7", -PAWN), ("a1", ROOK), ("g1", KING)]);
        Board::from_layout(grid, Color::White).unwrap()
    }

    #[test]
    fn test_drawn_position_scores_zero() {
        let mut board = back_rank();
        board.halfmove_clock = FIFTY_MOVE_PLIES;
        board.declare_draw();
        let deadline = Instant::now() + Duration::from_secs(30);

        let mut searcher = NodeSearch::new(Color::White);
        assert_eq!(searcher.minimax(&board, 2, -INFINITY, INFINITY, deadline), 0);
        assert_eq!(searcher.nodes, 1);

        // Every reply keeps the clock past the limit, so the mate is gone
        let result = SearchEngine::new(Color::White, 3).search(&board, Duration::from_secs(30));
        assert_eq!(result.score, 0);
        assert_eq!(result.depth, 3);
    }

    #[test]
    fn test_expired_deadline_stops_at_leaves() {
        let board = Board::new();
        let mut searcher = NodeSearch::new(Color::White);
        let score = searcher.minimax(&board, 0, -INFINITY, INFINITY, Instant::now());
        assert!(searcher.timed_out);
        assert_eq!(score, -INFINITY);
    }

    fn mv(text: &str) -> Move {
        Move::parse(text).unwrap()
    }

    #[test]
    fn test_unfinished_depth_is_discarded() {
        let candidates = [mv("e2e4"), mv("d2d4")];
        let result = iterative_deepening(&candidates, 10, |depth| match depth {
            1 => Iteration::Complete(mv("e2e4"), 5),
            _ => Iteration::Aborted(Some((mv("d2d4"), 40))),
        });
        assert_eq!(result.best_move, Some(mv("e2e4")));
        assert_eq!(result.score, 5);
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_partial_first_depth_is_kept() {
        let candidates = [mv("e2e4"), mv("d2d4")];
        let result = iterative_deepening(&candidates, 10, |_| Iteration::Aborted(Some((mv("d2d4"), 7))));
        assert_eq!(result.best_move, Some(mv("d2d4")));
        assert_eq!(result.score, 7);
        assert_eq!(result.depth, 0);

        let result = iterative_deepening(&candidates, 10, |_| Iteration::Aborted(None));
        assert_eq!(result.best_move, Some(mv("e2e4")));
        assert_eq!(result.depth, 0);
    }

    #[test]
    fn test_mate_ends_deepening() {
        let candidates = [mv("e2e4"), mv("d2d4")];
        let mut calls = 0;
        let result = iterative_deepening(&candidates, 10, |depth| {
            calls += 1;
            match depth {
                1 => Iteration::Complete(mv("e2e4"), 3),
                _ => Iteration::Mate(mv("d2d4"), MATE_SCORE + 1),
            }
        });
        assert_eq!(calls, 2);
        assert_eq!(result.best_move, Some(mv("d2d4")));
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn test_depth_limit_bounds_iterations() {
        let candidates = [mv("e2e4")];
        let mut deepest = 0;
        let result = iterative_deepening(&candidates, 4, |depth| {
            deepest = depth;
            Iteration::Complete(mv("e2e4"), 0)
        });
        assert_eq!(deepest, 4);
        assert_eq!(result.depth, 4);
    }

    #[test]
    fn test_avoids_being_mated() {
        // Black threatens Ra1 mate; White must give the king air or block
        let grid = layout(&[
            ("g1", KING),
            ("f2", PAWN),
            ("g2", PAWN),
            ("h2", PAWN),
            ("a2", -ROOK),
            ("b8", -ROOK),
            ("h8", -KING),
            ("d4", KNIGHT),
        ]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let mut engine = SearchEngine::new(Color::White, 3);
        let result = engine.search(&board, Duration::from_secs(60));
        let mv = result.best_move.unwrap();
        assert!(result.score > -MATE_SCORE, "{} loses by force", mv);
        assert_eq!(result.depth, 3);
    }
}
