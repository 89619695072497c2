//! Deku - Parallel Search Module
//!
//! Root splitting: the candidate moves at the root are handed out to a pool
//! of worker threads through a shared counter. Each worker scores its
//! candidates on a private board copy with a full window, so no bounds are
//! shared between branches. The best candidate of a depth lives in one
//! locked record. Iterative deepening runs on the calling thread; every
//! depth fans out once.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::board::{Board, Move};
use crate::evaluation::MATE_SCORE;
use crate::move_generator::MoveGenerator;
use crate::search::{iterative_deepening, Iteration, NodeSearch, SearchResult, INFINITY};
use crate::types::Color;

/// Best root candidate of the current depth, shared by all workers
#[derive(Default)]
struct RootRecord {
    /// (candidate index, score)
    best: Option<(usize, i32)>,
    timed_out: bool,
}

impl RootRecord {
    /// Lower index wins ties, matching the sequential order
    fn offer(&mut self, index: usize, score: i32) {
        let better = self.best.map_or(true, |(i, s)| score > s || (score == s && index < i));
        if better {
            self.best = Some((index, score));
        }
    }
}

/// State shared by the workers of one depth
struct SharedRoot {
    candidates: Arc<Vec<Move>>,
    next: AtomicUsize,
    mate_found: AtomicBool,
    record: Mutex<RootRecord>,
}

impl SharedRoot {
    fn record(&self) -> MutexGuard<'_, RootRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Worker loop: claim candidates until none remain, time runs out, or some
/// thread finds a forced mate. Returns the nodes visited.
fn run_worker(color: Color, board: Board, depth: u32, deadline: Instant, shared: &SharedRoot) -> u64 {
    let mut searcher = NodeSearch::new(color);

    while !shared.mate_found.load(Ordering::Relaxed) {
        let index = shared.next.fetch_add(1, Ordering::Relaxed);
        let Some(&mv) = shared.candidates.get(index) else { break };

        if Instant::now() >= deadline {
            shared.record().timed_out = true;
            break;
        }

        let mut child = board;
        child.apply_unchecked(mv);
        let score = searcher.minimax(&child, depth - 1, -INFINITY, INFINITY, deadline);

        if searcher.timed_out {
            shared.record().timed_out = true;
            break;
        }

        shared.record().offer(index, score);
        if score >= MATE_SCORE {
            shared.mate_found.store(true, Ordering::Relaxed);
        }
    }

    searcher.nodes
}

/// Parallel search engine for one side
pub struct ParallelSearchEngine {
    pub num_threads: usize,
    color: Color,
    move_generator: MoveGenerator,
    depth_limit: u32,
    pub nodes_searched: u64,
}

impl ParallelSearchEngine {
    pub fn new(color: Color, depth_limit: u32, num_threads: usize) -> Self {
        ParallelSearchEngine {
            num_threads: num_threads.max(1),
            color,
            move_generator: MoveGenerator::new(),
            depth_limit,
            nodes_searched: 0,
        }
    }

    /// Pick a move for this engine's side within `budget`
    pub fn search(&mut self, board: &Board, budget: Duration) -> SearchResult {
        let started = Instant::now();
        let deadline = started + budget;
        let candidates = Arc::new(self.move_generator.generate_legal_moves(board, self.color));
        let nodes = AtomicU64::new(0);
        let workers = self.num_threads.min(candidates.len()).max(1);
        let color = self.color;
        let board = *board;

        let mut result = iterative_deepening(&candidates, self.depth_limit, |depth| {
            let shared = Arc::new(SharedRoot {
                candidates: Arc::clone(&candidates),
                next: AtomicUsize::new(0),
                mate_found: AtomicBool::new(false),
                record: Mutex::new(RootRecord::default()),
            });

            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let shared = Arc::clone(&shared);
                    thread::spawn(move || run_worker(color, board, depth, deadline, &shared))
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(visited) => {
                        nodes.fetch_add(visited, Ordering::Relaxed);
                    }
                    Err(_) => {
                        warn!(depth, "search worker panicked");
                        shared.record().timed_out = true;
                    }
                }
            }

            let record = shared.record();
            let best = record.best.map(|(index, score)| (candidates[index], score));
            match best {
                Some((mv, score)) if score >= MATE_SCORE => Iteration::Mate(mv, score),
                Some((mv, score)) if !record.timed_out => Iteration::Complete(mv, score),
                partial => Iteration::Aborted(partial),
            }
        });

        result.nodes = nodes.load(Ordering::Relaxed);
        self.nodes_searched = result.nodes;
        debug!(
            threads = workers,
            depth = result.depth,
            nodes = result.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "parallel search finished"
        );
        result
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.num_threads = threads.max(1);
    }
}
