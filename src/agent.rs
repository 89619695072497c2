//! Deku - Playing agent
//!
//! An agent plays one color. It searches the live board (sequentially or on
//! a worker pool, per its configuration) and commits the chosen move through
//! the board's move executor, so an agent can never play an illegal move.

use std::time::Duration;

use tracing::{info, warn};

use crate::board::{Board, Move};
use crate::config::AgentConfig;
use crate::parallel_search::ParallelSearchEngine;
use crate::search::{SearchEngine, SearchResult};
use crate::types::Color;

pub struct Agent {
    color: Color,
    config: AgentConfig,
    last_search: Option<SearchResult>,
}

impl Agent {
    pub fn new(color: Color, config: AgentConfig) -> Self {
        Agent {
            color,
            config,
            last_search: None,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Result of the most recent search, if any
    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }

    /// Search `board` for this agent's side without touching it
    pub fn choose_move(&self, board: &Board, budget: Duration) -> SearchResult {
        let depth_limit = self.config.depth_limit();
        if self.config.parallel {
            ParallelSearchEngine::new(self.color, depth_limit, self.config.worker_threads()).search(board, budget)
        } else {
            SearchEngine::new(self.color, depth_limit).search(board, budget)
        }
    }

    /// Search and play a move on `board` within `budget`. Returns the move
    /// played, or `None` when it is not this agent's turn or no legal move
    /// exists.
    pub fn make_move(&mut self, board: &mut Board, budget: Duration) -> Option<Move> {
        if board.side_to_move() != self.color {
            warn!(agent = %self.color, to_move = %board.side_to_move(), "not this agent's turn");
            return None;
        }

        let result = self.choose_move(board, budget);
        self.last_search = Some(result);

        let Some(mv) = result.best_move else {
            warn!(agent = %self.color, "no legal moves");
            return None;
        };

        match board.try_move(mv) {
            Ok(()) => {
                info!(
                    agent = %self.color,
                    mv = %mv,
                    score = result.score,
                    depth = result.depth,
                    nodes = result.nodes,
                    "move played"
                );
                Some(mv)
            }
            Err(err) => {
                warn!(agent = %self.color, %err, "search produced a rejected move");
                None
            }
        }
    }

    /// `make_move` with the configured time budget
    pub fn play(&mut self, board: &mut Board) -> Option<Move> {
        let budget = self.config.search_time();
        self.make_move(board, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generator::MoveGenerator;
    use crate::types::*;

    fn quick_config(parallel: bool) -> AgentConfig {
        AgentConfig {
            search_time_ms: 200,
            max_depth: Some(2),
            parallel,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_agent_plays_legal_move() {
        let mut board = Board::new();
        let legal = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        let mut agent = Agent::new(Color::White, quick_config(false));

        let mv = agent.play(&mut board).unwrap();
        assert!(legal.contains(&mv));
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(agent.last_search().and_then(|r| r.best_move), Some(mv));
    }

    #[test]
    fn test_agent_waits_for_its_turn() {
        let mut board = Board::new();
        let before = board;
        let mut agent = Agent::new(Color::Black, quick_config(false));
        assert_eq!(agent.play(&mut board), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_agent_without_moves() {
        let mut grid = [[EMPTY; 8]; 8];
        grid[0][7] = -KING; // a8
        grid[2][6] = KING; // c7
        grid[1][5] = QUEEN; // b6
        let mut board = Board::from_layout(grid, Color::Black).unwrap();
        let mut agent = Agent::new(Color::Black, quick_config(false));
        assert_eq!(agent.play(&mut board), None);
        assert_eq!(board.side_to_move(), Color::Black);
    }

    #[test]
    fn test_parallel_agent_plays() {
        let mut board = Board::new();
        let mut white = Agent::new(Color::White, quick_config(true));
        let mut black = Agent::new(Color::Black, quick_config(true));
        assert!(white.play(&mut board).is_some());
        assert!(black.play(&mut board).is_some());
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn test_zero_budget_agent_still_moves() {
        let mut board = Board::new();
        let mut agent = Agent::new(Color::White, AgentConfig::default());
        assert!(agent.make_move(&mut board, Duration::ZERO).is_some());
    }
}
