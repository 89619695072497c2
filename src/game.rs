//! Deku - Game session
//!
//! Wraps a board with its position history. Every committed move goes
//! through the board's executor and is then recorded; with the threefold
//! rule enabled, the third occurrence of a position draws the game.

use crate::agent::Agent;
use crate::board::{Board, Move};
use crate::error::MoveError;
use crate::history::{RepetitionTable, REPETITION_LIMIT};
use crate::move_generator::{GameStatus, MoveGenerator};
use crate::types::Square;

pub struct Game {
    board: Board,
    repetitions: RepetitionTable,
    threefold: bool,
    plies: u32,
}

impl Game {
    pub fn new(threefold: bool) -> Self {
        Game::from_board(Board::new(), threefold)
    }

    pub fn from_board(board: Board, threefold: bool) -> Self {
        let mut repetitions = RepetitionTable::new();
        repetitions.record(&board);
        Game {
            board,
            repetitions,
            threefold,
            plies: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Plies played in this game
    pub fn plies(&self) -> u32 {
        self.plies
    }

    pub fn try_move(&mut self, mv: Move) -> Result<(), MoveError> {
        self.board.try_move(mv)?;
        self.record();
        Ok(())
    }

    pub fn attempt_move(&mut self, from: Square, to: Square) -> bool {
        self.try_move(Move::new(from, to)).is_ok()
    }

    /// Let `agent` play its configured move, if it is its turn
    pub fn play_agent(&mut self, agent: &mut Agent) -> Option<Move> {
        let mv = agent.play(&mut self.board)?;
        self.record();
        Some(mv)
    }

    pub fn status(&self) -> GameStatus {
        MoveGenerator::new().status(&self.board)
    }

    pub fn is_over(&self) -> bool {
        self.status() != GameStatus::Ongoing
    }

    fn record(&mut self) {
        self.plies += 1;
        let seen = self.repetitions.record(&self.board);
        if self.threefold && seen >= REPETITION_LIMIT {
            self.board.declare_draw();
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(true)
    }
}
