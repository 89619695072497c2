//! Deku - Chess engine core
//!
//! A mailbox chess engine built around a copyable board value:
//! - Signed piece codes that carry castling and en passant status
//! - Legal move generation with check, castling and en passant rules
//! - Material, mobility and capture evaluation
//! - Iterative deepening minimax with alpha-beta pruning under a deadline
//! - Optional root-split search on a thread pool
//! - Threefold repetition tracking with Zobrist hashing

pub mod types;
pub mod error;
pub mod board;
pub mod rules;
pub mod move_generator;
pub mod evaluation;
pub mod search;
pub mod parallel_search;
pub mod history;
pub mod config;
pub mod agent;
pub mod game;

pub use agent::Agent;
pub use board::{Board, Move};
pub use config::AgentConfig;
pub use error::{BoardError, ConfigError, MoveError};
pub use game::Game;
pub use move_generator::{GameStatus, MoveGenerator};
pub use types::{Color, Square};
