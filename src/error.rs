//! Deku - Error types
//!
//! Game-state anomalies (illegal moves, missing kings, expired deadlines)
//! degrade to booleans and scores. These errors cover the construction and
//! configuration boundaries only.

use std::path::PathBuf;

use thiserror::Error;

use crate::board::Move;
use crate::types::{Color, Piece};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid piece value {value} at file {file}, rank {rank}")]
    InvalidPiece { file: u8, rank: u8, value: Piece },

    #[error("layout holds more than one {0} king")]
    DuplicateKing(Color),

    #[error("coordinates ({file}, {rank}) are off the board")]
    OutOfBounds { file: i32, rank: i32 },

    #[error("cannot parse square {0:?}")]
    BadSquare(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("{mv} is not a legal move for {side}")]
    Illegal { mv: Move, side: Color },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
