//! Deku - Position history
//!
//! Zobrist hashing of positions and a table counting how often each
//! position occurred, for the threefold repetition rule. The table lives
//! outside the board so that boards stay small, copyable values.

use std::collections::HashMap;

use rand::prelude::*;

use crate::board::Board;
use crate::types::*;

/// Number of distinct piece values (-9..=9)
const PIECE_KINDS: usize = 19;

/// Occurrences of a position that draw the game
pub const REPETITION_LIMIT: u32 = 3;

pub struct ZobristHash {
    piece_keys: [[u64; 64]; PIECE_KINDS],
    side_key: u64,
}

impl ZobristHash {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(12345);

        let mut piece_keys = [[0u64; 64]; PIECE_KINDS];
        for keys in piece_keys.iter_mut() {
            for key in keys.iter_mut() {
                *key = rng.gen();
            }
        }

        let side_key = rng.gen();

        ZobristHash { piece_keys, side_key }
    }

    /// Hash the grid and the side to move. Castling and en passant rights
    /// are part of the piece values, so they are covered too.
    pub fn hash_position(&self, board: &Board) -> u64 {
        let mut h = 0u64;

        for (index, sq) in Square::all().enumerate() {
            let piece = board.piece_at(sq);
            if piece != EMPTY {
                h ^= self.piece_keys[(piece + CASTLE_KING) as usize][index];
            }
        }

        if !board.is_white_turn() {
            h ^= self.side_key;
        }

        h
    }
}

impl Default for ZobristHash {
    fn default() -> Self {
        ZobristHash::new()
    }
}

/// Position hash to occurrence count
#[derive(Default)]
pub struct RepetitionTable {
    zobrist: ZobristHash,
    counts: HashMap<u64, u32>,
}

impl RepetitionTable {
    pub fn new() -> Self {
        RepetitionTable::default()
    }

    /// Count one more occurrence of `board`; returns the new count
    pub fn record(&mut self, board: &Board) -> u32 {
        let count = self.counts.entry(self.zobrist.hash_position(board)).or_insert(0);
        *count += 1;
        *count
    }

    /// How many times `board` has been recorded
    pub fn occurrences(&self, board: &Board) -> u32 {
        self.counts
            .get(&self.zobrist.hash_position(board))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_repetition(&self, board: &Board) -> bool {
        self.occurrences(board) >= REPETITION_LIMIT
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
