//! Deku - Board Representation Module
//!
//! The board is a plain value: a fixed 8x8 grid, the grid as it stood one
//! ply earlier, and the flags derived from both. Copying a board produces a
//! fully independent position, so every search branch owns its own.
//!
//! The only way to change a board is the move executor (`try_move` /
//! `attempt_move`), which validates the move, relocates the piece and runs
//! the rule updater in `rules.rs`.

use std::fmt;

use tracing::trace;

use crate::error::{BoardError, MoveError};
use crate::move_generator::MoveGenerator;
use crate::types::*;

/// Back rank configuration from the a-file to the h-file
const BACK_RANK: [Piece; 8] = [
    CASTLE_ROOK,
    KNIGHT,
    BISHOP,
    QUEEN,
    CASTLE_KING,
    BISHOP,
    KNIGHT,
    CASTLE_ROOK,
];

/// A move: the square a piece leaves and the square it lands on.
///
/// Captures, castling, en passant and promotion are all recovered by the
/// rule updater from the position, so nothing else is carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Parse coordinate notation ("e2e4")
    pub fn parse(text: &str) -> Result<Self, BoardError> {
        if text.len() != 4 || !text.is_ascii() {
            return Err(BoardError::BadSquare(text.to_string()));
        }
        Ok(Move::new(Square::parse(&text[..2])?, Square::parse(&text[2..])?))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Chess board representation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    /// Piece grid indexed `[file][rank]`
    pub(crate) grid: Layout,
    /// The grid as it stood before the last executed move
    pub(crate) previous: Layout,
    /// True if it's white's turn
    pub(crate) white_to_move: bool,
    /// Plies since the last capture or pawn move (for 50-move rule)
    pub(crate) halfmove_clock: u32,
    /// Set once a draw is reached; never cleared for this position
    pub(crate) draw: bool,
    pub(crate) white_in_check: bool,
    pub(crate) black_in_check: bool,
    pub(crate) white_pieces: u8,
    pub(crate) black_pieces: u8,
}

impl Board {
    /// Create a new board with the starting position
    pub fn new() -> Self {
        let mut grid = [[EMPTY; 8]; 8];
        for (file, column) in grid.iter_mut().enumerate() {
            column[0] = BACK_RANK[file];
            column[1] = PAWN;
            column[6] = -PAWN;
            column[7] = -BACK_RANK[file];
        }

        Board {
            grid,
            previous: grid,
            white_to_move: true,
            halfmove_clock: 0,
            draw: false,
            white_in_check: false,
            black_in_check: false,
            white_pieces: 16,
            black_pieces: 16,
        }
    }

    /// Create a board from an explicit layout.
    ///
    /// Piece counts and check flags are derived immediately; the half-move
    /// clock starts at zero.
    pub fn from_layout(layout: Layout, to_move: Color) -> Result<Self, BoardError> {
        let mut white_kings = 0;
        let mut black_kings = 0;

        for sq in Square::all() {
            let value = layout[sq.file as usize][sq.rank as usize];
            if !(-CASTLE_KING..=CASTLE_KING).contains(&value) {
                return Err(BoardError::InvalidPiece {
                    file: sq.file,
                    rank: sq.rank,
                    value,
                });
            }
            if is_king(value) {
                match color_of(value) {
                    Some(Color::White) => white_kings += 1,
                    _ => black_kings += 1,
                }
            }
        }

        if white_kings > 1 {
            return Err(BoardError::DuplicateKing(Color::White));
        }
        if black_kings > 1 {
            return Err(BoardError::DuplicateKing(Color::Black));
        }

        let mut board = Board {
            grid: layout,
            previous: layout,
            white_to_move: to_move == Color::White,
            halfmove_clock: 0,
            draw: false,
            white_in_check: false,
            black_in_check: false,
            white_pieces: 0,
            black_pieces: 0,
        };
        board.count_pieces();
        board.update_checks();

        Ok(board)
    }

    /// Piece on a square
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.grid[sq.file as usize][sq.rank as usize]
    }

    /// Piece that stood on a square before the last move
    #[inline]
    pub fn previous_piece_at(&self, sq: Square) -> Piece {
        self.previous[sq.file as usize][sq.rank as usize]
    }

    #[inline]
    pub(crate) fn set(&mut self, sq: Square, piece: Piece) {
        self.grid[sq.file as usize][sq.rank as usize] = piece;
    }

    /// Raw piece grid, indexed `[file][rank]`, for rendering
    pub fn grid(&self) -> &Layout {
        &self.grid
    }

    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Returns true if it is white's turn
    pub fn is_white_turn(&self) -> bool {
        self.white_to_move
    }

    pub fn in_check(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_in_check,
            Color::Black => self.black_in_check,
        }
    }

    pub fn is_white_in_check(&self) -> bool {
        self.white_in_check
    }

    pub fn is_black_in_check(&self) -> bool {
        self.black_in_check
    }

    pub fn piece_count(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white_pieces,
            Color::Black => self.black_pieces,
        }
    }

    /// Plies since the last capture or pawn move
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn is_draw(&self) -> bool {
        self.draw
    }

    /// Mark the position drawn, e.g. by repetition
    pub(crate) fn declare_draw(&mut self) {
        self.draw = true;
    }

    /// Find the king's square for the specified color
    pub fn find_king(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| {
            let piece = self.piece_at(sq);
            is_king(piece) && is_color(piece, color)
        })
    }

    /// Execute a move for the side to move.
    ///
    /// The move must be legal for the side to move; otherwise the board is
    /// left untouched.
    pub fn try_move(&mut self, mv: Move) -> Result<(), MoveError> {
        let side = self.side_to_move();
        let legal = MoveGenerator::new().generate_legal_moves(self, side);
        if !legal.contains(&mv) {
            trace!(%mv, %side, "rejected move");
            return Err(MoveError::Illegal { mv, side });
        }
        self.apply_unchecked(mv);
        Ok(())
    }

    /// Performs a move; returns true if it was made, false otherwise
    pub fn attempt_move(&mut self, from: Square, to: Square) -> bool {
        self.try_move(Move::new(from, to)).is_ok()
    }

    /// Relocate a piece and re-derive every flag, without validating the
    /// move. Callers inside the crate use this on moves taken from the
    /// generator.
    pub(crate) fn apply_unchecked(&mut self, mv: Move) {
        self.previous = self.grid;
        let piece = self.piece_at(mv.from);
        self.set(mv.to, piece);
        self.set(mv.from, EMPTY);
        self.update_rules();
        self.white_to_move = !self.white_to_move;
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  +---+---+---+---+---+---+---+---+")?;
        for rank in (0..8u8).rev() {
            write!(f, "{} |", rank + 1)?;
            for file in 0..8u8 {
                match piece_to_char(self.piece_at(Square::new(file, rank))) {
                    Some(c) => write!(f, " {} |", c)?,
                    None => write!(f, "   |")?,
                }
            }
            writeln!(f)?;
            writeln!(f, "  +---+---+---+---+---+---+---+---+")?;
        }
        write!(f, "    a   b   c   d   e   f   g   h")
    }
}
