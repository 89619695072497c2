//! Deku - Type definitions and constants
//!
//! Pieces are small signed integers: the sign is the color (positive for
//! White, negative for Black) and the magnitude is the piece type, with two
//! extra magnitudes carrying special status (en passant eligible pawn,
//! castle eligible rook and king).

use std::fmt;

use crate::error::BoardError;

/// A piece value on the grid. Zero is an empty square.
pub type Piece = i8;

/// A full 8x8 grid indexed `[file][rank]`.
pub type Layout = [[Piece; 8]; 8];

/// Piece magnitudes
pub const EMPTY: Piece = 0;
pub const PAWN: Piece = 1;
pub const EN_PASSANT_PAWN: Piece = 2;
pub const ROOK: Piece = 3;
pub const CASTLE_ROOK: Piece = 4;
pub const KNIGHT: Piece = 5;
pub const BISHOP: Piece = 6;
pub const QUEEN: Piece = 7;
pub const KING: Piece = 8;
pub const CASTLE_KING: Piece = 9;

/// File and rank names for algebraic notation
pub const FILE_NAMES: &[u8; 8] = b"abcdefgh";
pub const RANK_NAMES: &[u8; 8] = b"12345678";

/// The two sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// +1 for White, -1 for Black.
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank holding this side's king and rooks at the start.
    #[inline]
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank pawns of this side start on.
    #[inline]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank on which pawns of this side promote.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Rank step of a pawn advance.
    #[inline]
    pub const fn forward(self) -> i8 {
        self.sign()
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Extract the magnitude (type and status) of a piece
#[inline]
pub fn magnitude(piece: Piece) -> Piece {
    piece.abs()
}

/// Color of a piece, `None` for an empty square
#[inline]
pub fn color_of(piece: Piece) -> Option<Color> {
    match piece.signum() {
        1 => Some(Color::White),
        -1 => Some(Color::Black),
        _ => None,
    }
}

/// Check if the piece belongs to `color`
#[inline]
pub fn is_color(piece: Piece, color: Color) -> bool {
    piece != EMPTY && piece.signum() == color.sign()
}

/// Check if the piece is an opponent of `color`
#[inline]
pub fn is_enemy(piece: Piece, color: Color) -> bool {
    piece != EMPTY && piece.signum() == -color.sign()
}

#[inline]
pub fn is_pawn(piece: Piece) -> bool {
    matches!(magnitude(piece), PAWN | EN_PASSANT_PAWN)
}

#[inline]
pub fn is_king(piece: Piece) -> bool {
    matches!(magnitude(piece), KING | CASTLE_KING)
}

/// Signed piece value for a color
#[inline]
pub const fn colored(magnitude: Piece, color: Color) -> Piece {
    magnitude * color.sign()
}

/// Piece value to diagram character (uppercase White, lowercase Black)
pub fn piece_to_char(piece: Piece) -> Option<char> {
    let c = match magnitude(piece) {
        PAWN | EN_PASSANT_PAWN => 'p',
        ROOK | CASTLE_ROOK => 'r',
        KNIGHT => 'n',
        BISHOP => 'b',
        QUEEN => 'q',
        KING | CASTLE_KING => 'k',
        _ => return None,
    };
    if piece > 0 {
        Some(c.to_ascii_uppercase())
    } else {
        Some(c)
    }
}

/// A board coordinate, file and rank each in `0..8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub file: u8,
    pub rank: u8,
}

impl Square {
    /// Create a square from coordinates known to be on the board.
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square { file, rank }
    }

    /// Create a square from raw coordinates, e.g. a mouse position.
    pub fn try_new(file: i32, rank: i32) -> Result<Self, BoardError> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Ok(Square::new(file as u8, rank as u8))
        } else {
            Err(BoardError::OutOfBounds { file, rank })
        }
    }

    /// Square displaced by `(df, dr)`, `None` when it leaves the board
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file as i8 + df;
        let rank = self.rank as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Parse algebraic notation ("e4")
    pub fn parse(name: &str) -> Result<Self, BoardError> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return Err(BoardError::BadSquare(name.to_string()));
        }
        let file = match bytes[0] {
            b'a'..=b'h' => bytes[0] - b'a',
            _ => return Err(BoardError::BadSquare(name.to_string())),
        };
        let rank = match bytes[1] {
            b'1'..=b'8' => bytes[1] - b'1',
            _ => return Err(BoardError::BadSquare(name.to_string())),
        };
        Ok(Square::new(file, rank))
    }

    /// All 64 squares in file-major, rank-minor order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|file| (0..8u8).map(move |rank| Square::new(file, rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            FILE_NAMES[self.file as usize] as char,
            RANK_NAMES[self.rank as usize] as char
        )
    }
}
