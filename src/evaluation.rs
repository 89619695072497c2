//! Deku - Position Evaluation Module
//!
//! Static evaluation of a position for one side:
//! - Draws score zero
//! - A missing king is a terminal win or loss
//! - Material
//! - Mobility (one point per reachable or attacked square)
//! - The value of a piece captured on the last move

use crate::board::{Board, Move};
use crate::move_generator::MoveGenerator;
use crate::types::*;

/// Score of a won position (opponent's king gone)
pub const MATE_SCORE: i32 = 1000;

// ============================================================================
// PIECE VALUES
// ============================================================================

/// Material weight indexed by piece magnitude
pub const PIECE_VALUES: [i32; 10] = [
    0,  // EMPTY
    2,  // PAWN
    2,  // EN_PASSANT_PAWN
    14, // ROOK
    14, // CASTLE_ROOK
    8,  // KNIGHT
    13, // BISHOP
    27, // QUEEN
    0,  // KING
    0,  // CASTLE_KING
];

/// Material weight of a piece, regardless of color
#[inline]
pub fn piece_value(piece: Piece) -> i32 {
    PIECE_VALUES[magnitude(piece) as usize]
}

/// Number of squares the piece on `sq` can move to or capture on
fn count_mobility(
    generator: &MoveGenerator,
    board: &Board,
    sq: Square,
    buffer: &mut Vec<Move>,
) -> i32 {
    buffer.clear();
    generator.generate_piece_moves(board, sq, buffer);
    buffer.len() as i32
}

// ============================================================================
// MAIN EVALUATION FUNCTION
// ============================================================================

/// Evaluate the position from `perspective`'s point of view (positive means
/// `perspective` is better)
pub fn evaluate(board: &Board, perspective: Color) -> i32 {
    if board.is_draw() {
        return 0;
    }

    if board.find_king(!perspective).is_none() {
        return MATE_SCORE;
    }
    if board.find_king(perspective).is_none() {
        return -MATE_SCORE;
    }

    let generator = MoveGenerator::new();
    let mut buffer = Vec::with_capacity(32);
    let mut score = 0;

    for sq in Square::all() {
        let piece = board.piece_at(sq);
        let Some(owner) = color_of(piece) else { continue };

        let mut term = piece_value(piece) + count_mobility(&generator, board, sq, &mut buffer);

        // Bonus for the piece that just captured on this square
        let before = board.previous_piece_at(sq);
        if is_enemy(before, owner) {
            term += piece_value(before);
        }

        if owner == perspective {
            score += term;
        } else {
            score -= term;
        }
    }

    score
}
