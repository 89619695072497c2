//! Deku - Rule Updater
//!
//! After a piece has been relocated the whole grid is re-examined against the
//! snapshot of the previous grid, and every derived flag is recomputed:
//!
//! 1. en passant eligibility expires (or the pawn is removed if it was just
//!    taken en passant) and is granted to a pawn that just advanced two squares
//! 2. pawns on the last rank become queens
//! 3. a castling king drags its rook along; moved kings and rooks lose their
//!    castling status
//! 4. piece counts, the half-move clock and the fifty-move draw
//! 5. both check flags, from scratch

use crate::board::Board;
use crate::move_generator::MoveGenerator;
use crate::types::*;

/// King file at the start of the game
const KING_FILE: u8 = 4;

/// (king destination file, rook origin file, rook destination file)
const CASTLES: [(u8, u8, u8); 2] = [(6, 7, 5), (2, 0, 3)];

/// Plies without capture or pawn move that draw the game
pub const FIFTY_MOVE_PLIES: u32 = 100;

impl Board {
    /// Re-derive all flags after a raw relocation. The grid must already
    /// hold the moved piece and `previous` the grid before the move.
    pub(crate) fn update_rules(&mut self) {
        self.resolve_en_passant();
        self.promote_pawns();
        self.resolve_castling();

        let pawn_moved = self.pawn_moved();
        let (white_before, black_before) = (self.white_pieces, self.black_pieces);
        self.count_pieces();

        let captured = self.white_pieces < white_before || self.black_pieces < black_before;
        if pawn_moved || captured {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if self.halfmove_clock >= FIFTY_MOVE_PLIES {
            self.draw = true;
        }

        self.update_checks();
    }

    fn resolve_en_passant(&mut self) {
        // Eligibility granted last ply expires now. If an enemy pawn has just
        // stepped onto the square behind, the pawn was taken en passant.
        for sq in Square::all() {
            let piece = self.piece_at(sq);
            if magnitude(piece) != EN_PASSANT_PAWN {
                continue;
            }
            let Some(color) = color_of(piece) else { continue };
            let taken = sq.offset(0, -color.forward()).is_some_and(|behind| {
                let capturer = self.piece_at(behind);
                is_pawn(capturer) && is_enemy(capturer, color) && self.previous_piece_at(behind) == EMPTY
            });
            self.set(sq, if taken { EMPTY } else { colored(PAWN, color) });
        }

        for color in [Color::White, Color::Black] {
            let pawn = colored(PAWN, color);
            let origin_rank = color.pawn_rank();
            let target_rank = (origin_rank as i8 + 2 * color.forward()) as u8;

            for file in 0..8u8 {
                let origin = Square::new(file, origin_rank);
                let target = Square::new(file, target_rank);
                if self.piece_at(target) == pawn
                    && self.previous_piece_at(target) == EMPTY
                    && self.previous_piece_at(origin) == pawn
                    && self.piece_at(origin) == EMPTY
                {
                    self.set(target, colored(EN_PASSANT_PAWN, color));
                }
            }
        }
    }

    fn promote_pawns(&mut self) {
        // No underpromotion
        for color in [Color::White, Color::Black] {
            for file in 0..8u8 {
                let sq = Square::new(file, color.promotion_rank());
                let piece = self.piece_at(sq);
                if is_pawn(piece) && is_color(piece, color) {
                    self.set(sq, colored(QUEEN, color));
                }
            }
        }
    }

    fn resolve_castling(&mut self) {
        for color in [Color::White, Color::Black] {
            let home = color.home_rank();
            let king = colored(CASTLE_KING, color);
            let king_home = Square::new(KING_FILE, home);

            if self.previous_piece_at(king_home) == king && self.piece_at(king_home) == EMPTY {
                for (king_file, rook_from, rook_to) in CASTLES {
                    let landing = Square::new(king_file, home);
                    let rook_square = Square::new(rook_from, home);
                    if self.piece_at(landing) == king
                        && self.previous_piece_at(landing) == EMPTY
                        && self.piece_at(rook_square) == colored(CASTLE_ROOK, color)
                    {
                        self.set(rook_square, EMPTY);
                        self.set(Square::new(rook_to, home), colored(ROOK, color));
                    }
                }
            }
        }

        for sq in Square::all() {
            let piece = self.piece_at(sq);
            let Some(color) = color_of(piece) else { continue };
            let home = color.home_rank();
            match magnitude(piece) {
                CASTLE_KING if sq != Square::new(KING_FILE, home) => {
                    self.set(sq, colored(KING, color));
                }
                CASTLE_ROOK if sq.rank != home || (sq.file != 0 && sq.file != 7) => {
                    self.set(sq, colored(ROOK, color));
                }
                _ => {}
            }
        }
    }

    /// A pawn moved (or was removed) if some square that held a pawn no
    /// longer holds a pawn of the same color.
    fn pawn_moved(&self) -> bool {
        Square::all().any(|sq| {
            let before = self.previous_piece_at(sq);
            let now = self.piece_at(sq);
            is_pawn(before) && !(is_pawn(now) && now.signum() == before.signum())
        })
    }

    pub(crate) fn count_pieces(&mut self) {
        let mut white = 0;
        let mut black = 0;
        for sq in Square::all() {
            match color_of(self.piece_at(sq)) {
                Some(Color::White) => white += 1,
                Some(Color::Black) => black += 1,
                None => {}
            }
        }
        self.white_pieces = white;
        self.black_pieces = black;
    }

    pub(crate) fn update_checks(&mut self) {
        let generator = MoveGenerator::new();
        self.white_in_check = self
            .find_king(Color::White)
            .is_some_and(|king| generator.is_square_attacked(self, king, Color::Black));
        self.black_in_check = self
            .find_king(Color::Black)
            .is_some_and(|king| generator.is_square_attacked(self, king, Color::White));
    }
}
