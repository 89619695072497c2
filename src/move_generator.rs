//! Deku - Move Generator Module
//!
//! Pseudo-legal generation follows piece movement shapes only. Legal
//! generation filters those candidates by playing each one on a copy of the
//! board and dropping any that leave the mover's king attacked.

use crate::board::{Board, Move};
use crate::types::*;

/// Direction offsets (file, rank) for sliding pieces
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KING_DIRECTIONS: [(i8, i8); 8] = QUEEN_DIRECTIONS;
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Outcome of a position for the side to move
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    /// The given side has been checkmated
    Checkmate(Color),
    Stalemate,
    Draw,
}

/// Move generator for chess positions
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    /// Create a new move generator
    pub const fn new() -> Self {
        MoveGenerator
    }

    /// Generate all legal moves for `color`
    pub fn generate_legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let pseudo_legal = self.generate_pseudo_legal_moves(board, color);
        let mut legal_moves = Vec::with_capacity(pseudo_legal.len());

        for mv in pseudo_legal {
            if self.is_legal(board, mv, color) {
                legal_moves.push(mv);
            }
        }

        legal_moves
    }

    /// Generate all pseudo-legal moves for `color` (may leave its king in
    /// check), scanning the board file by file
    pub fn generate_pseudo_legal_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);

        for sq in Square::all() {
            if is_color(board.piece_at(sq), color) {
                self.generate_piece_moves(board, sq, &mut moves);
            }
        }

        moves
    }

    /// Generate the moves of the piece standing on `sq`
    pub fn generate_piece_moves(&self, board: &Board, sq: Square, moves: &mut Vec<Move>) {
        let piece = board.piece_at(sq);
        let Some(color) = color_of(piece) else { return };

        match magnitude(piece) {
            PAWN | EN_PASSANT_PAWN => self.generate_pawn_moves(board, sq, color, moves),
            ROOK | CASTLE_ROOK => self.generate_sliding_moves(board, sq, color, &ROOK_DIRECTIONS, moves),
            KNIGHT => self.generate_step_moves(board, sq, color, &KNIGHT_OFFSETS, moves),
            BISHOP => self.generate_sliding_moves(board, sq, color, &BISHOP_DIRECTIONS, moves),
            QUEEN => self.generate_sliding_moves(board, sq, color, &QUEEN_DIRECTIONS, moves),
            KING => self.generate_step_moves(board, sq, color, &KING_DIRECTIONS, moves),
            CASTLE_KING => {
                self.generate_step_moves(board, sq, color, &KING_DIRECTIONS, moves);
                self.generate_castling_moves(board, sq, color, moves);
            }
            _ => {}
        }
    }

    /// Generate pawn moves from the given square
    fn generate_pawn_moves(&self, board: &Board, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let forward = color.forward();

        // Single push, and double push from the starting rank
        if let Some(one) = sq.offset(0, forward) {
            if board.piece_at(one) == EMPTY {
                moves.push(Move::new(sq, one));

                if sq.rank == color.pawn_rank() {
                    if let Some(two) = one.offset(0, forward) {
                        if board.piece_at(two) == EMPTY {
                            moves.push(Move::new(sq, two));
                        }
                    }
                }
            }
        }

        // Captures, including en passant onto the square behind an eligible pawn
        for df in [-1, 1] {
            let Some(target) = sq.offset(df, forward) else { continue };
            let victim = board.piece_at(target);

            if is_enemy(victim, color) {
                moves.push(Move::new(sq, target));
            } else if victim == EMPTY {
                let Some(beside) = sq.offset(df, 0) else { continue };
                let passer = board.piece_at(beside);
                if magnitude(passer) == EN_PASSANT_PAWN && is_enemy(passer, color) {
                    moves.push(Move::new(sq, target));
                }
            }
        }
    }

    /// Generate single step moves (knight, king)
    fn generate_step_moves(
        &self,
        board: &Board,
        sq: Square,
        color: Color,
        offsets: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in offsets {
            if let Some(target) = sq.offset(df, dr) {
                if !is_color(board.piece_at(target), color) {
                    moves.push(Move::new(sq, target));
                }
            }
        }
    }

    /// Generate moves for sliding pieces (bishop, rook, queen)
    fn generate_sliding_moves(
        &self,
        board: &Board,
        sq: Square,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<Move>,
    ) {
        for &(df, dr) in directions {
            let mut current = sq;
            while let Some(next) = current.offset(df, dr) {
                let target = board.piece_at(next);

                if target == EMPTY {
                    moves.push(Move::new(sq, next));
                } else {
                    if is_enemy(target, color) {
                        moves.push(Move::new(sq, next));
                    }
                    break;
                }

                current = next;
            }
        }
    }

    /// Castling: the king slides two files toward a castle-eligible corner
    /// rook when every square between them is empty and the king is not in
    /// check.
    fn generate_castling_moves(&self, board: &Board, sq: Square, color: Color, moves: &mut Vec<Move>) {
        let home = color.home_rank();
        if sq != Square::new(4, home) || board.in_check(color) {
            return;
        }

        let rook = colored(CASTLE_ROOK, color);

        // Kingside (h-file rook)
        if board.piece_at(Square::new(7, home)) == rook
            && (5..7).all(|file| board.piece_at(Square::new(file, home)) == EMPTY)
        {
            moves.push(Move::new(sq, Square::new(6, home)));
        }

        // Queenside (a-file rook)
        if board.piece_at(Square::new(0, home)) == rook
            && (1..4).all(|file| board.piece_at(Square::new(file, home)) == EMPTY)
        {
            moves.push(Move::new(sq, Square::new(2, home)));
        }
    }

    /// Check if a square is attacked by the specified color
    pub fn is_square_attacked(&self, board: &Board, sq: Square, by: Color) -> bool {
        // Pawns attack diagonally forward, so look one rank behind the square
        for df in [-1, 1] {
            if let Some(from) = sq.offset(df, -by.forward()) {
                let piece = board.piece_at(from);
                if is_pawn(piece) && is_color(piece, by) {
                    return true;
                }
            }
        }

        for &(df, dr) in &KNIGHT_OFFSETS {
            if let Some(from) = sq.offset(df, dr) {
                if board.piece_at(from) == colored(KNIGHT, by) {
                    return true;
                }
            }
        }

        for &(df, dr) in &KING_DIRECTIONS {
            if let Some(from) = sq.offset(df, dr) {
                let piece = board.piece_at(from);
                if is_king(piece) && is_color(piece, by) {
                    return true;
                }
            }
        }

        for &direction in &ROOK_DIRECTIONS {
            if self.check_sliding_attack(board, sq, direction, by, &[ROOK, CASTLE_ROOK, QUEEN]) {
                return true;
            }
        }

        for &direction in &BISHOP_DIRECTIONS {
            if self.check_sliding_attack(board, sq, direction, by, &[BISHOP, QUEEN]) {
                return true;
            }
        }

        false
    }

    /// Check if the first piece along a ray is an attacking slider
    fn check_sliding_attack(
        &self,
        board: &Board,
        sq: Square,
        (df, dr): (i8, i8),
        by: Color,
        piece_types: &[Piece],
    ) -> bool {
        let mut current = sq;

        while let Some(next) = current.offset(df, dr) {
            let piece = board.piece_at(next);
            if piece != EMPTY {
                return is_color(piece, by) && piece_types.contains(&magnitude(piece));
            }
            current = next;
        }

        false
    }

    /// Check if a move is legal (doesn't leave own king in check)
    fn is_legal(&self, board: &Board, mv: Move, color: Color) -> bool {
        // A castling king may not pass through an attacked square
        let piece = board.piece_at(mv.from);
        if magnitude(piece) == CASTLE_KING && mv.from.file.abs_diff(mv.to.file) == 2 {
            let transit = Square::new((mv.from.file + mv.to.file) / 2, mv.from.rank);
            if self.is_square_attacked(board, transit, !color) {
                return false;
            }
        }

        let mut temp_board = *board;
        temp_board.apply_unchecked(mv);
        !temp_board.in_check(color)
    }

    /// Check if the side to move is in check
    pub fn is_in_check(&self, board: &Board) -> bool {
        board.in_check(board.side_to_move())
    }

    /// Check if the side to move is checkmated
    pub fn is_checkmate(&self, board: &Board) -> bool {
        self.is_in_check(board) && self.generate_legal_moves(board, board.side_to_move()).is_empty()
    }

    /// Check if the side to move is stalemated
    pub fn is_stalemate(&self, board: &Board) -> bool {
        !self.is_in_check(board) && self.generate_legal_moves(board, board.side_to_move()).is_empty()
    }

    /// Report the state of the game for the side to move
    pub fn status(&self, board: &Board) -> GameStatus {
        if board.is_draw() {
            return GameStatus::Draw;
        }
        let side = board.side_to_move();
        if !self.generate_legal_moves(board, side).is_empty() {
            GameStatus::Ongoing
        } else if board.in_check(side) {
            GameStatus::Checkmate(side)
        } else {
            GameStatus::Stalemate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::parse(name).unwrap()
    }

    fn mv(text: &str) -> Move {
        Move::parse(text).unwrap()
    }

    fn layout(pieces: &[(&str, Piece)]) -> Layout {
        let mut grid = [[EMPTY; 8]; 8];
        for (name, piece) in pieces {
            let s = sq(name);
            grid[s.file as usize][s.rank as usize] = *piece;
        }
        grid
    }

    #[test]
    fn test_startpos_moves() {
        let board = Board::new();
        let generator = MoveGenerator::new();
        assert_eq!(generator.generate_legal_moves(&board, Color::White).len(), 20);
        assert_eq!(generator.generate_legal_moves(&board, Color::Black).len(), 20);
        assert_eq!(generator.generate_pseudo_legal_moves(&board, Color::White).len(), 20);
    }

    #[test]
    fn test_scan_order() {
        let moves = MoveGenerator::new().generate_pseudo_legal_moves(&Board::new(), Color::White);
        // a-file first: a2a3, a2a4, then the b1 knight
        assert_eq!(moves[0], mv("a2a3"));
        assert_eq!(moves[1], mv("a2a4"));
        assert_eq!(moves[2], mv("b1c3"));
        assert_eq!(moves[3], mv("b1a3"));
    }

    #[test]
    fn test_knight_in_corner() {
        let board = Board::from_layout(layout(&[("a1", KNIGHT), ("e1", KING), ("e8", -KING)]), Color::White)
            .unwrap();
        let mut moves = Vec::new();
        MoveGenerator::new().generate_piece_moves(&board, sq("a1"), &mut moves);
        assert_eq!(moves, vec![mv("a1b3"), mv("a1c2")]);
    }

    #[test]
    fn test_sliders_include_enemy_blocker_only() {
        let grid = layout(&[("d4", ROOK), ("d6", -PAWN), ("f4", PAWN), ("a1", KING), ("h8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let mut moves = Vec::new();
        MoveGenerator::new().generate_piece_moves(&board, sq("d4"), &mut moves);
        assert!(moves.contains(&mv("d4d6")));
        assert!(!moves.contains(&mv("d4d7")));
        assert!(!moves.contains(&mv("d4f4")));
        assert!(moves.contains(&mv("d4e4")));
        // up 2, right 1, down 3, left 3
        assert_eq!(moves.len(), 9);
    }

    #[test]
    fn test_castling_generation() {
        let grid = layout(&[
            ("e1", CASTLE_KING),
            ("a1", CASTLE_ROOK),
            ("h1", CASTLE_ROOK),
            ("e8", -KING),
        ]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let moves = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        assert!(moves.contains(&mv("e1g1")));
        assert!(moves.contains(&mv("e1c1")));

        // A rook that lost castle status cannot castle
        let grid = layout(&[("e1", CASTLE_KING), ("h1", ROOK), ("e8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let moves = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        assert!(!moves.contains(&mv("e1g1")));

        // Blocked path
        let grid = layout(&[("e1", CASTLE_KING), ("a1", CASTLE_ROOK), ("b1", KNIGHT), ("e8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let moves = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        assert!(!moves.contains(&mv("e1c1")));
    }

    #[test]
    fn test_no_castling_out_of_or_through_check() {
        let grid = layout(&[("e1", CASTLE_KING), ("h1", CASTLE_ROOK), ("e8", -ROOK), ("a8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        assert!(board.is_white_in_check());
        let pseudo = MoveGenerator::new().generate_pseudo_legal_moves(&board, Color::White);
        assert!(!pseudo.contains(&mv("e1g1")));

        let grid = layout(&[("e1", CASTLE_KING), ("h1", CASTLE_ROOK), ("f8", -ROOK), ("a8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let generator = MoveGenerator::new();
        assert!(generator.generate_pseudo_legal_moves(&board, Color::White).contains(&mv("e1g1")));
        assert!(!generator.generate_legal_moves(&board, Color::White).contains(&mv("e1g1")));
    }

    #[test]
    fn test_en_passant_generation() {
        let grid = layout(&[("e5", PAWN), ("d5", -EN_PASSANT_PAWN), ("f5", -PAWN), ("a1", KING), ("h8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let moves = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        assert!(moves.contains(&mv("e5d6")));
        assert!(!moves.contains(&mv("e5f6")));
        assert!(moves.contains(&mv("e5e6")));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let grid = layout(&[("e1", KING), ("e2", BISHOP), ("e8", -ROOK), ("a8", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let generator = MoveGenerator::new();
        let pseudo = generator.generate_pseudo_legal_moves(&board, Color::White);
        let legal = generator.generate_legal_moves(&board, Color::White);
        assert!(pseudo.iter().any(|m| m.from == sq("e2")));
        assert!(legal.iter().all(|m| m.from != sq("e2")));
    }

    #[test]
    fn test_kings_never_touch() {
        let grid = layout(&[("e1", KING), ("e3", -KING)]);
        let board = Board::from_layout(grid, Color::White).unwrap();
        let legal = MoveGenerator::new().generate_legal_moves(&board, Color::White);
        assert!(!legal.contains(&mv("e1e2")));
        assert!(legal.contains(&mv("e1f1")));
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        let generator = MoveGenerator::new();

        // Back rank mate
        let grid = layout(&[("h8", -KING), ("g7", -PAWN), ("h7", -PAWN), ("a8", ROOK), ("g1", KING)]);
        let board = Board::from_layout(grid, Color::Black).unwrap();
        assert!(generator.is_checkmate(&board));
        assert_eq!(generator.status(&board), GameStatus::Checkmate(Color::Black));

        // King in the corner, queen covering every escape
        let grid = layout(&[("a8", -KING), ("c7", KING), ("b6", QUEEN)]);
        let board = Board::from_layout(grid, Color::Black).unwrap();
        assert!(generator.is_stalemate(&board));
        assert_eq!(generator.status(&board), GameStatus::Stalemate);

        assert_eq!(generator.status(&Board::new()), GameStatus::Ongoing);
    }
}
