use crate::position::{Piece, Position, Side};
use crate::square::Square;

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub(crate) const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(crate) const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

impl Position {
    /// Whether any piece of `by` could capture on `square` if an enemy stood there.
    pub fn is_square_attacked(&self, square: Square, by: Side) -> bool {
        // An attacking pawn sits one row behind the square, seen from `by`.
        let pawn_row = -by.forward_rows();
        let pawn_attack = [-1, 1].into_iter().any(|d_column| {
            square
                .offset(pawn_row, d_column)
                .is_some_and(|sq| self.is_piece_at(sq, Piece::Pawn, by))
        });
        if pawn_attack {
            return true;
        }

        let leaper_attack = |offsets: &[(i8, i8)], piece: Piece| {
            offsets.iter().any(|&(d_row, d_column)| {
                square
                    .offset(d_row, d_column)
                    .is_some_and(|sq| self.is_piece_at(sq, piece, by))
            })
        };
        if leaper_attack(&KNIGHT_OFFSETS[..], Piece::Knight) || leaper_attack(&KING_OFFSETS[..], Piece::King) {
            return true;
        }

        let slider_attack = |directions: &[(i8, i8)], slider: Piece| {
            directions.iter().any(|&(d_row, d_column)| {
                square
                    .ray(d_row, d_column)
                    .find_map(|sq| self.piece_at(sq))
                    .is_some_and(|bp| bp.side == by && (bp.piece == slider || bp.piece == Piece::Queen))
            })
        };
        slider_attack(&ROOK_DIRECTIONS[..], Piece::Rook) || slider_attack(&BISHOP_DIRECTIONS[..], Piece::Bishop)
    }

    /// Whether `side`'s king is attacked. A side without a king is never in check.
    pub fn is_in_check(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|king_square| self.is_square_attacked(king_square, side.opposite_side()))
    }
}
