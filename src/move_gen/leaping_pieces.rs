use crate::moves::Move;
use crate::position::{BoardPiece, Position};
use crate::square::Square;

use super::PieceMoves;

/// Quiet move onto an empty tile, capture onto an opposing piece, nothing onto a friendly one.
pub(super) fn step_move(position: &Position, piece: BoardPiece, dest: Square) -> Option<Move> {
    match position.piece_at(dest) {
        None => Some(Move::quiet(piece.square, dest)),
        Some(target) if target.side != piece.side => Some(Move::capture(piece.square, dest)),
        Some(_) => None,
    }
}

/// Single hops by each of `offsets`. Used for knights and the king's one-step moves.
pub(super) fn gen_leaping_moves(
    position: &Position,
    piece: BoardPiece,
    offsets: &[(i8, i8)],
    moves: &mut PieceMoves,
) {
    let leaps = offsets
        .iter()
        .filter_map(|&(d_row, d_column)| piece.square.offset(d_row, d_column))
        .filter_map(|dest| step_move(position, piece, dest));
    moves.extend(leaps);
}
