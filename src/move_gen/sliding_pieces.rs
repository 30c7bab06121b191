use crate::moves::Move;
use crate::position::{BoardPiece, Position};

use super::PieceMoves;

/// Walks each ray until the board edge or the first occupied tile, which is
/// captured if it holds an opposing piece.
pub(super) fn gen_sliding_moves(
    position: &Position,
    piece: BoardPiece,
    directions: &[(i8, i8)],
    moves: &mut PieceMoves,
) {
    for &(d_row, d_column) in directions {
        for dest in piece.square.ray(d_row, d_column) {
            match position.piece_at(dest) {
                None => moves.push(Move::quiet(piece.square, dest)),
                Some(target) => {
                    if target.side != piece.side {
                        moves.push(Move::capture(piece.square, dest));
                    }
                    break;
                }
            }
        }
    }
}
