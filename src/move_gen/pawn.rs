use crate::moves::{Move, MoveFlag};
use crate::position::{BoardPiece, Piece, Position};
use crate::square::Square;

use super::{MoveGenError, PieceMoves};

const PROMOTION_FLAGS: [MoveFlag; 4] = [
    MoveFlag::KnightPromotion,
    MoveFlag::BishopPromotion,
    MoveFlag::RookPromotion,
    MoveFlag::QueenPromotion,
];

const PROMOTION_CAPTURE_FLAGS: [MoveFlag; 4] = [
    MoveFlag::KnightPromotionCapture,
    MoveFlag::BishopPromotionCapture,
    MoveFlag::RookPromotionCapture,
    MoveFlag::QueenPromotionCapture,
];

/// Pushes `src -> dest`, fanned out into the four promotion choices when `dest`
/// is on the last rank.
fn push_pawn_move(pawn: BoardPiece, dest: Square, capture: bool, moves: &mut PieceMoves) {
    if dest.row() == pawn.side.promotion_row() {
        let flags = if capture {
            PROMOTION_CAPTURE_FLAGS
        } else {
            PROMOTION_FLAGS
        };
        moves.extend(flags.map(|flag| Move::new(pawn.square, dest, flag)));
    } else {
        let flag = if capture {
            MoveFlag::Capture
        } else {
            MoveFlag::Quiet
        };
        moves.push(Move::new(pawn.square, dest, flag));
    }
}

pub(super) fn gen_pawn_moves(
    position: &Position,
    pawn: BoardPiece,
    moves: &mut PieceMoves,
) -> Result<(), MoveGenError> {
    let side = pawn.side;
    let src = pawn.square;

    // A pawn can't stand on either back rank. Every forward step below relies on this.
    let forward = match src.forward(side) {
        Some(forward) if src.row() != side.back_row() => forward,
        _ => {
            return Err(MoveGenError::InvalidBoardState(format!(
                "{} pawn on back rank square {}",
                side, src
            )))
        }
    };

    if position.piece_at(forward).is_none() {
        push_pawn_move(pawn, forward, false, moves);

        if src.row() == side.pawn_start_row() {
            if let Some(double) = forward.forward(side) {
                if position.piece_at(double).is_none() {
                    moves.push(Move::new(src, double, MoveFlag::DoublePawnPush));
                }
            }
        }
    }

    let can_en_passant = position.to_move() == side && src.row() == side.en_passant_row();
    for d_column in [-1, 1] {
        let Some(dest) = src.offset(side.forward_rows(), d_column) else {
            continue;
        };
        match position.piece_at(dest) {
            Some(target) if target.side != side => push_pawn_move(pawn, dest, true, moves),
            None if can_en_passant && position.en_passant_file() == Some(dest.column()) => {
                // The pawn that just pushed twice stands beside this one.
                let victim_present = src
                    .offset(0, d_column)
                    .is_some_and(|sq| position.is_piece_at(sq, Piece::Pawn, side.opposite_side()));
                if victim_present {
                    moves.push(Move::new(src, dest, MoveFlag::EnPassant));
                }
            }
            _ => {}
        }
    }

    Ok(())
}
