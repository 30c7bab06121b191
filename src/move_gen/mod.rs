mod king;
mod leaping_pieces;
mod pawn;
mod sliding_pieces;

use arrayvec::ArrayVec;

use crate::moves::Move;
use crate::position::attacks::{BISHOP_DIRECTIONS, KNIGHT_OFFSETS, ROOK_DIRECTIONS};
use crate::position::{Piece, Position, PositionError};
use crate::square::Square;

/// Moves of a single piece. A queen in the open has the most, at 27.
pub type PieceMoves = ArrayVec<Move, 32>;

#[derive(thiserror::Error, Debug)]
pub enum MoveGenError {
    #[error("no piece at {0}")]
    NoPiece(Square),

    #[error("invalid board state: {0}")]
    InvalidBoardState(String),

    #[error("no legal move {src} -> {dest}")]
    IllegalMove { src: Square, dest: Square },

    #[error("simulating move: {0}")]
    Position(#[from] PositionError),
}

/// Pseudo-legal moves of the piece on `square`, whichever side it belongs to.
pub fn gen_piece_moves(position: &Position, square: Square) -> Result<PieceMoves, MoveGenError> {
    let board_piece = position
        .piece_at(square)
        .ok_or(MoveGenError::NoPiece(square))?;

    let mut moves = PieceMoves::new();
    match board_piece.piece {
        Piece::Pawn => pawn::gen_pawn_moves(position, board_piece, &mut moves)?,
        Piece::Knight => {
            leaping_pieces::gen_leaping_moves(position, board_piece, &KNIGHT_OFFSETS[..], &mut moves)
        }
        Piece::Bishop => {
            sliding_pieces::gen_sliding_moves(position, board_piece, &BISHOP_DIRECTIONS[..], &mut moves)
        }
        Piece::Rook => {
            sliding_pieces::gen_sliding_moves(position, board_piece, &ROOK_DIRECTIONS[..], &mut moves)
        }
        Piece::Queen => {
            sliding_pieces::gen_sliding_moves(position, board_piece, &ROOK_DIRECTIONS[..], &mut moves);
            sliding_pieces::gen_sliding_moves(position, board_piece, &BISHOP_DIRECTIONS[..], &mut moves);
        }
        Piece::King => king::gen_king_moves(position, board_piece, &mut moves),
    }
    Ok(moves)
}

/// Pseudo-legal moves of every piece of the side to move.
pub fn gen_pseudo_legal_moves(position: &Position) -> Result<Vec<Move>, MoveGenError> {
    let mut moves = Vec::with_capacity(64);
    for &square in position.squares_of(position.to_move()) {
        moves.extend(gen_piece_moves(position, square)?);
    }
    Ok(moves)
}

/// Pseudo-legal moves that don't leave the mover's king in check, found by playing
/// each one on a copy.
pub fn gen_legal_moves(position: &Position) -> Result<Vec<Move>, MoveGenError> {
    let side = position.to_move();
    let mut legal = Vec::new();
    for mve in gen_pseudo_legal_moves(position)? {
        if !position.apply_move(mve)?.is_in_check(side) {
            legal.push(mve);
        }
    }
    Ok(legal)
}

/// Resolves a coordinate move, such as one read from a driver, to the flagged legal move.
pub fn find_legal_move(
    position: &Position,
    src: Square,
    dest: Square,
    promotion: Option<Piece>,
) -> Result<Move, MoveGenError> {
    gen_legal_moves(position)?
        .into_iter()
        .find(|mve| mve.src == src && mve.dest == dest && mve.promotion() == promotion)
        .ok_or(MoveGenError::IllegalMove { src, dest })
}
