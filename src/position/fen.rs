use std::str::FromStr;

use crate::position::{CastlingRights, Piece, Position, Side, State};
use crate::square::Square;
use crate::square::Square::*;

#[derive(thiserror::Error, Debug)]
pub enum FenParseError {
    #[error("num fields: want 6 got {0}")]
    NumFields(usize),

    #[error("piece placement: got {0}, err at {1}")]
    PiecePlacement(String, usize),

    #[error("side to move: want 'w'|'b' got {0}")]
    SideToMove(String),

    #[error("castling rights given: got {0}, err at idx {1}")]
    CastlingRights(String, usize),

    #[error("en passant target: got {0}")]
    EnPassantTarget(String),

    #[error("halfmove clock: want 0 <= x < 256 got {0}")]
    HalfmoveClock(String),

    #[error("full move counter: want 0 <= x < 65_535 got {0}")]
    FullMoveCounter(String),
}

impl Position {
    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        let fields = fen.split_whitespace().collect::<Vec<&str>>();

        if fields.len() != 6 {
            Err(FenParseError::NumFields(fields.len()))?
        }

        let mut position = pieces_from_fen(fields[0])?;

        let to_move = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            _ => Err(FenParseError::SideToMove(String::from(fields[1])))?,
        };

        let half_move_clock = fields[4]
            .parse::<u8>()
            .map_err(|_| FenParseError::HalfmoveClock(fields[4].to_string()))?;

        let full_move_counter = fields[5]
            .parse()
            .map_err(|_| FenParseError::FullMoveCounter(fields[5].to_string()))?;

        position.state = State {
            castling_rights: castling_rights_from_fen(fields[2])?,
            en_passant_file: en_passant_file_from_fen(fields[3], to_move)?,
            half_move_clock,
            to_move,
            full_move_counter,
        };
        if let Some(file) = position.state.en_passant_file {
            check_en_passant_pawn(&position, file, fields[3])?;
        }
        mark_castling_pieces(&mut position);

        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut pieces = String::with_capacity(64);
        let mut curr_empty_count = 0;

        for (idx, sq) in Square::list_white_perspective().into_iter().enumerate() {
            if let Some(board_piece) = self.piece_at(sq) {
                if curr_empty_count != 0 {
                    pieces += &curr_empty_count.to_string();
                    curr_empty_count = 0;
                }
                pieces.push(board_piece.to_char());
            } else {
                curr_empty_count += 1;
            }
            if (idx + 1) % 8 == 0 {
                if curr_empty_count != 0 {
                    pieces += &curr_empty_count.to_string();
                    curr_empty_count = 0;
                }
                if idx != 63 {
                    pieces += "/";
                }
            }
        }

        let side_to_move_char = if self.state.to_move == Side::White {
            'w'
        } else {
            'b'
        };

        let mut castling_rights = String::with_capacity(4);

        if self.state.castling_rights.white_king_side {
            castling_rights += "K";
        }
        if self.state.castling_rights.white_queen_side {
            castling_rights += "Q";
        }
        if self.state.castling_rights.black_king_side {
            castling_rights += "k";
        }
        if self.state.castling_rights.black_queen_side {
            castling_rights += "q";
        }

        if castling_rights.is_empty() {
            castling_rights += "-";
        }

        // Target square is the one the pushed pawn skipped over.
        let to_move = self.state.to_move;
        let en_passant = self
            .state
            .en_passant_file
            .and_then(|file| Square::from_row_column(to_move.en_passant_row(), file))
            .and_then(|sq| sq.forward(to_move))
            .map_or("-".to_string(), Square::coordinate);

        format!(
            "{} {} {} {} {} {}",
            pieces,
            side_to_move_char,
            castling_rights,
            en_passant,
            self.state.half_move_clock,
            self.state.full_move_counter
        )
    }
}

fn castling_rights_from_fen(castling_rights_str: &str) -> Result<CastlingRights, FenParseError> {
    if castling_rights_str.is_empty() || castling_rights_str == "-" {
        return Ok(CastlingRights::none());
    }

    let mut rights = CastlingRights::none();

    for (idx, ch) in castling_rights_str.chars().enumerate() {
        let right = match ch {
            'K' => &mut rights.white_king_side,
            'Q' => &mut rights.white_queen_side,
            'k' => &mut rights.black_king_side,
            'q' => &mut rights.black_queen_side,
            _ => {
                return Err(FenParseError::CastlingRights(
                    castling_rights_str.to_string(),
                    idx,
                ))
            }
        };
        if *right {
            return Err(FenParseError::CastlingRights(
                castling_rights_str.to_string(),
                idx,
            ));
        }
        *right = true;
    }

    Ok(rights)
}

fn en_passant_file_from_fen(en_passant_target_str: &str, to_move: Side) -> Result<Option<u8>, FenParseError> {
    if en_passant_target_str == "-" {
        return Ok(None);
    }

    // FEN uses lowercase letter for square names, Square uses uppercase
    let square = Square::from_str(&en_passant_target_str.to_uppercase())
        .map_err(|_| FenParseError::EnPassantTarget(en_passant_target_str.to_string()))?;

    // The target is the square the opponent's pawn skipped, in front of the side to move.
    let target_row = match to_move {
        Side::White => 5,
        Side::Black => 2,
    };
    if square.row() != target_row {
        return Err(FenParseError::EnPassantTarget(en_passant_target_str.to_string()));
    }
    Ok(Some(square.column()))
}

/// The pawn that just pushed twice must stand behind an empty target square.
fn check_en_passant_pawn(position: &Position, file: u8, en_passant_target_str: &str) -> Result<(), FenParseError> {
    let to_move = position.state.to_move;
    let pushed = Square::from_row_column(to_move.en_passant_row(), file);
    let target = pushed.and_then(|sq| sq.forward(to_move));

    match (pushed, target) {
        (Some(pushed), Some(target))
            if position.is_piece_at(pushed, Piece::Pawn, to_move.opposite_side())
                && position.piece_at(target).is_none() =>
        {
            Ok(())
        }
        _ => Err(FenParseError::EnPassantTarget(en_passant_target_str.to_string())),
    }
}

fn pieces_from_fen(pieces_str: &str) -> Result<Position, FenParseError> {
    let mut position = Position::empty();
    let square_order = Square::list_white_perspective();
    let mut sq_idx = 0;
    let placement_err = |ch_idx| FenParseError::PiecePlacement(pieces_str.to_string(), ch_idx);

    for (ch_idx, ch) in pieces_str.chars().enumerate() {
        if let Ok(piece) = Piece::try_from(ch.to_ascii_lowercase()) {
            let square = *square_order.get(sq_idx).ok_or_else(|| placement_err(ch_idx))?;
            let side = if ch.is_uppercase() {
                Side::White
            } else {
                Side::Black
            };

            position
                .put_piece(piece, side, square)
                .map_err(|_| placement_err(ch_idx))?;

            sq_idx += 1;
        } else if let Some(digit) = ch.to_digit(10) {
            sq_idx += digit as usize;
        } else if ch == '/' {
            // pass
        } else {
            Err(placement_err(ch_idx))?
        }
    }

    if sq_idx != 64 {
        Err(placement_err(pieces_str.len()))?
    }

    Ok(position)
}

/// Kings and rooks count as never moved only while the castling rights they back are held.
fn mark_castling_pieces(position: &mut Position) {
    let rights = position.state.castling_rights;
    let home_squares = [
        (E1, rights.any(Side::White)),
        (E8, rights.any(Side::Black)),
        (H1, rights.white_king_side),
        (A1, rights.white_queen_side),
        (H8, rights.black_king_side),
        (A8, rights.black_queen_side),
    ];
    for (square, held) in home_squares {
        if let Some(board_piece) = position.squares[square.index()].as_mut() {
            if matches!(board_piece.piece, Piece::King | Piece::Rook) {
                board_piece.never_moved = held;
            }
        }
    }
}
