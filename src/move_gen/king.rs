use crate::moves::{Move, MoveFlag};
use crate::position::attacks::KING_OFFSETS;
use crate::position::{BoardPiece, Piece, Position, Side};
use crate::square::Square;

use super::leaping_pieces::gen_leaping_moves;
use super::PieceMoves;

pub(super) fn gen_king_moves(position: &Position, king: BoardPiece, moves: &mut PieceMoves) {
    gen_leaping_moves(position, king, &KING_OFFSETS[..], moves);
    gen_castles(position, king, moves);
}

fn gen_castles(position: &Position, king: BoardPiece, moves: &mut PieceMoves) {
    if !king.never_moved {
        return;
    }
    let side = king.side;
    let castles = match side {
        Side::White => [
            (true, MoveFlag::WhiteKingCastle),
            (false, MoveFlag::WhiteQueenCastle),
        ],
        Side::Black => [
            (true, MoveFlag::BlackKingCastle),
            (false, MoveFlag::BlackQueenCastle),
        ],
    };

    for (king_side, flag) in castles {
        let Some((king_src, king_dest, rook_src, rook_transit)) = flag.castle_squares() else {
            continue;
        };
        if king.square != king_src || !position.castling_rights().get(side, king_side) {
            continue;
        }
        let rook_ready = matches!(
            position.piece_at(rook_src),
            Some(rook) if rook.piece == Piece::Rook && rook.side == side && rook.never_moved
        );
        if !rook_ready || !path_is_clear(position, king_src, rook_src) {
            continue;
        }

        // The king passes over the rook's destination.
        let opponent = side.opposite_side();
        let king_safe = [king_src, rook_transit, king_dest]
            .into_iter()
            .all(|sq| !position.is_square_attacked(sq, opponent));
        if king_safe {
            moves.push(Move::new(king_src, king_dest, flag));
        }
    }
}

/// Whether every tile strictly between two tiles of the same row is empty.
fn path_is_clear(position: &Position, from: Square, to: Square) -> bool {
    let d_column = if to.column() > from.column() { 1 } else { -1 };
    from.ray(0, d_column)
        .take_while(|&sq| sq != to)
        .all(|sq| position.piece_at(sq).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_gen::gen_piece_moves;
    use crate::square::Square::*;
    use test_case::test_case;
    use testresult::TestResult;

    fn castles(fen: &str, square: Square) -> Result<Vec<MoveFlag>, Box<dyn std::error::Error>> {
        let position = Position::from_fen(fen)?;
        let mut flags: Vec<MoveFlag> = gen_piece_moves(&position, square)?
            .into_iter()
            .map(|mve| mve.flag)
            .filter(|flag| flag.is_castle())
            .collect();
        flags.sort();
        Ok(flags)
    }

    #[test_case("4k3/8/8/8/3K4/8/8/8 w - - 0 1", D4, 8 ; "center")]
    #[test_case("4k3/8/8/8/8/8/8/K7 w - - 0 1", A1, 3 ; "corner")]
    #[test_case("4k3/8/8/8/8/8/8/7K w - - 0 1", H1, 3 ; "right corner doesnt wrap")]
    #[test_case("4k3/8/8/8/8/8/3PPP2/3QKB2 w - - 0 1", E1, 0 ; "boxed in")]
    #[test_case("4k3/8/8/8/8/8/3ppp2/3qKb2 w - - 0 1", E1, 5 ; "surrounded by captures")]
    fn test_king_steps(fen: &str, square: Square, want: usize) -> TestResult {
        let position = Position::from_fen(fen)?;
        let moves = gen_piece_moves(&position, square)?;
        assert_eq!(moves.len(), want, "{:?}", moves);
        Ok(())
    }

    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", E1, &[MoveFlag::WhiteKingCastle, MoveFlag::WhiteQueenCastle] ; "white both")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", E8, &[MoveFlag::BlackKingCastle, MoveFlag::BlackQueenCastle] ; "black both")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1", E1, &[MoveFlag::WhiteKingCastle] ; "only rights held")]
    #[test_case("r3k2r/8/8/8/8/8/8/R2QK1NR w KQkq - 0 1", E1, &[] ; "path blocked")]
    #[test_case("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1", E1, &[MoveFlag::WhiteKingCastle] ; "knight next to queen rook")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1", E1, &[] ; "no rights")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1", E8, &[] ; "no black rights")]
    fn test_castles(fen: &str, square: Square, want: &[MoveFlag]) -> TestResult {
        assert_eq!(castles(fen, square)?, want);
        Ok(())
    }

    #[test_case("r3k2r/8/8/8/8/8/8/R3K1rR w KQkq - 0 1", &[] ; "in check")]
    #[test_case("r3k2r/8/8/8/8/5r2/8/R3K2R w KQkq - 0 1", &[MoveFlag::WhiteQueenCastle] ; "transit square attacked")]
    #[test_case("r3k2r/8/8/8/8/6r1/8/R3K2R w KQkq - 0 1", &[MoveFlag::WhiteQueenCastle] ; "destination attacked")]
    #[test_case("r3k2r/8/8/8/8/1r6/8/R3K2R w KQkq - 0 1", &[MoveFlag::WhiteKingCastle, MoveFlag::WhiteQueenCastle] ; "rook path attacked is fine")]
    fn test_castles_through_attack(fen: &str, want: &[MoveFlag]) -> TestResult {
        assert_eq!(castles(fen, E1)?, want);
        Ok(())
    }

    #[test]
    fn test_no_castle_after_rook_moved() -> TestResult {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")?;
        position.make_move(Move::quiet(H1, H2))?;
        position.make_move(Move::quiet(A8, A7))?;
        position.make_move(Move::quiet(H2, H1))?;
        position.make_move(Move::quiet(A7, A8))?;

        assert!(position.piece_at(H1).is_some_and(|rook| !rook.never_moved));
        let moves = gen_piece_moves(&position, E1)?;
        let flags: Vec<MoveFlag> = moves
            .iter()
            .map(|mve| mve.flag)
            .filter(|flag| flag.is_castle())
            .collect();
        assert_eq!(flags, vec![MoveFlag::WhiteQueenCastle]);
        Ok(())
    }
}
