use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::move_gen::{gen_piece_moves, MoveGenError};
use crate::position::{BoardPiece, Piece, Position, Side};

use super::{pawn_malus, EvalError, EvaluatePosition, IsolationRule, Score};

type PieceSquareTable = [i32; 64];

// Tables read as the board is drawn for white: first line is rank 8.
#[rustfmt::skip]
const PAWN_TABLE: PieceSquareTable = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: PieceSquareTable = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_TABLE: PieceSquareTable = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_TABLE: PieceSquareTable = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: PieceSquareTable = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_TABLE: PieceSquareTable = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_ENDGAME_TABLE: PieceSquareTable = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

const fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 305,
        Piece::Bishop => 333,
        Piece::Rook => 563,
        Piece::Queen => 950,
        Piece::King => 20000,
    }
}

/// Opponent material at or below this (king, seven pawns, a rook and a bishop) means endgame.
pub const ENDGAME_MATERIAL_THRESHOLD: i32 = piece_value(Piece::King)
    + 7 * piece_value(Piece::Pawn)
    + piece_value(Piece::Rook)
    + piece_value(Piece::Bishop);

const BISHOP_MOBILITY_WEIGHT: i32 = 5;
const ROOK_ENDGAME_MOBILITY_WEIGHT: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PieceSquareParams {
    /// Endgame bonus per king step the kings are closer than opposite corners.
    pub king_proximity_weight: i32,
    pub isolation_rule: IsolationRule,
}

impl Default for PieceSquareParams {
    fn default() -> Self {
        Self {
            king_proximity_weight: 10,
            isolation_rule: IsolationRule::default(),
        }
    }
}

/// Material and pawn structure, plus piece-square tables that switch the king
/// to endgame play once the opponent is low on material.
#[derive(Clone, Copy, Debug, Default)]
pub struct PieceSquareEvaluator {
    params: PieceSquareParams,
}

impl PieceSquareEvaluator {
    pub fn new(params: PieceSquareParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PieceSquareParams {
        &self.params
    }

    /// Whether the side to move faces an opponent with endgame material.
    pub fn is_endgame(&self, position: &Position) -> bool {
        material(position, position.to_move().opposite_side()) <= ENDGAME_MATERIAL_THRESHOLD
    }

    fn positional_score(&self, position: &Position, side: Side, endgame: bool) -> Result<Score, EvalError> {
        let mut score = 0;
        for &square in position.squares_of(side) {
            let board_piece = position
                .piece_at(square)
                .ok_or(MoveGenError::NoPiece(square))?;
            score += piece_square_score(position, board_piece, endgame)?;
        }
        Ok(Score(score))
    }

    /// Bonus for the side to move when the kings are close.
    fn king_proximity(&self, position: &Position) -> Score {
        match (position.king_square(Side::White), position.king_square(Side::Black)) {
            (Some(white), Some(black)) => {
                Score(self.params.king_proximity_weight * (7 - white.distance(black) as i32))
            }
            _ => Score::ZERO,
        }
    }
}

fn material(position: &Position, side: Side) -> i32 {
    position
        .squares_of(side)
        .iter()
        .filter_map(|&sq| position.piece_at(sq))
        .map(|board_piece| piece_value(board_piece.piece))
        .sum()
}

fn piece_square_score(position: &Position, board_piece: BoardPiece, endgame: bool) -> Result<i32, EvalError> {
    // White reads the table upside down.
    let idx = match board_piece.side {
        Side::White => board_piece.square.mirror().index(),
        Side::Black => board_piece.square.index(),
    };
    let mobility = || -> Result<i32, EvalError> {
        Ok(gen_piece_moves(position, board_piece.square)?.len() as i32)
    };

    let score = match board_piece.piece {
        Piece::King if endgame => KING_ENDGAME_TABLE[idx] + mobility()?,
        Piece::King => KING_TABLE[idx] - mobility()?,
        Piece::Queen => QUEEN_TABLE[idx],
        Piece::Rook if endgame => ROOK_TABLE[idx] + ROOK_ENDGAME_MOBILITY_WEIGHT * mobility()?,
        Piece::Rook => ROOK_TABLE[idx],
        Piece::Bishop => BISHOP_TABLE[idx] + BISHOP_MOBILITY_WEIGHT * mobility()?,
        Piece::Knight => KNIGHT_TABLE[idx],
        Piece::Pawn => PAWN_TABLE[idx],
    };
    Ok(score)
}

impl EvaluatePosition for PieceSquareEvaluator {
    fn evaluate(&self, position: &Position) -> Result<Score, EvalError> {
        let rule = self.params.isolation_rule;
        let material_white = Score(material(position, Side::White)) + pawn_malus(position, Side::White, rule)?;
        let material_black = Score(material(position, Side::Black)) + pawn_malus(position, Side::Black, rule)?;

        let endgame = self.is_endgame(position);
        if endgame {
            debug!("{} to move scores with endgame tables", position.to_move());
        }

        let positional_white = self.positional_score(position, Side::White, endgame)?;
        let positional_black = self.positional_score(position, Side::Black, endgame)?;
        trace!(
            "table eval: material {} {} positional {} {}",
            material_white,
            material_black,
            positional_white,
            positional_black
        );

        let mut score =
            (material_white - material_black + positional_white - positional_black).for_side(position.to_move());
        if endgame {
            score += self.king_proximity(position);
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test]
    fn test_threshold_value() {
        assert_eq!(ENDGAME_MATERIAL_THRESHOLD, 20000 + 700 + 563 + 333);
    }

    #[test]
    fn test_start_is_balanced() -> TestResult {
        let evaluator = PieceSquareEvaluator::default();
        assert!(!evaluator.is_endgame(&Position::start()));
        assert_eq!(evaluator.evaluate(&Position::start())?, Score::ZERO);
        Ok(())
    }

    #[test_case("r1b1k3/ppppppp1/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1", true ; "king seven pawns rook bishop")]
    #[test_case("r1b1k3/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1", false ; "one pawn more")]
    #[test_case("r1b1k3/ppppppp1/8/8/8/8/PPPPPPPP/RNBQKBNR b - - 0 1", false ; "measured against the opponent")]
    #[test_case("3qk3/p1p1p1p1/p1p1p3/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1", false ; "pawn malus doesnt count")]
    fn test_is_endgame(fen: &str, want: bool) -> TestResult {
        let position = Position::from_fen(fen)?;
        assert_eq!(PieceSquareEvaluator::default().is_endgame(&position), want);
        Ok(())
    }

    // Material 20100 - 50 isolated vs 20000. Pawn e2 -20, king e1 -30 + 4 moves,
    // black king e8 -30 + 5 moves. Kings are 7 apart so proximity adds nothing.
    #[test_case("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", 29 ; "white to move")]
    #[test_case("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1", -29 ; "black to move")]
    fn test_evaluate_endgame(fen: &str, want: i32) -> TestResult {
        let position = Position::from_fen(fen)?;
        let got = PieceSquareEvaluator::default().evaluate(&position)?;
        assert_eq!(got, Score(want));
        Ok(())
    }

    #[test]
    fn test_king_proximity_favours_mover() -> TestResult {
        let far = Position::from_fen("7k/8/8/8/8/8/8/K7 w - - 0 1")?;
        let near = Position::from_fen("8/8/8/8/3k4/8/3K4/8 w - - 0 1")?;
        let evaluator = PieceSquareEvaluator::default();

        assert_eq!(evaluator.king_proximity(&far), Score::ZERO);
        assert_eq!(evaluator.king_proximity(&near), Score(10 * 5));
        Ok(())
    }

    #[test]
    fn test_proximity_weight_is_configurable() -> TestResult {
        let position = Position::from_fen("8/8/8/8/3k4/8/3K4/8 w - - 0 1")?;
        let default = PieceSquareEvaluator::default().evaluate(&position)?;
        let no_proximity = PieceSquareEvaluator::new(PieceSquareParams {
            king_proximity_weight: 0,
            ..PieceSquareParams::default()
        })
        .evaluate(&position)?;

        assert_eq!(default - no_proximity, Score(50));
        Ok(())
    }

    #[test]
    fn test_black_reads_table_from_its_side() -> TestResult {
        let evaluator = PieceSquareEvaluator::default();
        // Knights on their starting squares score the same for both sides.
        let position = Position::from_fen("1n2k3/8/8/8/8/8/8/1N2K3 w - - 0 1")?;
        assert_eq!(
            evaluator.positional_score(&position, Side::White, false)?,
            evaluator.positional_score(&position, Side::Black, false)?
        );
        Ok(())
    }

    #[test_case("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4" ; "italian")]
    #[test_case("4k3/2p5/8/8/8/5N2/PP6/4K2R w K - 0 1" ; "endgame")]
    #[test_case("8/5k2/3p4/8/2B5/8/5PP1/6K1 b - - 0 1" ; "bishop ending")]
    fn test_full_mirror_keeps_score(fen: &str) -> TestResult {
        let position = Position::from_fen(fen)?;
        let evaluator = PieceSquareEvaluator::default();

        assert_eq!(evaluator.evaluate(&position.mirrored())?, evaluator.evaluate(&position)?);
        Ok(())
    }
}
