use log::trace;
use serde::{Deserialize, Serialize};

use crate::move_gen::{gen_piece_moves, MoveGenError};
use crate::position::{Piece, Position, Side};

use super::{pawn_malus, EvalError, EvaluatePosition, IsolationRule, Score};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MaterialParams {
    /// Points per pseudo-legal move.
    pub mobility_weight: i32,
    /// Multiplier applied to the pawn-structure malus.
    pub pawn_malus_scale: i32,
    pub isolation_rule: IsolationRule,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            mobility_weight: 10,
            pawn_malus_scale: 50,
            isolation_rule: IsolationRule::default(),
        }
    }
}

pub const fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 300,
        Piece::Bishop => 300,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 20000,
    }
}

/// Material plus mobility, minus a scaled pawn-structure malus.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator {
    params: MaterialParams,
}

impl MaterialEvaluator {
    pub fn new(params: MaterialParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MaterialParams {
        &self.params
    }

    fn side_score(&self, position: &Position, side: Side) -> Result<Score, EvalError> {
        let mut score = Score::ZERO;
        for &square in position.squares_of(side) {
            let board_piece = position
                .piece_at(square)
                .ok_or(MoveGenError::NoPiece(square))?;
            let mobility = gen_piece_moves(position, square)?.len() as i32;
            score += Score(piece_value(board_piece.piece) + self.params.mobility_weight * mobility);
        }
        score += pawn_malus(position, side, self.params.isolation_rule)? * self.params.pawn_malus_scale;
        Ok(score)
    }
}

impl EvaluatePosition for MaterialEvaluator {
    fn evaluate(&self, position: &Position) -> Result<Score, EvalError> {
        let white = self.side_score(position, Side::White)?;
        let black = self.side_score(position, Side::Black)?;
        trace!("material eval: white {} black {}", white, black);

        Ok((white - black).for_side(position.to_move()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test]
    fn test_start_is_balanced() -> TestResult {
        let got = MaterialEvaluator::default().evaluate(&Position::start())?;
        assert_eq!(got, Score::ZERO);
        Ok(())
    }

    // White: king 20000 + 4 moves, pawn 100 + 2 moves, isolated pawn -50 * 50.
    // Black: king 20000 + 5 moves.
    #[test_case("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", -2390 ; "white to move")]
    #[test_case("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1", 2390 ; "black to move")]
    fn test_evaluate(fen: &str, want: i32) -> TestResult {
        let position = Position::from_fen(fen)?;
        let got = MaterialEvaluator::default().evaluate(&position)?;
        assert_eq!(got, Score(want));
        Ok(())
    }

    #[test]
    fn test_params_change_weighting() -> TestResult {
        let position = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")?;
        let evaluator = MaterialEvaluator::new(MaterialParams {
            mobility_weight: 0,
            pawn_malus_scale: 1,
            ..MaterialParams::default()
        });
        assert_eq!(evaluator.evaluate(&position)?, Score(100 - 50));
        Ok(())
    }

    #[test]
    fn test_extra_queen_is_good_for_owner() -> TestResult {
        let white_to_move = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1")?;
        let black_to_move = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 b - - 0 1")?;
        let evaluator = MaterialEvaluator::default();

        assert!(evaluator.evaluate(&white_to_move)? > Score(900));
        assert_eq!(evaluator.evaluate(&black_to_move)?, -evaluator.evaluate(&white_to_move)?);
        Ok(())
    }

    #[test_case("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4" ; "italian")]
    #[test_case("4k3/2p5/8/8/8/5N2/PP6/4K2R w K - 0 1" ; "uneven")]
    fn test_mirror_with_same_mover_negates(fen: &str) -> TestResult {
        let position = Position::from_fen(fen)?;
        let mut mirrored = position.mirrored();
        mirrored.state.to_move = position.to_move();
        let evaluator = MaterialEvaluator::default();

        assert_eq!(evaluator.evaluate(&mirrored)?, -evaluator.evaluate(&position)?);
        Ok(())
    }
}
