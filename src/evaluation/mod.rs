mod material;
mod pawn_structure;
mod piece_square;

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::move_gen::MoveGenError;
use crate::position::{Position, Side};
use crate::square::Square;

pub use material::{MaterialEvaluator, MaterialParams};
pub use pawn_structure::{pawn_malus, IsolationRule};
pub use piece_square::{PieceSquareEvaluator, PieceSquareParams, ENDGAME_MATERIAL_THRESHOLD};

/// Desirability of a position, positive when it favours the side to move.
/// Arithmetic saturates at the `i32` bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct Score(pub i32);

impl Score {
    pub const ZERO: Score = Score(0);
    /// Won position.
    pub const MAX: Score = Score(i32::MAX);
    /// Lost or undefined position. Kept at `-MAX` so it can be negated.
    pub const MIN: Score = Score(-i32::MAX);

    /// Turns a white-relative score into one relative to `to_move`.
    pub const fn for_side(self, to_move: Side) -> Score {
        match to_move {
            Side::White => self,
            Side::Black => Score(self.0.saturating_neg()),
        }
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl Sub for Score {
    type Output = Score;

    fn sub(self, rhs: Score) -> Score {
        Score(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Score {
    fn sub_assign(&mut self, rhs: Score) {
        *self = *self - rhs;
    }
}

impl Neg for Score {
    type Output = Score;

    fn neg(self) -> Score {
        Score(self.0.saturating_neg())
    }
}

impl Mul<i32> for Score {
    type Output = Score;

    fn mul(self, rhs: i32) -> Score {
        Score(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("generating mobility: {0}")]
    MoveGen(#[from] MoveGenError),

    #[error("invalid board state: {0} pawn on back rank square {1}")]
    PawnOnBackRank(Side, Square),
}

pub trait EvaluatePosition {
    /// Scores `position` for the side to move. Without an implementation every
    /// position is the worst possible one, never a draw.
    fn evaluate(&self, _position: &Position) -> Result<Score, EvalError> {
        Ok(Score::MIN)
    }
}

/// Evaluator with no logic of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEvaluator;

impl EvaluatePosition for NullEvaluator {}

impl<E: EvaluatePosition + ?Sized> EvaluatePosition for &E {
    fn evaluate(&self, position: &Position) -> Result<Score, EvalError> {
        (**self).evaluate(position)
    }
}
